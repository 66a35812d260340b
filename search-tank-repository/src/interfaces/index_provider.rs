//! Index provider trait definition.
//!
//! This module defines the abstract interface for the remote calls behind an
//! index handle, allowing for different implementations (HTTP, in-memory).

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::errors::IndexError;
use crate::types::{BatchResults, BulkDeleteResults};
use search_tank_shared::{Document, IndexMetadata, IndexOptions, Query, SearchResults};

/// Abstracts the service an index handle talks to.
///
/// Each method corresponds to exactly one remote request. Implementations map
/// the service's answers into `IndexError` variants; they do not retry.
/// Implementations are injected into `Index` and `SearchTankClient` to enable
/// dependency injection and easy testing with the in-memory provider.
///
/// Every per-index method fails with `IndexError::NotFound` when the index is
/// not provisioned and with `IndexError::ServiceNotReady` while it is still
/// starting.
#[async_trait]
pub trait IndexProvider: Send + Sync {
    /// Provision a new index.
    ///
    /// # Returns
    ///
    /// * `Ok(IndexMetadata)` - Metadata of the new index
    /// * `Err(IndexError::AlreadyExists)` - If the name is taken
    /// * `Err(IndexError::QuotaExceeded)` - If the account reached its index limit
    async fn create_index(
        &self,
        name: &str,
        options: &IndexOptions,
    ) -> Result<IndexMetadata, IndexError>;

    /// Remove an index and all its documents.
    async fn delete_index(&self, name: &str) -> Result<(), IndexError>;

    /// Fetch the current metadata of an index.
    async fn index_metadata(&self, name: &str) -> Result<IndexMetadata, IndexError>;

    /// List every index of the account.
    async fn list_indexes(&self) -> Result<BTreeMap<String, IndexMetadata>, IndexError>;

    /// Add or replace a single document.
    async fn add_document(&self, name: &str, document: &Document) -> Result<(), IndexError>;

    /// Add or replace several documents in one request.
    ///
    /// # Returns
    ///
    /// * `Ok(BatchResults)` - One result per document, in the order given
    /// * `Err(IndexError)` - If the request as a whole failed
    async fn add_documents(
        &self,
        name: &str,
        documents: &[Document],
    ) -> Result<BatchResults, IndexError>;

    /// Delete a document. Deleting a missing document succeeds.
    async fn delete_document(&self, name: &str, docid: &str) -> Result<(), IndexError>;

    /// Delete several documents in one request.
    async fn delete_documents(
        &self,
        name: &str,
        docids: &[String],
    ) -> Result<BulkDeleteResults, IndexError>;

    /// Delete every document matching `query`.
    async fn delete_by_search(&self, name: &str, query: &Query) -> Result<(), IndexError>;

    /// Merge scoring variables into an existing document.
    async fn update_variables(
        &self,
        name: &str,
        docid: &str,
        variables: &BTreeMap<u32, f32>,
    ) -> Result<(), IndexError>;

    /// Merge categories into an existing document. Blank values remove the category.
    async fn update_categories(
        &self,
        name: &str,
        docid: &str,
        categories: &BTreeMap<String, String>,
    ) -> Result<(), IndexError>;

    /// Pin a document as the top result for `query`.
    async fn promote(&self, name: &str, docid: &str, query: &str) -> Result<(), IndexError>;

    /// Register or replace the scoring function at `slot`.
    async fn add_function(&self, name: &str, slot: u32, definition: &str)
        -> Result<(), IndexError>;

    /// Remove the scoring function at `slot`.
    async fn delete_function(&self, name: &str, slot: u32) -> Result<(), IndexError>;

    /// List registered scoring functions by slot.
    async fn list_functions(&self, name: &str) -> Result<BTreeMap<u32, String>, IndexError>;

    /// Run a search.
    async fn search(&self, name: &str, query: &Query) -> Result<SearchResults, IndexError>;
}
