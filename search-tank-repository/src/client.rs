//! Account client implementation.
//!
//! This module provides the entry point application code uses to reach the
//! service: it hands out `Index` handles and manages the account's indexes.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::info;

use crate::config::ClientConfig;
use crate::errors::IndexError;
use crate::http::HttpIndexProvider;
use crate::index::Index;
use crate::interfaces::IndexProvider;
use search_tank_shared::{IndexMetadata, IndexOptions};

/// The main client for interacting with the search service.
///
/// Cloning is cheap; clones share the underlying provider.
#[derive(Clone)]
pub struct SearchTankClient {
    provider: Arc<dyn IndexProvider>,
    config: ClientConfig,
}

impl SearchTankClient {
    /// Create a client talking to the service over HTTP.
    ///
    /// # Returns
    ///
    /// * `Ok(SearchTankClient)` - A new client instance
    /// * `Err(IndexError)` - If the API URL is invalid
    pub fn new(config: ClientConfig) -> Result<Self, IndexError> {
        let provider = HttpIndexProvider::new(&config)?;
        Ok(Self::with_provider(Arc::new(provider), config))
    }

    /// Create a client over an arbitrary provider.
    pub fn with_provider(provider: Arc<dyn IndexProvider>, config: ClientConfig) -> Self {
        Self { provider, config }
    }

    /// Get a handle to the named index. No request is made.
    pub fn index(&self, name: impl Into<String>) -> Index {
        Index::with_config(name, Arc::clone(&self.provider), self.config.clone())
    }

    /// Create an index and return its handle.
    pub async fn create_index(
        &self,
        name: impl Into<String>,
        options: IndexOptions,
    ) -> Result<Index, IndexError> {
        let index = self.index(name);
        index.create_with_options(options).await?;
        Ok(index)
    }

    /// Delete the named index.
    pub async fn delete_index(&self, name: &str) -> Result<(), IndexError> {
        self.provider.delete_index(name).await
    }

    /// List the account's indexes with their metadata.
    pub async fn list_indexes(&self) -> Result<BTreeMap<String, IndexMetadata>, IndexError> {
        let indexes = self.provider.list_indexes().await?;
        info!(count = indexes.len(), "Listed indexes");
        Ok(indexes)
    }
}
