//! Index handle implementation.
//!
//! This module provides the handle application code uses to manage one named
//! index: lifecycle, documents, scoring functions and search.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use crate::config::ClientConfig;
use crate::errors::IndexError;
use crate::interfaces::IndexProvider;
use crate::types::{
    validate_docid, validate_document, BatchResult, BatchResults, BulkDeleteResults,
    DeleteResult,
};
use search_tank_shared::{Document, IndexMetadata, IndexOptions, Query, SearchResults};

/// Handle bound to one named index.
///
/// The handle is a lightweight local reference: the remote index may or may
/// not exist yet. Metadata is cached from the last fetch and refreshed on
/// demand.
///
/// # Example
///
/// ```ignore
/// let index = client.index("catalog");
/// if !index.exists().await? {
///     index.create().await?;
/// }
/// while !index.has_started().await? {
///     tokio::time::sleep(Duration::from_millis(500)).await;
/// }
/// index.add_document(&Document::new("doc1").with_field("title", "shoe")).await?;
/// let results = index.search("shoe").await?;
/// ```
pub struct Index {
    name: String,
    provider: Arc<dyn IndexProvider>,
    config: ClientConfig,
    metadata: RwLock<Option<IndexMetadata>>,
}

impl Index {
    /// Create a handle with default configuration.
    pub fn new(name: impl Into<String>, provider: Arc<dyn IndexProvider>) -> Self {
        Self::with_config(name, provider, ClientConfig::default())
    }

    /// Create a handle with custom configuration.
    pub fn with_config(
        name: impl Into<String>,
        provider: Arc<dyn IndexProvider>,
        config: ClientConfig,
    ) -> Self {
        Self {
            name: name.into(),
            provider,
            config,
            metadata: RwLock::new(None),
        }
    }

    /// Name of the index this handle refers to.
    pub fn name(&self) -> &str {
        &self.name
    }

    // ---------------------------------------------------------------------
    // Lifecycle
    // ---------------------------------------------------------------------

    /// Create this index with default options.
    ///
    /// Fails with `AlreadyExists` if it already existed and with
    /// `QuotaExceeded` if the account has reached its index limit.
    pub async fn create(&self) -> Result<(), IndexError> {
        self.create_with_options(IndexOptions::default()).await
    }

    /// Create this index with the given options.
    #[instrument(skip(self), fields(index = %self.name))]
    pub async fn create_with_options(&self, options: IndexOptions) -> Result<(), IndexError> {
        let metadata = self.provider.create_index(&self.name, &options).await?;
        info!(code = %metadata.code, started = metadata.started, "Index created");
        *self.metadata.write().await = Some(metadata);
        Ok(())
    }

    /// Delete this index. Fails with `NotFound` if it does not exist.
    #[instrument(skip(self), fields(index = %self.name))]
    pub async fn delete(&self) -> Result<(), IndexError> {
        self.provider.delete_index(&self.name).await?;
        *self.metadata.write().await = None;
        info!("Index deleted");
        Ok(())
    }

    /// Whether the index is currently provisioned.
    pub async fn exists(&self) -> Result<bool, IndexError> {
        match self.fetch_metadata().await {
            Ok(_) => Ok(true),
            Err(IndexError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Whether the index finished starting.
    ///
    /// Always asks the service, so it can be polled after `create`. While it
    /// returns false most other operations fail with `ServiceNotReady`.
    pub async fn has_started(&self) -> Result<bool, IndexError> {
        Ok(self.fetch_metadata().await?.started)
    }

    /// Re-fetch the metadata from the service.
    pub async fn refresh_metadata(&self) -> Result<(), IndexError> {
        self.fetch_metadata().await.map(|_| ())
    }

    /// Cached metadata, fetched first if nothing is cached.
    pub async fn metadata(&self) -> Result<IndexMetadata, IndexError> {
        if let Some(metadata) = self.metadata.read().await.as_ref() {
            return Ok(metadata.clone());
        }
        self.fetch_metadata().await
    }

    /// Service-assigned code of the index.
    pub async fn code(&self) -> Result<String, IndexError> {
        Ok(self.metadata().await?.code)
    }

    /// When the index was created.
    pub async fn creation_time(&self) -> Result<DateTime<Utc>, IndexError> {
        Ok(self.metadata().await?.creation_time)
    }

    /// Number of documents, as of the last metadata fetch.
    pub async fn size(&self) -> Result<u64, IndexError> {
        Ok(self.metadata().await?.size)
    }

    /// Whether unauthenticated search is enabled.
    pub async fn is_public_search_enabled(&self) -> Result<bool, IndexError> {
        Ok(self.metadata().await?.public_search)
    }

    async fn fetch_metadata(&self) -> Result<IndexMetadata, IndexError> {
        match self.provider.index_metadata(&self.name).await {
            Ok(metadata) => {
                *self.metadata.write().await = Some(metadata.clone());
                Ok(metadata)
            }
            Err(e) => {
                if matches!(e, IndexError::NotFound(_)) {
                    *self.metadata.write().await = None;
                }
                Err(e)
            }
        }
    }

    // ---------------------------------------------------------------------
    // Documents
    // ---------------------------------------------------------------------

    /// Index a document, replacing any document with the same docid.
    ///
    /// Variables and categories on the document are optional. The docid must
    /// be non-empty and at most 1024 bytes when UTF-8 encoded.
    ///
    /// A `TransientServerFault` is a temporary server-side error and should be
    /// handled by callers that implement a retry policy.
    #[instrument(skip(self, document), fields(index = %self.name, docid = %document.docid))]
    pub async fn add_document(&self, document: &Document) -> Result<(), IndexError> {
        validate_document(document)?;
        self.provider.add_document(&self.name, document).await?;
        debug!("Document added");
        Ok(())
    }

    /// Index a batch of documents.
    ///
    /// Every document gets its own entry in the returned results, in the
    /// order it was submitted. Documents that fail validation are reported as
    /// failed without being sent; the rest of the batch is still indexed.
    /// Only failures of the request as a whole (missing index, not started,
    /// transport) are returned as `Err`.
    ///
    /// The batch size is limited by the configured max_batch_size (default: 1000).
    #[instrument(skip(self, documents), fields(index = %self.name))]
    pub async fn add_documents<I>(&self, documents: I) -> Result<BatchResults, IndexError>
    where
        I: IntoIterator<Item = Document>,
    {
        let documents: Vec<Document> = documents.into_iter().collect();
        if documents.is_empty() {
            return Ok(BatchResults::default());
        }

        self.config.validate_batch_size(documents.len())?;

        let mut slots: Vec<Option<BatchResult>> = Vec::with_capacity(documents.len());
        let mut positions = Vec::new();
        let mut accepted = Vec::new();

        for document in documents {
            match validate_document(&document) {
                Ok(()) => {
                    positions.push(slots.len());
                    slots.push(None);
                    accepted.push(document);
                }
                Err(e) => {
                    warn!(docid = %document.docid, error = %e, "Rejected document in batch");
                    slots.push(Some(BatchResult::failed(document.docid, e)));
                }
            }
        }

        if !accepted.is_empty() {
            let remote = self.provider.add_documents(&self.name, &accepted).await?;
            if remote.results.len() != accepted.len() {
                return Err(IndexError::transport(format!(
                    "batch response has {} results for {} documents",
                    remote.results.len(),
                    accepted.len()
                )));
            }
            for (position, result) in positions.into_iter().zip(remote.results) {
                slots[position] = Some(result);
            }
        }

        let results = BatchResults::from_results(slots.into_iter().flatten().collect());
        info!(
            total = results.total,
            succeeded = results.succeeded,
            failed = results.failed,
            "Batch indexed"
        );
        Ok(results)
    }

    /// Delete a document. Deleting a docid that is not indexed does nothing.
    #[instrument(skip(self), fields(index = %self.name))]
    pub async fn delete_document(&self, docid: &str) -> Result<(), IndexError> {
        validate_docid(docid)?;
        self.provider.delete_document(&self.name, docid).await?;
        debug!("Document deleted");
        Ok(())
    }

    /// Delete several documents, reporting the outcome per docid.
    #[instrument(skip(self, docids), fields(index = %self.name))]
    pub async fn delete_documents<I, S>(&self, docids: I) -> Result<BulkDeleteResults, IndexError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let docids: Vec<String> = docids.into_iter().map(Into::into).collect();
        if docids.is_empty() {
            return Ok(BulkDeleteResults::default());
        }

        self.config.validate_batch_size(docids.len())?;

        let mut slots: Vec<Option<DeleteResult>> = Vec::with_capacity(docids.len());
        let mut positions = Vec::new();
        let mut accepted = Vec::new();

        for docid in docids {
            match validate_docid(&docid) {
                Ok(()) => {
                    positions.push(slots.len());
                    slots.push(None);
                    accepted.push(docid);
                }
                Err(e) => slots.push(Some(DeleteResult::failed(docid, e))),
            }
        }

        if !accepted.is_empty() {
            let remote = self.provider.delete_documents(&self.name, &accepted).await?;
            if remote.results.len() != accepted.len() {
                return Err(IndexError::transport(format!(
                    "delete response has {} results for {} documents",
                    remote.results.len(),
                    accepted.len()
                )));
            }
            for (position, result) in positions.into_iter().zip(remote.results) {
                slots[position] = Some(result);
            }
        }

        Ok(BulkDeleteResults::from_results(
            slots.into_iter().flatten().collect(),
        ))
    }

    /// Delete every document matching the query.
    #[instrument(skip(self, query), fields(index = %self.name))]
    pub async fn delete_by_search(&self, query: impl Into<Query>) -> Result<(), IndexError> {
        let query = query.into();
        validate_query(&query)?;
        self.provider.delete_by_search(&self.name, &query).await?;
        info!(query = %query.text, "Deleted documents matching query");
        Ok(())
    }

    /// Merge scoring variables into an existing document.
    ///
    /// Fields and categories are left untouched.
    #[instrument(skip(self, variables), fields(index = %self.name))]
    pub async fn update_variables(
        &self,
        docid: &str,
        variables: &BTreeMap<u32, f32>,
    ) -> Result<(), IndexError> {
        validate_docid(docid)?;
        if variables.is_empty() {
            // Nothing to update
            return Ok(());
        }
        self.provider
            .update_variables(&self.name, docid, variables)
            .await?;
        debug!(count = variables.len(), "Variables updated");
        Ok(())
    }

    /// Merge facet categories into an existing document.
    ///
    /// A blank value removes that category from the document.
    #[instrument(skip(self, categories), fields(index = %self.name))]
    pub async fn update_categories(
        &self,
        docid: &str,
        categories: &BTreeMap<String, String>,
    ) -> Result<(), IndexError> {
        validate_docid(docid)?;
        if categories.is_empty() {
            return Ok(());
        }
        self.provider
            .update_categories(&self.name, docid, categories)
            .await?;
        debug!(count = categories.len(), "Categories updated");
        Ok(())
    }

    /// Pin a document as the first result for an exact query string.
    #[instrument(skip(self), fields(index = %self.name))]
    pub async fn promote(&self, docid: &str, query: &str) -> Result<(), IndexError> {
        validate_docid(docid)?;
        if query.trim().is_empty() {
            return Err(IndexError::invalid_argument("promote query is required"));
        }
        self.provider.promote(&self.name, docid, query).await
    }

    // ---------------------------------------------------------------------
    // Scoring functions
    // ---------------------------------------------------------------------

    /// Register or replace the scoring function at `slot`.
    ///
    /// Fails with `InvalidSyntax` if the service rejects the definition, in
    /// which case nothing is registered.
    #[instrument(skip(self), fields(index = %self.name))]
    pub async fn add_function(&self, slot: u32, definition: &str) -> Result<(), IndexError> {
        if definition.trim().is_empty() {
            return Err(IndexError::invalid_syntax("function definition is empty"));
        }
        self.provider.add_function(&self.name, slot, definition).await?;
        info!("Scoring function registered");
        Ok(())
    }

    /// Remove the scoring function at `slot`.
    #[instrument(skip(self), fields(index = %self.name))]
    pub async fn delete_function(&self, slot: u32) -> Result<(), IndexError> {
        self.provider.delete_function(&self.name, slot).await
    }

    /// Scoring functions currently registered, by slot.
    pub async fn list_functions(&self) -> Result<BTreeMap<u32, String>, IndexError> {
        self.provider.list_functions(&self.name).await
    }

    // ---------------------------------------------------------------------
    // Search
    // ---------------------------------------------------------------------

    /// Search the index.
    ///
    /// Accepts plain text or a full [`Query`]. Fails with `InvalidSyntax` if
    /// the query is malformed.
    #[instrument(skip(self, query), fields(index = %self.name))]
    pub async fn search(&self, query: impl Into<Query>) -> Result<SearchResults, IndexError> {
        let query = query.into();
        validate_query(&query)?;
        let results = self.provider.search(&self.name, &query).await?;
        debug!(
            query = %query.text,
            matches = results.matches,
            returned = results.hits.len(),
            "Search completed"
        );
        Ok(results)
    }
}

fn validate_query(query: &Query) -> Result<(), IndexError> {
    if query.text.trim().is_empty() {
        return Err(IndexError::invalid_syntax("query text is empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use search_tank_shared::MAX_DOCID_BYTES;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Mutex;

    /// Mock provider for testing
    struct MockProvider {
        batches: Mutex<Vec<Vec<String>>>,
        metadata_calls: AtomicUsize,
        calls: AtomicUsize,
        missing: bool,
    }

    impl MockProvider {
        fn new() -> Self {
            Self {
                batches: Mutex::new(Vec::new()),
                metadata_calls: AtomicUsize::new(0),
                calls: AtomicUsize::new(0),
                missing: false,
            }
        }

        fn missing() -> Self {
            Self {
                missing: true,
                ..Self::new()
            }
        }

        fn check(&self, name: &str) -> Result<(), IndexError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.missing {
                return Err(IndexError::not_found(name));
            }
            Ok(())
        }

        fn sample_metadata() -> IndexMetadata {
            IndexMetadata {
                code: "abc".to_string(),
                creation_time: Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
                started: true,
                size: 7,
                public_search: false,
            }
        }
    }

    #[async_trait]
    impl IndexProvider for MockProvider {
        async fn create_index(
            &self,
            name: &str,
            _options: &IndexOptions,
        ) -> Result<IndexMetadata, IndexError> {
            self.check(name)?;
            Ok(Self::sample_metadata())
        }

        async fn delete_index(&self, name: &str) -> Result<(), IndexError> {
            self.check(name)
        }

        async fn index_metadata(&self, name: &str) -> Result<IndexMetadata, IndexError> {
            self.metadata_calls.fetch_add(1, Ordering::SeqCst);
            self.check(name)?;
            Ok(Self::sample_metadata())
        }

        async fn list_indexes(&self) -> Result<BTreeMap<String, IndexMetadata>, IndexError> {
            Ok(BTreeMap::new())
        }

        async fn add_document(&self, name: &str, _document: &Document) -> Result<(), IndexError> {
            self.check(name)
        }

        async fn add_documents(
            &self,
            name: &str,
            documents: &[Document],
        ) -> Result<BatchResults, IndexError> {
            self.check(name)?;
            self.batches
                .lock()
                .await
                .push(documents.iter().map(|d| d.docid.clone()).collect());
            Ok(BatchResults::from_results(
                documents
                    .iter()
                    .map(|d| BatchResult::added(d.docid.clone()))
                    .collect(),
            ))
        }

        async fn delete_document(&self, name: &str, _docid: &str) -> Result<(), IndexError> {
            self.check(name)
        }

        async fn delete_documents(
            &self,
            name: &str,
            docids: &[String],
        ) -> Result<BulkDeleteResults, IndexError> {
            self.check(name)?;
            Ok(BulkDeleteResults::from_results(
                docids.iter().map(DeleteResult::deleted).collect(),
            ))
        }

        async fn delete_by_search(&self, name: &str, _query: &Query) -> Result<(), IndexError> {
            self.check(name)
        }

        async fn update_variables(
            &self,
            name: &str,
            _docid: &str,
            _variables: &BTreeMap<u32, f32>,
        ) -> Result<(), IndexError> {
            self.check(name)
        }

        async fn update_categories(
            &self,
            name: &str,
            _docid: &str,
            _categories: &BTreeMap<String, String>,
        ) -> Result<(), IndexError> {
            self.check(name)
        }

        async fn promote(&self, name: &str, _docid: &str, _query: &str) -> Result<(), IndexError> {
            self.check(name)
        }

        async fn add_function(
            &self,
            name: &str,
            _slot: u32,
            _definition: &str,
        ) -> Result<(), IndexError> {
            self.check(name)
        }

        async fn delete_function(&self, name: &str, _slot: u32) -> Result<(), IndexError> {
            self.check(name)
        }

        async fn list_functions(&self, name: &str) -> Result<BTreeMap<u32, String>, IndexError> {
            self.check(name)?;
            Ok(BTreeMap::new())
        }

        async fn search(&self, name: &str, _query: &Query) -> Result<SearchResults, IndexError> {
            self.check(name)?;
            Ok(SearchResults::default())
        }
    }

    fn test_document(docid: &str) -> Document {
        Document::new(docid).with_field("text", "some text")
    }

    #[tokio::test]
    async fn test_add_documents_empty() {
        let provider = Arc::new(MockProvider::new());
        let index = Index::new("catalog", provider.clone());

        let result = index.add_documents(Vec::<Document>::new()).await.unwrap();

        assert_eq!(result.total, 0);
        assert_eq!(result.succeeded, 0);
        assert_eq!(result.failed, 0);
        assert!(result.results.is_empty());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_add_documents_reports_invalid_entry_in_place() {
        let provider = Arc::new(MockProvider::new());
        let index = Index::new("catalog", provider.clone());
        let oversized = "x".repeat(MAX_DOCID_BYTES + 1);

        let result = index
            .add_documents(vec![
                test_document("a"),
                test_document(&oversized),
                test_document("c"),
            ])
            .await
            .unwrap();

        assert_eq!(result.total, 3);
        assert_eq!(result.succeeded, 2);
        assert_eq!(result.failed, 1);
        assert_eq!(result.results[0].docid, "a");
        assert!(result.results[0].added);
        assert_eq!(result.results[1].docid, oversized);
        assert!(!result.results[1].added);
        assert!(matches!(
            result.results[1].error,
            Some(IndexError::InvalidArgument(_))
        ));
        assert_eq!(result.results[2].docid, "c");
        assert!(result.results[2].added);

        // Only valid documents were sent
        let batches = provider.batches.lock().await;
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0], vec!["a".to_string(), "c".to_string()]);
    }

    #[tokio::test]
    async fn test_add_documents_all_invalid_makes_no_call() {
        let provider = Arc::new(MockProvider::new());
        let index = Index::new("catalog", provider.clone());

        let result = index
            .add_documents(vec![Document::new(""), Document::new("no-fields")])
            .await
            .unwrap();

        assert_eq!(result.failed, 2);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_add_documents_batch_size_exceeded() {
        let provider = Arc::new(MockProvider::new());
        let config = ClientConfig::with_max_batch_size(5);
        let index = Index::with_config("catalog", provider, config);

        let documents: Vec<Document> = (0..10)
            .map(|i| test_document(&format!("doc{}", i)))
            .collect();

        let result = index.add_documents(documents).await;
        assert!(matches!(
            result.unwrap_err(),
            IndexError::BatchSizeExceeded {
                provided: 10,
                max: 5
            }
        ));
    }

    #[tokio::test]
    async fn test_add_documents_accepts_lazy_iterator() {
        let provider = Arc::new(MockProvider::new());
        let index = Index::new("catalog", provider);

        let result = index
            .add_documents((0..3).map(|i| test_document(&format!("doc{}", i))))
            .await
            .unwrap();

        assert_eq!(result.succeeded, 3);
    }

    #[tokio::test]
    async fn test_add_documents_missing_index_is_error() {
        let provider = Arc::new(MockProvider::missing());
        let index = Index::new("catalog", provider);

        let result = index.add_documents(vec![test_document("a")]).await;
        assert!(matches!(result, Err(IndexError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_add_document_validation() {
        let provider = Arc::new(MockProvider::new());
        let index = Index::new("catalog", provider.clone());

        assert!(index.add_document(&test_document("")).await.is_err());
        assert!(index
            .add_document(&test_document(&"x".repeat(MAX_DOCID_BYTES + 1)))
            .await
            .is_err());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);

        assert!(index.add_document(&test_document("ok")).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_documents_reports_invalid_docid() {
        let provider = Arc::new(MockProvider::new());
        let index = Index::new("catalog", provider);

        let result = index.delete_documents(["a", "", "c"]).await.unwrap();

        assert_eq!(result.total, 3);
        assert_eq!(result.failed, 1);
        assert!(!result.results[1].deleted);
        assert_eq!(result.results[2].docid, "c");
    }

    #[tokio::test]
    async fn test_metadata_is_cached() {
        let provider = Arc::new(MockProvider::new());
        let index = Index::new("catalog", provider.clone());

        assert_eq!(index.code().await.unwrap(), "abc");
        assert_eq!(index.size().await.unwrap(), 7);
        assert!(!index.is_public_search_enabled().await.unwrap());
        assert_eq!(provider.metadata_calls.load(Ordering::SeqCst), 1);

        index.refresh_metadata().await.unwrap();
        assert_eq!(provider.metadata_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_has_started_always_fetches() {
        let provider = Arc::new(MockProvider::new());
        let index = Index::new("catalog", provider.clone());

        assert!(index.has_started().await.unwrap());
        assert!(index.has_started().await.unwrap());
        assert_eq!(provider.metadata_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_create_populates_cache() {
        let provider = Arc::new(MockProvider::new());
        let index = Index::new("catalog", provider.clone());

        index.create().await.unwrap();
        let creation_time = index.creation_time().await.unwrap();

        assert_eq!(creation_time, Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap());
        assert_eq!(provider.metadata_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_exists_maps_not_found_to_false() {
        let index = Index::new("catalog", Arc::new(MockProvider::missing()));
        assert!(!index.exists().await.unwrap());

        let index = Index::new("catalog", Arc::new(MockProvider::new()));
        assert!(index.exists().await.unwrap());
    }

    #[tokio::test]
    async fn test_metadata_not_found() {
        let index = Index::new("catalog", Arc::new(MockProvider::missing()));
        assert!(matches!(
            index.code().await,
            Err(IndexError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_updates_make_no_call() {
        let provider = Arc::new(MockProvider::new());
        let index = Index::new("catalog", provider.clone());

        index.update_variables("doc1", &BTreeMap::new()).await.unwrap();
        index
            .update_categories("doc1", &BTreeMap::new())
            .await
            .unwrap();

        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_search_rejects_empty_query() {
        let provider = Arc::new(MockProvider::new());
        let index = Index::new("catalog", provider.clone());

        assert!(matches!(
            index.search("   ").await,
            Err(IndexError::InvalidSyntax(_))
        ));
        assert!(matches!(
            index.delete_by_search("").await,
            Err(IndexError::InvalidSyntax(_))
        ));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_add_function_rejects_blank_definition() {
        let provider = Arc::new(MockProvider::new());
        let index = Index::new("catalog", provider);

        assert!(matches!(
            index.add_function(1, " ").await,
            Err(IndexError::InvalidSyntax(_))
        ));
    }

    #[tokio::test]
    async fn test_promote_requires_query() {
        let provider = Arc::new(MockProvider::new());
        let index = Index::new("catalog", provider);

        assert!(matches!(
            index.promote("doc1", "").await,
            Err(IndexError::InvalidArgument(_))
        ));
        assert!(index.promote("doc1", "shoe").await.is_ok());
    }
}
