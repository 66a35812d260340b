//! HTTP provider implementation.
//!
//! This module provides the concrete implementation of `IndexProvider`
//! using `reqwest` against the service's `/v1/indexes` REST API.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde_json::{json, Value};
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::config::ClientConfig;
use crate::errors::IndexError;
use crate::http::params::search_params;
use crate::http::wire::{parse_search_response, AddOutcome, DeleteOutcome, MetadataWire};
use crate::interfaces::IndexProvider;
use crate::types::{BatchResult, BatchResults, BulkDeleteResults, DeleteResult};
use search_tank_shared::{Document, IndexMetadata, IndexOptions, Query, SearchResults};

/// How a `400 Bad Request` answer is reported for a given call.
#[derive(Debug, Clone, Copy)]
enum BadRequest {
    /// Malformed document or argument.
    Argument,
    /// Malformed query or function expression.
    Syntax,
}

/// HTTP provider implementation.
///
/// Credentials embedded in the API URL (`https://:password@host`) are sent
/// as basic auth on every request.
///
/// # Example
///
/// ```ignore
/// let config = ClientConfig::new("https://:secret@example.api.test");
/// let provider = HttpIndexProvider::new(&config)?;
/// let results = provider.search("catalog", &Query::new("shoe")).await?;
/// ```
pub struct HttpIndexProvider {
    client: reqwest::Client,
    base_url: Url,
    credentials: Option<(String, Option<String>)>,
}

impl HttpIndexProvider {
    /// Create a new provider for the configured API URL.
    ///
    /// # Returns
    ///
    /// * `Ok(HttpIndexProvider)` - A new provider instance
    /// * `Err(IndexError)` - If the URL is invalid or the HTTP client cannot be built
    pub fn new(config: &ClientConfig) -> Result<Self, IndexError> {
        let mut base_url = config.parsed_url()?;

        let credentials = if base_url.username().is_empty() && base_url.password().is_none() {
            None
        } else {
            Some((
                base_url.username().to_string(),
                base_url.password().map(str::to_string),
            ))
        };
        // Credentials go in the Authorization header, not in logged URLs
        base_url
            .set_username("")
            .and_then(|_| base_url.set_password(None))
            .map_err(|_| IndexError::invalid_argument("API URL cannot carry credentials"))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| IndexError::transport(e.to_string()))?;

        info!(
            url = %base_url,
            authenticated = credentials.is_some(),
            timeout_secs = config.timeout_secs,
            "Created HTTP index provider"
        );

        Ok(Self {
            client,
            base_url,
            credentials,
        })
    }

    /// Build an API URL from path segments. Segments are percent-encoded.
    fn url(&self, segments: &[&str]) -> Result<Url, IndexError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| IndexError::invalid_argument(format!("Invalid API URL: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// URL of an index, or of a resource below it.
    fn index_url(&self, name: &str, rest: &[&str]) -> Result<Url, IndexError> {
        let mut segments = vec!["v1", "indexes", name];
        segments.extend_from_slice(rest);
        self.url(&segments)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, IndexError> {
        let request = match &self.credentials {
            Some((username, password)) => request.basic_auth(username, password.as_deref()),
            None => request,
        };
        Ok(request.send().await?)
    }

    /// Pass successful responses through and map the rest to `IndexError`.
    async fn check(
        response: Response,
        name: &str,
        bad_request: BadRequest,
    ) -> Result<Response, IndexError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        warn!(index = %name, status = %status, body = %body, "Request failed");
        Err(match status {
            StatusCode::BAD_REQUEST => match bad_request {
                BadRequest::Argument => IndexError::invalid_argument(body),
                BadRequest::Syntax => IndexError::invalid_syntax(body),
            },
            _ => status_error(status, body, name),
        })
    }
}

/// Mapping shared by every call for codes without a call-specific meaning.
fn status_error(status: StatusCode, body: String, name: &str) -> IndexError {
    match status {
        StatusCode::NOT_FOUND => IndexError::not_found(name),
        StatusCode::SERVICE_UNAVAILABLE => IndexError::service_not_ready(name),
        _ => IndexError::server_fault(status.as_u16(), body),
    }
}

#[async_trait]
impl IndexProvider for HttpIndexProvider {
    #[instrument(skip(self))]
    async fn create_index(
        &self,
        name: &str,
        options: &IndexOptions,
    ) -> Result<IndexMetadata, IndexError> {
        let url = self.index_url(name, &[])?;
        let response = self
            .send(
                self.client
                    .put(url)
                    .json(&json!({ "public_search": options.public_search })),
            )
            .await?;

        // 204 means the name was already provisioned, nothing was created
        match response.status() {
            StatusCode::NO_CONTENT => return Err(IndexError::already_exists(name)),
            StatusCode::CONFLICT => {
                let body = response.text().await.unwrap_or_default();
                return Err(IndexError::quota_exceeded(body));
            }
            _ => {}
        }

        let response = Self::check(response, name, BadRequest::Argument).await?;
        let wire: MetadataWire = response.json().await?;
        let metadata = IndexMetadata::try_from(wire)?;

        info!(index = %name, code = %metadata.code, "Index created");
        Ok(metadata)
    }

    #[instrument(skip(self))]
    async fn delete_index(&self, name: &str) -> Result<(), IndexError> {
        let url = self.index_url(name, &[])?;
        let response = self.send(self.client.delete(url)).await?;

        // 204 means there was nothing to delete
        if response.status() == StatusCode::NO_CONTENT {
            return Err(IndexError::not_found(name));
        }
        Self::check(response, name, BadRequest::Argument).await?;

        info!(index = %name, "Index deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn index_metadata(&self, name: &str) -> Result<IndexMetadata, IndexError> {
        let url = self.index_url(name, &[])?;
        let response = self.send(self.client.get(url)).await?;
        let response = Self::check(response, name, BadRequest::Argument).await?;

        let wire: MetadataWire = response.json().await?;
        IndexMetadata::try_from(wire)
    }

    #[instrument(skip(self))]
    async fn list_indexes(&self) -> Result<BTreeMap<String, IndexMetadata>, IndexError> {
        let url = self.url(&["v1", "indexes"])?;
        let response = self.send(self.client.get(url)).await?;
        let response = Self::check(response, "", BadRequest::Argument).await?;

        let wire: BTreeMap<String, MetadataWire> = response.json().await?;
        wire.into_iter()
            .map(|(name, metadata)| Ok((name, IndexMetadata::try_from(metadata)?)))
            .collect()
    }

    #[instrument(skip(self, document), fields(docid = %document.docid))]
    async fn add_document(&self, name: &str, document: &Document) -> Result<(), IndexError> {
        let url = self.index_url(name, &["docs"])?;
        let response = self.send(self.client.put(url).json(document)).await?;
        Self::check(response, name, BadRequest::Argument).await?;

        debug!(index = %name, docid = %document.docid, "Document indexed");
        Ok(())
    }

    #[instrument(skip(self, documents), fields(count = documents.len()))]
    async fn add_documents(
        &self,
        name: &str,
        documents: &[Document],
    ) -> Result<BatchResults, IndexError> {
        let url = self.index_url(name, &["docs"])?;
        let response = self.send(self.client.put(url).json(documents)).await?;
        let response = Self::check(response, name, BadRequest::Argument).await?;

        let outcomes: Vec<AddOutcome> = response.json().await?;
        if outcomes.len() != documents.len() {
            return Err(IndexError::transport(format!(
                "batch response has {} results for {} documents",
                outcomes.len(),
                documents.len()
            )));
        }

        let results = documents
            .iter()
            .zip(outcomes)
            .map(|(document, outcome)| {
                if outcome.added {
                    BatchResult::added(document.docid.clone())
                } else {
                    let message = outcome
                        .error
                        .unwrap_or_else(|| "rejected by server".to_string());
                    BatchResult::failed(document.docid.clone(), IndexError::invalid_argument(message))
                }
            })
            .collect();

        Ok(BatchResults::from_results(results))
    }

    #[instrument(skip(self))]
    async fn delete_document(&self, name: &str, docid: &str) -> Result<(), IndexError> {
        let url = self.index_url(name, &["docs"])?;
        let response = self
            .send(self.client.delete(url).json(&json!({ "docid": docid })))
            .await?;
        Self::check(response, name, BadRequest::Argument).await?;

        debug!(index = %name, docid = %docid, "Document deleted");
        Ok(())
    }

    #[instrument(skip(self, docids), fields(count = docids.len()))]
    async fn delete_documents(
        &self,
        name: &str,
        docids: &[String],
    ) -> Result<BulkDeleteResults, IndexError> {
        let url = self.index_url(name, &["docs"])?;
        let body: Vec<Value> = docids.iter().map(|docid| json!({ "docid": docid })).collect();
        let response = self.send(self.client.delete(url).json(&body)).await?;
        let response = Self::check(response, name, BadRequest::Argument).await?;

        let outcomes: Vec<DeleteOutcome> = response.json().await?;
        if outcomes.len() != docids.len() {
            return Err(IndexError::transport(format!(
                "delete response has {} results for {} documents",
                outcomes.len(),
                docids.len()
            )));
        }

        let results = docids
            .iter()
            .zip(outcomes)
            .map(|(docid, outcome)| {
                if outcome.deleted {
                    DeleteResult::deleted(docid.clone())
                } else {
                    let message = outcome
                        .error
                        .unwrap_or_else(|| "rejected by server".to_string());
                    DeleteResult::failed(docid.clone(), IndexError::invalid_argument(message))
                }
            })
            .collect();

        Ok(BulkDeleteResults::from_results(results))
    }

    #[instrument(skip(self, query), fields(query = %query.text))]
    async fn delete_by_search(&self, name: &str, query: &Query) -> Result<(), IndexError> {
        let url = self.index_url(name, &["search"])?;
        let response = self
            .send(self.client.delete(url).query(&search_params(query)))
            .await?;
        Self::check(response, name, BadRequest::Syntax).await?;
        Ok(())
    }

    #[instrument(skip(self, variables))]
    async fn update_variables(
        &self,
        name: &str,
        docid: &str,
        variables: &BTreeMap<u32, f32>,
    ) -> Result<(), IndexError> {
        let url = self.index_url(name, &["docs", "variables"])?;
        let response = self
            .send(
                self.client
                    .put(url)
                    .json(&json!({ "docid": docid, "variables": variables })),
            )
            .await?;
        Self::check(response, name, BadRequest::Argument).await?;
        Ok(())
    }

    #[instrument(skip(self, categories))]
    async fn update_categories(
        &self,
        name: &str,
        docid: &str,
        categories: &BTreeMap<String, String>,
    ) -> Result<(), IndexError> {
        let url = self.index_url(name, &["docs", "categories"])?;
        let response = self
            .send(
                self.client
                    .put(url)
                    .json(&json!({ "docid": docid, "categories": categories })),
            )
            .await?;
        Self::check(response, name, BadRequest::Argument).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn promote(&self, name: &str, docid: &str, query: &str) -> Result<(), IndexError> {
        let url = self.index_url(name, &["promote"])?;
        let response = self
            .send(
                self.client
                    .put(url)
                    .json(&json!({ "docid": docid, "query": query })),
            )
            .await?;
        Self::check(response, name, BadRequest::Argument).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn add_function(
        &self,
        name: &str,
        slot: u32,
        definition: &str,
    ) -> Result<(), IndexError> {
        let slot = slot.to_string();
        let url = self.index_url(name, &["functions", &slot])?;
        let response = self
            .send(
                self.client
                    .put(url)
                    .json(&json!({ "definition": definition })),
            )
            .await?;
        Self::check(response, name, BadRequest::Syntax).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_function(&self, name: &str, slot: u32) -> Result<(), IndexError> {
        let slot = slot.to_string();
        let url = self.index_url(name, &["functions", &slot])?;
        let response = self.send(self.client.delete(url)).await?;
        Self::check(response, name, BadRequest::Argument).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_functions(&self, name: &str) -> Result<BTreeMap<u32, String>, IndexError> {
        let url = self.index_url(name, &["functions"])?;
        let response = self.send(self.client.get(url)).await?;
        let response = Self::check(response, name, BadRequest::Argument).await?;
        Ok(response.json().await?)
    }

    #[instrument(skip(self, query), fields(query = %query.text))]
    async fn search(&self, name: &str, query: &Query) -> Result<SearchResults, IndexError> {
        let url = self.index_url(name, &["search"])?;
        let response = self
            .send(self.client.get(url).query(&search_params(query)))
            .await?;
        let response = Self::check(response, name, BadRequest::Syntax).await?;

        let body: Value = response.json().await?;
        parse_search_response(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn provider_for(server: &MockServer) -> HttpIndexProvider {
        HttpIndexProvider::new(&ClientConfig::new(server.uri())).unwrap()
    }

    fn metadata_body() -> Value {
        json!({
            "code": "dbajo",
            "creation_time": "2010-08-11T20:50:10",
            "started": false,
            "size": 0,
            "public_search": false
        })
    }

    #[test]
    fn test_index_url_encodes_name() {
        let provider = HttpIndexProvider::new(&ClientConfig::new("http://localhost:8080")).unwrap();
        let url = provider.index_url("my index", &["docs"]).unwrap();

        assert_eq!(url.as_str(), "http://localhost:8080/v1/indexes/my%20index/docs");
    }

    #[test]
    fn test_index_url_keeps_base_path() {
        let provider =
            HttpIndexProvider::new(&ClientConfig::new("http://localhost:8080/api/")).unwrap();
        let url = provider.index_url("catalog", &[]).unwrap();

        assert_eq!(url.as_str(), "http://localhost:8080/api/v1/indexes/catalog");
    }

    #[test]
    fn test_credentials_are_moved_out_of_url() {
        let provider =
            HttpIndexProvider::new(&ClientConfig::new("http://:secret@localhost:8080")).unwrap();

        assert_eq!(
            provider.credentials,
            Some((String::new(), Some("secret".to_string())))
        );
        assert!(!provider.base_url.as_str().contains("secret"));
    }

    #[tokio::test]
    async fn test_create_index() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/v1/indexes/catalog"))
            .and(body_json(json!({ "public_search": false })))
            .respond_with(ResponseTemplate::new(201).set_body_json(metadata_body()))
            .mount(&server)
            .await;

        let provider = provider_for(&server).await;
        let metadata = provider
            .create_index("catalog", &IndexOptions::default())
            .await
            .unwrap();

        assert_eq!(metadata.code, "dbajo");
        assert!(!metadata.started);
    }

    #[tokio::test]
    async fn test_create_index_already_exists() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/v1/indexes/catalog"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let provider = provider_for(&server).await;
        let result = provider.create_index("catalog", &IndexOptions::default()).await;

        assert_eq!(result, Err(IndexError::already_exists("catalog")));
    }

    #[tokio::test]
    async fn test_create_index_quota_exceeded() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/v1/indexes/catalog"))
            .respond_with(ResponseTemplate::new(409).set_body_string("Too many indexes"))
            .mount(&server)
            .await;

        let provider = provider_for(&server).await;
        let result = provider.create_index("catalog", &IndexOptions::default()).await;

        assert_eq!(result, Err(IndexError::quota_exceeded("Too many indexes")));
    }

    #[tokio::test]
    async fn test_delete_index_missing() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/v1/indexes/catalog"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let provider = provider_for(&server).await;
        assert_eq!(
            provider.delete_index("catalog").await,
            Err(IndexError::not_found("catalog"))
        );
    }

    #[tokio::test]
    async fn test_metadata_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/indexes/catalog"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let provider = provider_for(&server).await;
        assert_eq!(
            provider.index_metadata("catalog").await,
            Err(IndexError::not_found("catalog"))
        );
    }

    #[tokio::test]
    async fn test_service_not_ready() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/v1/indexes/catalog/docs"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let provider = provider_for(&server).await;
        let document = Document::new("doc1").with_field("title", "shoe");

        assert_eq!(
            provider.add_document("catalog", &document).await,
            Err(IndexError::service_not_ready("catalog"))
        );
    }

    #[tokio::test]
    async fn test_unexpected_status_is_transient_fault() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/v1/indexes/catalog/docs"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let provider = provider_for(&server).await;
        let document = Document::new("doc1").with_field("title", "shoe");
        let error = provider.add_document("catalog", &document).await.unwrap_err();

        assert_eq!(error, IndexError::server_fault(500, "boom"));
        assert!(error.is_retryable());
    }

    #[tokio::test]
    async fn test_add_document_body() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/v1/indexes/catalog/docs"))
            .and(body_json(json!({
                "docid": "doc1",
                "fields": { "title": "shoe" },
                "variables": { "0": 2.5 },
                "categories": { "color": "red" }
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let provider = provider_for(&server).await;
        let document = Document::new("doc1")
            .with_field("title", "shoe")
            .with_variable(0, 2.5)
            .with_category("color", "red");

        provider.add_document("catalog", &document).await.unwrap();
    }

    #[tokio::test]
    async fn test_add_documents_partial_failure() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/v1/indexes/catalog/docs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "added": true },
                { "added": false, "error": "Invalid field" },
                { "added": true }
            ])))
            .mount(&server)
            .await;

        let provider = provider_for(&server).await;
        let documents: Vec<Document> = ["a", "b", "c"]
            .iter()
            .map(|id| Document::new(*id).with_field("text", "x"))
            .collect();

        let results = provider.add_documents("catalog", &documents).await.unwrap();

        assert_eq!(results.total, 3);
        assert_eq!(results.failed, 1);
        assert_eq!(results.results[1].docid, "b");
        assert_eq!(
            results.results[1].error,
            Some(IndexError::invalid_argument("Invalid field"))
        );
    }

    #[tokio::test]
    async fn test_add_documents_mismatched_response() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/v1/indexes/catalog/docs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "added": true }])))
            .mount(&server)
            .await;

        let provider = provider_for(&server).await;
        let documents = vec![
            Document::new("a").with_field("text", "x"),
            Document::new("b").with_field("text", "x"),
        ];

        assert!(matches!(
            provider.add_documents("catalog", &documents).await,
            Err(IndexError::Transport(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_documents() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/v1/indexes/catalog/docs"))
            .and(body_json(json!([{ "docid": "a" }, { "docid": "b" }])))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "deleted": true },
                { "deleted": false, "error": "Invalid docid" }
            ])))
            .mount(&server)
            .await;

        let provider = provider_for(&server).await;
        let results = provider
            .delete_documents("catalog", &["a".to_string(), "b".to_string()])
            .await
            .unwrap();

        assert_eq!(results.succeeded, 1);
        assert_eq!(results.failed, 1);
        assert!(!results.results[1].deleted);
    }

    #[tokio::test]
    async fn test_search() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/indexes/catalog/search"))
            .and(query_param("q", "shoe"))
            .and(query_param("len", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "matches": 1,
                "search_time": "0.002",
                "facets": {},
                "results": [{ "docid": "doc1", "query_relevance_score": 0.7 }]
            })))
            .mount(&server)
            .await;

        let provider = provider_for(&server).await;
        let results = provider
            .search("catalog", &Query::new("shoe").with_len(5))
            .await
            .unwrap();

        assert_eq!(results.matches, 1);
        assert!(results.contains("doc1"));
    }

    #[tokio::test]
    async fn test_search_invalid_syntax() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/indexes/catalog/search"))
            .respond_with(ResponseTemplate::new(400).set_body_string("Invalid query"))
            .mount(&server)
            .await;

        let provider = provider_for(&server).await;
        assert_eq!(
            provider.search("catalog", &Query::new("title:(")).await,
            Err(IndexError::invalid_syntax("Invalid query"))
        );
    }

    #[tokio::test]
    async fn test_add_function_invalid_syntax() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/v1/indexes/catalog/functions/1"))
            .and(body_json(json!({ "definition": "log(" })))
            .respond_with(ResponseTemplate::new(400).set_body_string("Invalid function"))
            .mount(&server)
            .await;

        let provider = provider_for(&server).await;
        assert_eq!(
            provider.add_function("catalog", 1, "log(").await,
            Err(IndexError::invalid_syntax("Invalid function"))
        );
    }

    #[tokio::test]
    async fn test_list_functions() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/indexes/catalog/functions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "0": "-age", "2": "relevance" })),
            )
            .mount(&server)
            .await;

        let provider = provider_for(&server).await;
        let functions = provider.list_functions("catalog").await.unwrap();

        assert_eq!(functions.get(&0), Some(&"-age".to_string()));
        assert_eq!(functions.get(&2), Some(&"relevance".to_string()));
    }

    #[tokio::test]
    async fn test_list_indexes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/indexes"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "catalog": metadata_body() })),
            )
            .mount(&server)
            .await;

        let provider = provider_for(&server).await;
        let indexes = provider.list_indexes().await.unwrap();

        assert_eq!(indexes.len(), 1);
        assert_eq!(indexes["catalog"].code, "dbajo");
    }

    #[tokio::test]
    async fn test_update_categories_body() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/v1/indexes/catalog/docs/categories"))
            .and(body_json(json!({
                "docid": "doc1",
                "categories": { "color": "" }
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let provider = provider_for(&server).await;
        let categories = BTreeMap::from([("color".to_string(), String::new())]);

        provider
            .update_categories("catalog", "doc1", &categories)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        // Nothing listens on port 9 locally
        let provider = HttpIndexProvider::new(&ClientConfig::new("http://127.0.0.1:9")).unwrap();
        assert!(matches!(
            provider.index_metadata("catalog").await,
            Err(IndexError::Transport(_))
        ));
    }
}
