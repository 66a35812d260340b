//! In-memory provider implementation.
//!
//! Keeps every index in process memory behind an async `RwLock`. Used by
//! tests and for running the binary without a service. Search applies the
//! same request semantics as the service: boolean term matching, filters,
//! facets, promotions and scoring functions.

mod function;
mod matching;

use std::collections::BTreeMap;
use std::time::Instant;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};

use crate::errors::IndexError;
use crate::interfaces::IndexProvider;
use crate::types::{
    validate_docid, validate_document, BatchResult, BatchResults, BulkDeleteResults,
    DeleteResult,
};
use function::{Expr, ScoringContext};
use matching::{promotion_key, TextQuery};
use search_tank_shared::{
    Document, IndexMetadata, IndexOptions, Query, Range, SearchHit, SearchResults,
};

/// A stored document and when it was last indexed.
struct StoredDocument {
    document: Document,
    indexed_at: DateTime<Utc>,
}

struct MemoryIndex {
    metadata: IndexMetadata,
    documents: BTreeMap<String, StoredDocument>,
    functions: BTreeMap<u32, (String, Expr)>,
    /// Normalized query text to promoted docid.
    promotions: BTreeMap<String, String>,
}

impl MemoryIndex {
    fn metadata(&self) -> IndexMetadata {
        IndexMetadata {
            size: self.documents.len() as u64,
            ..self.metadata.clone()
        }
    }

    fn upsert(&mut self, document: &Document) {
        let mut document = document.clone();
        // Blank categories are removals, never stored
        document.categories.retain(|_, value| !value.trim().is_empty());
        self.documents.insert(
            document.docid.clone(),
            StoredDocument {
                document,
                indexed_at: Utc::now(),
            },
        );
    }

    fn document_mut(&mut self, docid: &str) -> Result<&mut Document, IndexError> {
        self.documents
            .get_mut(docid)
            .map(|stored| &mut stored.document)
            .ok_or_else(|| IndexError::invalid_argument(format!("document {:?} not found", docid)))
    }

    /// Docids matching `query`, with relevance, before ranking.
    fn matching(&self, query: &Query) -> Result<Vec<(&StoredDocument, f64)>, IndexError> {
        let text = TextQuery::parse(&query.text)?;
        let function = match query.function {
            Some(slot) => Some(self.function(slot)?),
            None => None,
        };
        let function_filters = query
            .function_filters
            .iter()
            .map(|(slot, ranges)| Ok((self.function(*slot)?, ranges)))
            .collect::<Result<Vec<_>, IndexError>>()?;

        let now = Utc::now();
        let mut matches = Vec::new();
        for stored in self.documents.values() {
            let document = &stored.document;
            let Some(relevance) = text.score(&document.fields) else {
                continue;
            };
            if !passes_category_filters(document, &query.category_filters)
                || !passes_docvar_filters(document, &query.docvar_filters)
            {
                continue;
            }

            let ctx = ScoringContext {
                relevance,
                age: (now - stored.indexed_at).num_milliseconds() as f64 / 1000.0,
                doc_vars: &document.variables,
                query_vars: &query.variables,
            };
            if !function_filters
                .iter()
                .all(|(expr, ranges)| in_any_range(expr.evaluate(&ctx), ranges))
            {
                continue;
            }

            let score = function.map_or(relevance, |expr| expr.evaluate(&ctx));
            matches.push((stored, score));
        }

        Ok(matches)
    }

    fn function(&self, slot: u32) -> Result<&Expr, IndexError> {
        self.functions
            .get(&slot)
            .map(|(_, expr)| expr)
            .ok_or_else(|| {
                IndexError::invalid_argument(format!("no scoring function at slot {}", slot))
            })
    }
}

fn passes_category_filters(document: &Document, filters: &BTreeMap<String, Vec<String>>) -> bool {
    filters.iter().all(|(category, accepted)| {
        document
            .categories
            .get(category)
            .map_or(false, |value| accepted.iter().any(|a| a == value))
    })
}

fn passes_docvar_filters(document: &Document, filters: &BTreeMap<u32, Vec<Range>>) -> bool {
    filters.iter().all(|(index, ranges)| {
        document
            .variables
            .get(index)
            .map_or(false, |value| in_any_range(*value as f64, ranges))
    })
}

fn in_any_range(value: f64, ranges: &[Range]) -> bool {
    ranges.is_empty() || ranges.iter().any(|range| range.contains(value))
}

/// In-memory implementation of `IndexProvider`.
///
/// Indexes start immediately unless the provider was built with
/// [`InMemoryIndexProvider::with_delayed_start`], in which case they answer
/// `ServiceNotReady` until [`InMemoryIndexProvider::mark_started`] is called.
pub struct InMemoryIndexProvider {
    indexes: RwLock<BTreeMap<String, MemoryIndex>>,
    max_indexes: Option<usize>,
    auto_start: bool,
}

impl InMemoryIndexProvider {
    /// Create an empty provider with no index limit.
    pub fn new() -> Self {
        Self {
            indexes: RwLock::new(BTreeMap::new()),
            max_indexes: None,
            auto_start: true,
        }
    }

    /// Limit the number of indexes; further creates fail with `QuotaExceeded`.
    pub fn with_max_indexes(mut self, max_indexes: usize) -> Self {
        self.max_indexes = Some(max_indexes);
        self
    }

    /// Keep new indexes in the starting state until `mark_started`.
    pub fn with_delayed_start(mut self) -> Self {
        self.auto_start = false;
        self
    }

    /// Finish starting an index.
    pub async fn mark_started(&self, name: &str) -> Result<(), IndexError> {
        let mut indexes = self.indexes.write().await;
        let index = indexes
            .get_mut(name)
            .ok_or_else(|| IndexError::not_found(name))?;
        index.metadata.started = true;

        info!(index = %name, "Index started");
        Ok(())
    }

    async fn read<T>(
        &self,
        name: &str,
        f: impl FnOnce(&MemoryIndex) -> Result<T, IndexError>,
    ) -> Result<T, IndexError> {
        let indexes = self.indexes.read().await;
        let index = indexes.get(name).ok_or_else(|| IndexError::not_found(name))?;
        if !index.metadata.started {
            return Err(IndexError::service_not_ready(name));
        }
        f(index)
    }

    async fn write<T>(
        &self,
        name: &str,
        f: impl FnOnce(&mut MemoryIndex) -> Result<T, IndexError>,
    ) -> Result<T, IndexError> {
        let mut indexes = self.indexes.write().await;
        let index = indexes
            .get_mut(name)
            .ok_or_else(|| IndexError::not_found(name))?;
        if !index.metadata.started {
            return Err(IndexError::service_not_ready(name));
        }
        f(index)
    }
}

impl Default for InMemoryIndexProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IndexProvider for InMemoryIndexProvider {
    #[instrument(skip(self))]
    async fn create_index(
        &self,
        name: &str,
        options: &IndexOptions,
    ) -> Result<IndexMetadata, IndexError> {
        let mut indexes = self.indexes.write().await;
        if indexes.contains_key(name) {
            return Err(IndexError::already_exists(name));
        }
        if let Some(max) = self.max_indexes {
            if indexes.len() >= max {
                return Err(IndexError::quota_exceeded(format!(
                    "account is limited to {} indexes",
                    max
                )));
            }
        }

        let index = MemoryIndex {
            metadata: IndexMetadata {
                code: index_code(name),
                creation_time: Utc::now(),
                started: self.auto_start,
                size: 0,
                public_search: options.public_search,
            },
            documents: BTreeMap::new(),
            functions: BTreeMap::new(),
            promotions: BTreeMap::new(),
        };
        let metadata = index.metadata();
        indexes.insert(name.to_string(), index);

        info!(index = %name, code = %metadata.code, "Index created");
        Ok(metadata)
    }

    #[instrument(skip(self))]
    async fn delete_index(&self, name: &str) -> Result<(), IndexError> {
        let mut indexes = self.indexes.write().await;
        if indexes.remove(name).is_none() {
            return Err(IndexError::not_found(name));
        }

        info!(index = %name, "Index deleted");
        Ok(())
    }

    async fn index_metadata(&self, name: &str) -> Result<IndexMetadata, IndexError> {
        let indexes = self.indexes.read().await;
        indexes
            .get(name)
            .map(MemoryIndex::metadata)
            .ok_or_else(|| IndexError::not_found(name))
    }

    async fn list_indexes(&self) -> Result<BTreeMap<String, IndexMetadata>, IndexError> {
        let indexes = self.indexes.read().await;
        Ok(indexes
            .iter()
            .map(|(name, index)| (name.clone(), index.metadata()))
            .collect())
    }

    #[instrument(skip(self, document), fields(docid = %document.docid))]
    async fn add_document(&self, name: &str, document: &Document) -> Result<(), IndexError> {
        validate_document(document)?;
        self.write(name, |index| {
            index.upsert(document);
            Ok(())
        })
        .await?;

        debug!(index = %name, docid = %document.docid, "Document indexed");
        Ok(())
    }

    #[instrument(skip(self, documents), fields(count = documents.len()))]
    async fn add_documents(
        &self,
        name: &str,
        documents: &[Document],
    ) -> Result<BatchResults, IndexError> {
        self.write(name, |index| {
            let results = documents
                .iter()
                .map(|document| match validate_document(document) {
                    Ok(()) => {
                        index.upsert(document);
                        BatchResult::added(document.docid.clone())
                    }
                    Err(e) => BatchResult::failed(document.docid.clone(), e),
                })
                .collect();
            Ok(BatchResults::from_results(results))
        })
        .await
    }

    #[instrument(skip(self))]
    async fn delete_document(&self, name: &str, docid: &str) -> Result<(), IndexError> {
        validate_docid(docid)?;
        self.write(name, |index| {
            index.documents.remove(docid);
            Ok(())
        })
        .await
    }

    #[instrument(skip(self, docids), fields(count = docids.len()))]
    async fn delete_documents(
        &self,
        name: &str,
        docids: &[String],
    ) -> Result<BulkDeleteResults, IndexError> {
        self.write(name, |index| {
            let results = docids
                .iter()
                .map(|docid| match validate_docid(docid) {
                    Ok(()) => {
                        index.documents.remove(docid);
                        DeleteResult::deleted(docid.clone())
                    }
                    Err(e) => DeleteResult::failed(docid.clone(), e),
                })
                .collect();
            Ok(BulkDeleteResults::from_results(results))
        })
        .await
    }

    #[instrument(skip(self, query), fields(query = %query.text))]
    async fn delete_by_search(&self, name: &str, query: &Query) -> Result<(), IndexError> {
        self.write(name, |index| {
            let docids: Vec<String> = index
                .matching(query)?
                .into_iter()
                .map(|(stored, _)| stored.document.docid.clone())
                .collect();
            for docid in &docids {
                index.documents.remove(docid);
            }

            debug!(index = %name, deleted = docids.len(), "Deleted documents by search");
            Ok(())
        })
        .await
    }

    #[instrument(skip(self, variables))]
    async fn update_variables(
        &self,
        name: &str,
        docid: &str,
        variables: &BTreeMap<u32, f32>,
    ) -> Result<(), IndexError> {
        self.write(name, |index| {
            let document = index.document_mut(docid)?;
            document
                .variables
                .extend(variables.iter().map(|(k, v)| (*k, *v)));
            Ok(())
        })
        .await
    }

    #[instrument(skip(self, categories))]
    async fn update_categories(
        &self,
        name: &str,
        docid: &str,
        categories: &BTreeMap<String, String>,
    ) -> Result<(), IndexError> {
        self.write(name, |index| {
            let document = index.document_mut(docid)?;
            for (category, value) in categories {
                if value.trim().is_empty() {
                    document.categories.remove(category);
                } else {
                    document.categories.insert(category.clone(), value.clone());
                }
            }
            Ok(())
        })
        .await
    }

    #[instrument(skip(self))]
    async fn promote(&self, name: &str, docid: &str, query: &str) -> Result<(), IndexError> {
        validate_docid(docid)?;
        self.write(name, |index| {
            index
                .promotions
                .insert(promotion_key(query), docid.to_string());
            Ok(())
        })
        .await
    }

    #[instrument(skip(self))]
    async fn add_function(
        &self,
        name: &str,
        slot: u32,
        definition: &str,
    ) -> Result<(), IndexError> {
        let expr = Expr::parse(definition)?;
        self.write(name, |index| {
            index
                .functions
                .insert(slot, (definition.to_string(), expr));
            Ok(())
        })
        .await
    }

    #[instrument(skip(self))]
    async fn delete_function(&self, name: &str, slot: u32) -> Result<(), IndexError> {
        self.write(name, |index| {
            index.functions.remove(&slot);
            Ok(())
        })
        .await
    }

    async fn list_functions(&self, name: &str) -> Result<BTreeMap<u32, String>, IndexError> {
        self.read(name, |index| {
            Ok(index
                .functions
                .iter()
                .map(|(slot, (definition, _))| (*slot, definition.clone()))
                .collect())
        })
        .await
    }

    #[instrument(skip(self, query), fields(query = %query.text))]
    async fn search(&self, name: &str, query: &Query) -> Result<SearchResults, IndexError> {
        let started = Instant::now();
        self.read(name, |index| {
            let text = TextQuery::parse(&query.text)?;
            let mut matches = index.matching(query)?;

            let promoted = index.promotions.get(&promotion_key(&query.text));
            matches.sort_by(|(a, a_score), (b, b_score)| {
                let a_promoted = promoted == Some(&a.document.docid);
                let b_promoted = promoted == Some(&b.document.docid);
                b_promoted
                    .cmp(&a_promoted)
                    .then_with(|| b_score.total_cmp(a_score))
                    .then_with(|| a.document.docid.cmp(&b.document.docid))
            });

            let mut facets: BTreeMap<String, BTreeMap<String, u64>> = BTreeMap::new();
            for (stored, _) in &matches {
                for (category, value) in &stored.document.categories {
                    *facets
                        .entry(category.clone())
                        .or_default()
                        .entry(value.clone())
                        .or_default() += 1;
                }
            }

            let start = query.start.unwrap_or(0) as usize;
            let len = query.page_len() as usize;
            let hits = matches
                .iter()
                .skip(start)
                .take(len)
                .map(|(stored, score)| build_hit(&stored.document, *score, query, &text))
                .collect();

            Ok(SearchResults {
                matches: matches.len() as u64,
                hits,
                facets,
                search_time: Some(started.elapsed().as_secs_f64()),
                did_you_mean: None,
            })
        })
        .await
    }
}

fn build_hit(document: &Document, score: f64, query: &Query, text: &TextQuery) -> SearchHit {
    let mut hit = SearchHit::new(document.docid.clone());
    hit.score = Some(score);

    let fetch_all = query.fetch_fields.iter().any(|field| field == "*");
    for (field, value) in &document.fields {
        if fetch_all || query.fetch_fields.contains(field) {
            hit.fields.insert(field.clone(), value.clone());
        }
        if query.snippet_fields.contains(field) {
            hit.snippets.insert(field.clone(), text.snippet(field, value));
        }
    }
    if query.fetch_variables {
        hit.variables = document
            .variables
            .iter()
            .map(|(index, value)| (*index, *value as f64))
            .collect();
    }
    if query.fetch_categories {
        hit.categories = document.categories.clone();
    }

    hit
}

/// Short code derived from the index name, stable for a given name.
fn index_code(name: &str) -> String {
    let hash = name
        .bytes()
        .fold(0xcbf29ce484222325u64, |hash, byte| {
            (hash ^ byte as u64).wrapping_mul(0x100000001b3)
        });
    (0..5)
        .map(|i| (b'a' + ((hash >> (i * 5)) % 26) as u8) as char)
        .collect()
}
