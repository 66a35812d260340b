//! Search result types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One matching document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// The matching document's identifier.
    pub docid: String,
    /// Relevance score assigned by the ranking function, when reported.
    pub score: Option<f64>,
    /// Fetched fields.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, String>,
    /// Snippets keyed by field name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub snippets: BTreeMap<String, String>,
    /// Fetched variables.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub variables: BTreeMap<u32, f64>,
    /// Fetched categories.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub categories: BTreeMap<String, String>,
}

impl SearchHit {
    pub fn new(docid: impl Into<String>) -> Self {
        Self {
            docid: docid.into(),
            ..Default::default()
        }
    }
}

/// Ranked results of a search, best match first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    /// Total number of matching documents, across all pages.
    pub matches: u64,
    /// The requested page of hits, in rank order.
    pub hits: Vec<SearchHit>,
    /// Category name to value to number of matching documents.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub facets: BTreeMap<String, BTreeMap<String, u64>>,
    /// Server-side search time in seconds.
    pub search_time: Option<f64>,
    /// Spelling suggestion for the query, if any.
    pub did_you_mean: Option<String>,
}

impl SearchResults {
    /// Identifiers of the returned hits, in rank order.
    pub fn docids(&self) -> impl Iterator<Item = &str> {
        self.hits.iter().map(|hit| hit.docid.as_str())
    }

    /// Whether the returned page contains `docid`.
    pub fn contains(&self, docid: &str) -> bool {
        self.docids().any(|id| id == docid)
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}
