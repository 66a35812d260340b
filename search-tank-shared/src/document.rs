//! Document type indexed by the search service.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Maximum length of a document identifier, in bytes once UTF-8 encoded.
pub const MAX_DOCID_BYTES: usize = 1024;

/// A document to be stored in an index.
///
/// `fields` hold the searchable text. `variables` are numeric slots that
/// scoring functions can reference, and `categories` are facet values. A
/// blank category value means "remove this category" rather than an empty
/// value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Unique document identifier.
    pub docid: String,
    /// Field name to text.
    pub fields: BTreeMap<String, String>,
    /// Variable index to value, used by scoring functions.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub variables: BTreeMap<u32, f32>,
    /// Facet category name to value.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub categories: BTreeMap<String, String>,
}

impl Document {
    /// Create an empty document with the given identifier.
    pub fn new(docid: impl Into<String>) -> Self {
        Self {
            docid: docid.into(),
            ..Default::default()
        }
    }

    /// Set a text field.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Replace all text fields.
    pub fn with_fields(mut self, fields: BTreeMap<String, String>) -> Self {
        self.fields = fields;
        self
    }

    /// Set a scoring variable.
    pub fn with_variable(mut self, index: u32, value: f32) -> Self {
        self.variables.insert(index, value);
        self
    }

    /// Replace all scoring variables.
    pub fn with_variables(mut self, variables: BTreeMap<u32, f32>) -> Self {
        self.variables = variables;
        self
    }

    /// Set a facet category.
    pub fn with_category(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.categories.insert(name.into(), value.into());
        self
    }

    /// Replace all facet categories.
    pub fn with_categories(mut self, categories: BTreeMap<String, String>) -> Self {
        self.categories = categories;
        self
    }
}
