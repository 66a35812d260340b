//! Result types for batch operations and document validation.

use search_tank_shared::{Document, MAX_DOCID_BYTES};

use crate::errors::IndexError;

/// Validate a document identifier before it is sent anywhere.
///
/// Identifiers must be non-empty and at most [`MAX_DOCID_BYTES`] bytes
/// once UTF-8 encoded.
pub fn validate_docid(docid: &str) -> Result<(), IndexError> {
    if docid.is_empty() {
        return Err(IndexError::invalid_argument("docid is required"));
    }
    if docid.len() > MAX_DOCID_BYTES {
        return Err(IndexError::invalid_argument(format!(
            "docid is {} bytes long, maximum is {}",
            docid.len(),
            MAX_DOCID_BYTES
        )));
    }
    Ok(())
}

/// Validate a whole document.
pub fn validate_document(document: &Document) -> Result<(), IndexError> {
    validate_docid(&document.docid)?;
    if document.fields.is_empty() {
        return Err(IndexError::invalid_argument(format!(
            "document {} has no fields",
            document.docid
        )));
    }
    Ok(())
}

/// Outcome of adding a single document within a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchResult {
    /// The submitted document identifier.
    pub docid: String,
    /// Whether the document was added.
    pub added: bool,
    /// Error if the document was rejected.
    pub error: Option<IndexError>,
}

impl BatchResult {
    pub fn added(docid: impl Into<String>) -> Self {
        Self {
            docid: docid.into(),
            added: true,
            error: None,
        }
    }

    pub fn failed(docid: impl Into<String>, error: IndexError) -> Self {
        Self {
            docid: docid.into(),
            added: false,
            error: Some(error),
        }
    }
}

/// Per-document outcome of a batch add.
///
/// `results` holds one entry per submitted document, in submission order,
/// so partial failures can be matched back to their input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchResults {
    /// Total number of documents in the batch.
    pub total: usize,
    /// Number of documents added.
    pub succeeded: usize,
    /// Number of documents rejected.
    pub failed: usize,
    /// Individual results for each document.
    pub results: Vec<BatchResult>,
}

impl BatchResults {
    /// Build the summary counters from individual results.
    pub fn from_results(results: Vec<BatchResult>) -> Self {
        let succeeded = results.iter().filter(|r| r.added).count();
        Self {
            total: results.len(),
            succeeded,
            failed: results.len() - succeeded,
            results,
        }
    }

    /// Results of the rejected documents.
    pub fn failures(&self) -> impl Iterator<Item = &BatchResult> {
        self.results.iter().filter(|r| !r.added)
    }

    /// Whether every document in the batch was added.
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}

/// Outcome of deleting a single document within a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteResult {
    /// The submitted document identifier.
    pub docid: String,
    /// Whether the delete was accepted. A missing document counts as deleted.
    pub deleted: bool,
    /// Error if the delete was rejected.
    pub error: Option<IndexError>,
}

impl DeleteResult {
    pub fn deleted(docid: impl Into<String>) -> Self {
        Self {
            docid: docid.into(),
            deleted: true,
            error: None,
        }
    }

    pub fn failed(docid: impl Into<String>, error: IndexError) -> Self {
        Self {
            docid: docid.into(),
            deleted: false,
            error: Some(error),
        }
    }
}

/// Per-document outcome of a batch delete, in submission order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkDeleteResults {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub results: Vec<DeleteResult>,
}

impl BulkDeleteResults {
    pub fn from_results(results: Vec<DeleteResult>) -> Self {
        let succeeded = results.iter().filter(|r| r.deleted).count();
        Self {
            total: results.len(),
            succeeded,
            failed: results.len() - succeeded,
            results,
        }
    }

    pub fn failures(&self) -> impl Iterator<Item = &DeleteResult> {
        self.results.iter().filter(|r| !r.deleted)
    }
}
