//! Index metadata as reported by the service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata for a provisioned index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexMetadata {
    /// Service-assigned index code.
    pub code: String,
    /// When the index was created.
    pub creation_time: DateTime<Utc>,
    /// Whether the index finished starting and accepts requests.
    pub started: bool,
    /// Number of documents in the index.
    pub size: u64,
    /// Whether unauthenticated search is allowed.
    pub public_search: bool,
}

/// Options used when creating an index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexOptions {
    /// Allow searching without credentials.
    pub public_search: bool,
}

impl IndexOptions {
    /// Options with public search enabled.
    pub fn public() -> Self {
        Self {
            public_search: true,
        }
    }
}
