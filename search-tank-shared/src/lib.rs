//! # Search Tank Shared
//!
//! Plain data types exchanged between the index client, its providers and
//! the command line: documents, queries, search results and index metadata.

mod document;
mod metadata;
mod query;
mod results;

pub use document::{Document, MAX_DOCID_BYTES};
pub use metadata::{IndexMetadata, IndexOptions};
pub use query::{Query, Range, DEFAULT_PAGE_LEN};
pub use results::{SearchHit, SearchResults};
