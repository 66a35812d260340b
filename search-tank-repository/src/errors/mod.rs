//! Error types for the search-tank repository.

mod index_error;

pub use index_error::IndexError;
