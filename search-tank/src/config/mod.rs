//! Configuration and dependency wiring for the search-tank binary.

mod dependencies;

pub use dependencies::Dependencies;
