//! # Search Tank Repository
//!
//! This crate provides the client binding for the hosted full-text search
//! service. It includes the error taxonomy, the provider interface, an HTTP
//! implementation of it, an in-memory implementation for tests, and the
//! `Index` handle application code works with.

pub mod client;
pub mod config;
pub mod errors;
pub mod http;
pub mod index;
pub mod interfaces;
pub mod memory;
pub mod types;

pub use client::SearchTankClient;
pub use config::ClientConfig;
pub use errors::IndexError;
pub use http::HttpIndexProvider;
pub use index::Index;
pub use interfaces::IndexProvider;
pub use memory::InMemoryIndexProvider;
pub use types::{BatchResult, BatchResults, BulkDeleteResults, DeleteResult};
