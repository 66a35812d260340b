//! # Search Tank
//!
//! Command-line client for the hosted full-text search service.
//!
//! This crate provides the configuration, logging setup and command handlers
//! behind the `search-tank` binary.

pub mod cli;
pub mod config;
pub mod logging;

pub use config::Dependencies;

use thiserror::Error;

/// Errors that can occur while setting up or running a command.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Invalid command-line input.
    #[error("Invalid input: {0}")]
    InputError(String),

    /// Error reported by the search service or the client.
    #[error("Index error: {0}")]
    IndexError(#[from] search_tank_repository::IndexError),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON encoding or decoding error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl AppError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Create an input error.
    pub fn input(msg: impl Into<String>) -> Self {
        Self::InputError(msg.into())
    }
}
