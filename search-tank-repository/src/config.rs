//! Configuration types for the search-tank client.

use std::env;

use url::Url;

use crate::errors::IndexError;

/// Default service URL.
pub const DEFAULT_API_URL: &str = "http://localhost:8080";

/// Default per-request timeout, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default maximum number of documents in a single batch call.
pub const DEFAULT_MAX_BATCH_SIZE: usize = 1000;

/// Configuration for the search-tank client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the service. Credentials, if any, travel in the URL.
    pub api_url: String,
    /// Maximum number of documents allowed in a single batch operation.
    /// Set to None to disable the limit (not recommended for production).
    pub max_batch_size: Option<usize>,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            max_batch_size: Some(DEFAULT_MAX_BATCH_SIZE),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ClientConfig {
    /// Create a config for the given service URL with default limits.
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            ..Default::default()
        }
    }

    /// Create a config with no batch size limit (use with caution).
    pub fn unlimited() -> Self {
        Self {
            max_batch_size: None,
            ..Default::default()
        }
    }

    /// Create a config with a custom batch size limit.
    pub fn with_max_batch_size(max_batch_size: usize) -> Self {
        Self {
            max_batch_size: Some(max_batch_size),
            ..Default::default()
        }
    }

    /// Override the request timeout.
    pub fn timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Build a config from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `SEARCH_TANK_API_URL`: service URL (default: http://localhost:8080)
    /// - `SEARCH_TANK_MAX_BATCH_SIZE`: batch limit, `0` disables it (default: 1000)
    /// - `SEARCH_TANK_TIMEOUT_SECS`: request timeout (default: 30)
    pub fn from_env() -> Result<Self, IndexError> {
        let api_url =
            env::var("SEARCH_TANK_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        let max_batch_size = match env::var("SEARCH_TANK_MAX_BATCH_SIZE") {
            Ok(raw) => match raw.trim().parse::<usize>() {
                Ok(0) => None,
                Ok(n) => Some(n),
                Err(e) => {
                    return Err(IndexError::invalid_argument(format!(
                        "SEARCH_TANK_MAX_BATCH_SIZE={}: {}",
                        raw, e
                    )))
                }
            },
            Err(_) => Some(DEFAULT_MAX_BATCH_SIZE),
        };

        let timeout_secs = match env::var("SEARCH_TANK_TIMEOUT_SECS") {
            Ok(raw) => raw.trim().parse::<u64>().map_err(|e| {
                IndexError::invalid_argument(format!("SEARCH_TANK_TIMEOUT_SECS={}: {}", raw, e))
            })?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        let config = Self {
            api_url,
            max_batch_size,
            timeout_secs,
        };
        config.parsed_url()?;
        Ok(config)
    }

    /// Parse and validate the service URL.
    pub fn parsed_url(&self) -> Result<Url, IndexError> {
        let url = Url::parse(&self.api_url)
            .map_err(|e| IndexError::invalid_argument(format!("Invalid API URL: {}", e)))?;
        if url.cannot_be_a_base() {
            return Err(IndexError::invalid_argument(format!(
                "Invalid API URL: {}",
                self.api_url
            )));
        }
        Ok(url)
    }

    /// Check if batch size exceeds the configured limit.
    pub fn validate_batch_size(&self, size: usize) -> Result<(), IndexError> {
        if let Some(max) = self.max_batch_size {
            if size > max {
                return Err(IndexError::batch_size_exceeded(size, max));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.max_batch_size, Some(1000));
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_batch_size_limit() {
        let config = ClientConfig::with_max_batch_size(5);
        assert!(config.validate_batch_size(5).is_ok());
        assert_eq!(
            config.validate_batch_size(6),
            Err(IndexError::BatchSizeExceeded { provided: 6, max: 5 })
        );

        assert!(ClientConfig::unlimited().validate_batch_size(1_000_000).is_ok());
    }

    #[test]
    fn test_parsed_url() {
        assert!(ClientConfig::new("https://:secret@example.api.test")
            .parsed_url()
            .is_ok());
        assert!(matches!(
            ClientConfig::new("not a url").parsed_url(),
            Err(IndexError::InvalidArgument(_))
        ));
        assert!(matches!(
            ClientConfig::new("mailto:someone@example.com").parsed_url(),
            Err(IndexError::InvalidArgument(_))
        ));
    }
}
