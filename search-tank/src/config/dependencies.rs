//! Dependency initialization and wiring for the search-tank binary.

use tracing::info;

use crate::AppError;
use search_tank_repository::{ClientConfig, SearchTankClient};

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// Client for the configured service.
    pub client: SearchTankClient,
}

impl Dependencies {
    /// Initialize all dependencies from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `SEARCH_TANK_API_URL`: service URL, credentials in the userinfo part
    ///   (default: http://localhost:8080)
    /// - `SEARCH_TANK_MAX_BATCH_SIZE`: batch limit, `0` disables it (default: 1000)
    /// - `SEARCH_TANK_TIMEOUT_SECS`: request timeout (default: 30)
    ///
    /// `api_url` overrides `SEARCH_TANK_API_URL` when given.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(AppError)` - If the configuration is invalid
    pub fn new(api_url: Option<String>) -> Result<Self, AppError> {
        let mut config = ClientConfig::from_env()
            .map_err(|e| AppError::config(format!("Invalid client configuration: {}", e)))?;
        if let Some(api_url) = api_url {
            config.api_url = api_url;
        }

        let url = config
            .parsed_url()
            .map_err(|e| AppError::config(e.to_string()))?;
        info!(
            host = url.host_str().unwrap_or_default(),
            max_batch_size = ?config.max_batch_size,
            timeout_secs = config.timeout_secs,
            "Initializing dependencies"
        );

        let client = SearchTankClient::new(config)
            .map_err(|e| AppError::config(format!("Failed to create client: {}", e)))?;

        Ok(Self { client })
    }
}
