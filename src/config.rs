// SPDX-License-Identifier: MIT

//! Application configuration loaded from environment variables.

use std::env;
use std::time::Duration;

/// Which document store backend to connect to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// GCP Firestore (production).
    Firestore,
    /// In-process memory store (tests, local development).
    Memory,
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// GCP project ID (Firestore backend only)
    pub gcp_project_id: String,
    /// Document store backend selector
    pub store_backend: StoreBackend,
    /// Per-operation timeout for store calls
    pub store_timeout: Duration,
    /// Frontend URL for CORS
    pub frontend_url: String,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            port: 8080,
            gcp_project_id: "test-project".to_string(),
            store_backend: StoreBackend::Memory,
            store_timeout: Duration::from_secs(5),
            frontend_url: "http://localhost:5173".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file is honored for local development.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let store_backend = match env::var("STORE_BACKEND").as_deref() {
            Ok("memory") => StoreBackend::Memory,
            Ok("firestore") | Err(_) => StoreBackend::Firestore,
            Ok(other) => return Err(ConfigError::Invalid("STORE_BACKEND", other.to_string())),
        };

        let gcp_project_id = match store_backend {
            StoreBackend::Firestore => env::var("GCP_PROJECT_ID")
                .map_err(|_| ConfigError::Missing("GCP_PROJECT_ID"))?,
            StoreBackend::Memory => {
                env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string())
            }
        };

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            gcp_project_id,
            store_backend,
            store_timeout: Duration::from_secs(
                env::var("STORE_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(10),
            ),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    // Single test to avoid racing on process-wide env vars.
    #[test]
    fn test_config_from_env() {
        env::set_var("STORE_BACKEND", "cassandra");
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid("STORE_BACKEND", _)));

        env::set_var("STORE_BACKEND", "memory");
        env::remove_var("GCP_PROJECT_ID");
        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.store_backend, StoreBackend::Memory);
        assert_eq!(config.gcp_project_id, "local-dev");
        assert_eq!(config.port, 8080);
    }
}
