//! Configuration module for Callsync
//!
//! Provides layered configuration loading from files, environment variables,
//! and defaults.
//!
//! # Configuration Precedence
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables (`CALLSYNC_*`)
//! 3. Configuration file (TOML)
//! 4. Default values (lowest priority)

pub mod cache;
pub mod error;
pub mod logging;
pub mod provider;
pub mod reconcile;
pub mod server;

pub use cache::CacheConfig;
pub use error::ConfigError;
pub use logging::{LogFormat, LoggingConfig};
pub use provider::ProviderConfig;
pub use reconcile::ReconcileConfig;
pub use server::ServerConfig;

use crate::directory::Role;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A statically configured user account, loaded into the in-memory
/// directory at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserConfig {
    pub username: String,
    #[serde(default)]
    pub role: Role,
}

/// Unified configuration for the Callsync server.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CallsyncConfig {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// External call provider connection settings
    pub provider: ProviderConfig,
    /// Reconciliation tuning
    pub reconcile: ReconcileConfig,
    /// Query cache TTL
    pub cache: CacheConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Static user accounts for the in-memory directory
    pub users: Vec<UserConfig>,
}

impl CallsyncConfig {
    /// Load configuration from a TOML file
    ///
    /// If path is None, returns default configuration.
    /// If path doesn't exist, returns NotFound error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => {
                if !p.exists() {
                    return Err(ConfigError::NotFound(p.to_path_buf()));
                }
                let content = std::fs::read_to_string(p)?;
                toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
            }
            None => Ok(Self::default()),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supports CALLSYNC_* environment variables for common settings.
    /// Invalid values are silently ignored (defaults are kept).
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(port) = std::env::var("CALLSYNC_PORT") {
            if let Ok(p) = port.parse() {
                self.server.port = p;
            }
        }
        if let Ok(host) = std::env::var("CALLSYNC_HOST") {
            self.server.host = host;
        }

        if let Ok(base_url) = std::env::var("CALLSYNC_PROVIDER_BASE_URL") {
            self.provider.base_url = base_url;
        }
        if let Ok(api_key) = std::env::var("CALLSYNC_PROVIDER_API_KEY") {
            self.provider.api_key = api_key;
        }

        if let Ok(level) = std::env::var("CALLSYNC_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("CALLSYNC_LOG_FORMAT") {
            if let Ok(f) = format.parse() {
                self.logging.format = f;
            }
        }

        self
    }

    /// Validate cross-field constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.provider.base_url.trim().is_empty() {
            return Err(ConfigError::Validation {
                field: "provider.base_url".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        if self.provider.page_size == 0 {
            return Err(ConfigError::Validation {
                field: "provider.page_size".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.provider.max_pages == 0 {
            return Err(ConfigError::Validation {
                field: "provider.max_pages".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
