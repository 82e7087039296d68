//! Configuration module
//!
//! - `database` - Database connection and pool configuration
//! - `environment` - Environment detection and logging configuration
//! - `token` - Refresh token lifetime and reuse policy

pub mod database;
pub mod environment;
pub mod token;

use serde::{Deserialize, Serialize};

pub use database::DatabaseConfig;
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use token::{TokenStoreConfig, MAX_TTL_DAYS, MIN_TTL_DAYS};

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Refresh token policy
    #[serde(default)]
    pub tokens: TokenStoreConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let env = Environment::default();
        Self {
            environment: env,
            database: DatabaseConfig::default(),
            tokens: TokenStoreConfig::default(),
            logging: LoggingConfig::for_environment(env),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// Logging defaults follow the detected environment; `LOG_LEVEL` and
    /// `LOG_FORMAT` override them.
    pub fn from_env() -> Self {
        let environment = Environment::from_env();
        Self {
            environment,
            database: DatabaseConfig::from_env(),
            tokens: TokenStoreConfig::from_env(),
            logging: LoggingConfig::from_env(environment),
        }
    }
}
