//! # Infrastructure Layer
//!
//! Concrete implementations behind the refresh token store contract.
//!
//! ## Architecture
//!
//! The infrastructure layer contains:
//! - **Database**: MySQL connection pool, embedded migrations and the
//!   `RefreshTokenStore` implementation using SQLx
//! - **Telemetry**: tracing subscriber installation
//!
//! ## Features
//!
//! - `mysql`: Enable MySQL database support (default)

// Re-export core types for convenience
pub use rts_core::errors::*;

/// Database module - MySQL implementations using SQLx
#[cfg(feature = "mysql")]
pub mod database;

/// Tracing subscriber setup
pub mod telemetry;

/// Configuration module for infrastructure services
pub mod config {
    //! Configuration for infrastructure services
    //!
    //! Re-exports the shared configuration types used by this crate.

    pub use rts_shared::config::{
        AppConfig, DatabaseConfig, Environment, LogFormat, LoggingConfig, TokenStoreConfig,
    };
}

#[cfg(feature = "mysql")]
pub use database::{DatabasePool, MySqlRefreshTokenStore};

/// Infrastructure service container
#[cfg(feature = "mysql")]
#[derive(Clone)]
pub struct InfrastructureServices {
    /// Shared connection pool
    pub pool: DatabasePool,
    /// Refresh token store backed by the pool
    pub refresh_tokens: std::sync::Arc<MySqlRefreshTokenStore>,
    /// Configuration the services were built from
    pub config: config::AppConfig,
}

/// Initialize infrastructure services
///
/// This function:
/// - Loads `.env` and the application configuration
/// - Installs the tracing subscriber
/// - Creates the database connection pool
/// - Optionally applies the embedded migrations
#[cfg(feature = "mysql")]
pub async fn initialize(run_migrations: bool) -> Result<InfrastructureServices, InfrastructureError> {
    let config = load_config();

    // A subscriber may already be installed by the host application
    if let Err(e) = telemetry::init_tracing(&config.logging) {
        tracing::debug!("Tracing subscriber not installed: {}", e);
    }

    tracing::info!(environment = %config.environment, "Initializing infrastructure services...");

    let pool = DatabasePool::new(config.database.clone()).await?;
    if run_migrations {
        pool.run_migrations().await?;
    }

    let refresh_tokens = std::sync::Arc::new(MySqlRefreshTokenStore::new(pool.get_pool().clone()));

    tracing::info!("Infrastructure services initialized successfully");

    Ok(InfrastructureServices {
        pool,
        refresh_tokens,
        config,
    })
}

/// Load configuration from the environment
///
/// Variables already set in the process win, then the environment-specific
/// file (`.env.production` etc.), then `.env`. Missing files are skipped.
pub fn load_config() -> config::AppConfig {
    load_env_files(std::path::Path::new("."), config::Environment::from_env());
    config::AppConfig::from_env()
}

/// Load `dir/<environment file>` and then `dir/.env`, returning how many were read
pub fn load_env_files(dir: &std::path::Path, environment: config::Environment) -> usize {
    [environment.env_file(), ".env"]
        .iter()
        .filter(|name| match dotenvy::from_path(dir.join(name)) {
            Ok(()) => {
                tracing::debug!(file = %name, "Loaded environment file");
                true
            }
            Err(_) => false,
        })
        .count()
}

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema migration error
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
