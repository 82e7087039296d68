//! Shared configuration for the refresh token store crates
//!
//! This crate provides the configuration types used across the workspace:
//! - Database connection settings
//! - Token store policy (lifetimes, reuse handling)
//! - Environment detection and logging configuration

pub mod config;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, DatabaseConfig, Environment, LogFormat, LoggingConfig, TokenStoreConfig,
};
