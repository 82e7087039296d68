//! Database module - MySQL implementations using SQLx
//!
//! This module provides:
//! - Connection pool management
//! - Embedded schema migrations
//! - The MySQL `RefreshTokenStore` implementation

pub mod connection;
pub mod mysql;


// Re-export commonly used types
pub use connection::{DatabasePool, PoolStatistics, MIGRATOR};
pub use mysql::MySqlRefreshTokenStore;
