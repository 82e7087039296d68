//! Domain layer containing the refresh token entity.

pub mod entities;

// Re-export commonly used domain types
pub use entities::*;
