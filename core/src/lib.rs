//! # Refresh Token Store Core
//!
//! Domain layer for refresh token persistence.
//! This crate contains the token record entity, the store contract and its
//! in-memory implementation, the rotation service, and the error types that
//! the infrastructure layer builds on.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use repositories::*;
pub use services::*;
