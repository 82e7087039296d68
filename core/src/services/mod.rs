//! Services built on the refresh token store.

pub mod refresh_token;

// Re-export commonly used types
pub use refresh_token::{generate_raw_token, hash_token, IssuedToken, RefreshTokenService};
