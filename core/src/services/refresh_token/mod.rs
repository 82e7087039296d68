//! Refresh token hashing and rotation service.

pub mod hashing;
pub mod service;

pub use hashing::{generate_raw_token, hash_token, RAW_TOKEN_LENGTH};
pub use service::{IssuedToken, RefreshTokenService};

#[cfg(test)]
mod tests;
