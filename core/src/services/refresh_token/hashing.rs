//! Digest and generation helpers for raw refresh tokens.
//!
//! The store only ever sees the output of [`hash_token`].

use rand::distributions::Alphanumeric;
use rand::Rng;
use sha2::{Digest, Sha256};

/// Length of generated raw tokens
pub const RAW_TOKEN_LENGTH: usize = 32;

/// Hash a raw token using SHA-256
///
/// Returns the lowercase hexadecimal digest (64 characters).
pub fn hash_token(raw_token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw_token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Generate a random alphanumeric raw token
pub fn generate_raw_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(RAW_TOKEN_LENGTH)
        .map(char::from)
        .collect()
}
