//! Domain entities.

pub mod refresh_token;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use refresh_token::{NewRefreshToken, RefreshTokenRecord, TokenId, UserId, TOKEN_HASH_MAX_LENGTH};
