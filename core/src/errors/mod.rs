//! Error types for the refresh token store and the service built on it.

use thiserror::Error;

#[cfg(test)]
mod tests;

/// Errors surfaced by every `RefreshTokenStore` implementation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenStoreError {
    /// Malformed or missing arguments
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// The referenced record does not exist
    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    /// The record already has a successor; a second rotation is a replay
    #[error("Refresh token {id} has already been rotated")]
    AlreadyRotated { id: i64 },

    /// Underlying persistence failure or timeout
    #[error("Storage unavailable: {message}")]
    StorageUnavailable { message: String },
}

impl TokenStoreError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput { message: message.into() }
    }

    pub fn token_not_found(id: i64) -> Self {
        Self::NotFound { resource: format!("refresh token {}", id) }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::StorageUnavailable { message: message.into() }
    }

    /// Stable error code for programmatic handling
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput { .. } => "INVALID_INPUT",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::AlreadyRotated { .. } => "ALREADY_ROTATED",
            Self::StorageUnavailable { .. } => "STORAGE_UNAVAILABLE",
        }
    }

    /// Whether a caller-side retry may succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::StorageUnavailable { .. })
    }
}

pub type StoreResult<T> = Result<T, TokenStoreError>;

/// Errors returned by `RefreshTokenService` when redeeming raw tokens
#[derive(Error, Debug)]
pub enum RefreshError {
    #[error("Invalid refresh token")]
    InvalidToken,

    #[error("Refresh token expired")]
    Expired,

    #[error("Refresh token revoked")]
    Revoked,

    /// An already-rotated token was presented again
    #[error("Refresh token reuse detected for user {user_id}")]
    ReuseDetected { user_id: i64 },

    #[error(transparent)]
    Store(#[from] TokenStoreError),
}

impl RefreshError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidToken => "INVALID_REFRESH_TOKEN",
            Self::Expired => "REFRESH_TOKEN_EXPIRED",
            Self::Revoked => "REFRESH_TOKEN_REVOKED",
            Self::ReuseDetected { .. } => "REFRESH_TOKEN_REUSED",
            Self::Store(err) => err.code(),
        }
    }
}

pub type RefreshResult<T> = Result<T, RefreshError>;
