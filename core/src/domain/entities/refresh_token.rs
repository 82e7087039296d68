//! Refresh token record entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{StoreResult, TokenStoreError};

/// Maximum length of a stored token digest (`token_hash VARCHAR(512)`)
pub const TOKEN_HASH_MAX_LENGTH: usize = 512;

/// Surrogate key of a refresh token record
pub type TokenId = i64;

/// Identifier of the owning account
pub type UserId = i64;

/// A persisted refresh token
///
/// Only the digest of the raw token is kept. After creation the record changes
/// in exactly two ways: `revoked` flips to `true` and `replaced_by` is set once
/// when the token is rotated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshTokenRecord {
    /// Store-assigned identifier
    pub id: TokenId,

    /// Owning account
    pub user_id: UserId,

    /// Opaque digest of the raw token
    pub token_hash: String,

    /// Whether the token has been revoked
    pub revoked: bool,

    /// Store-assigned creation timestamp
    pub created_at: DateTime<Utc>,

    /// Optional expiry; `None` leaves expiry to the caller
    pub expires_at: Option<DateTime<Utc>>,

    /// Successor created when this token was rotated
    pub replaced_by: Option<TokenId>,
}

impl RefreshTokenRecord {
    /// Whether the token can still be used, evaluated at `now`
    ///
    /// True iff the record is not revoked and either has no expiry or expires
    /// strictly after `now`.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        !self.revoked && !self.is_expired_at(now)
    }

    /// Whether the token can still be used right now
    pub fn is_active(&self) -> bool {
        self.is_active_at(Utc::now())
    }

    /// Whether the expiry has been reached at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        matches!(self.expires_at, Some(expires_at) if expires_at <= now)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Whether a successor has been recorded
    pub fn is_rotated(&self) -> bool {
        self.replaced_by.is_some()
    }
}

/// Validated input for creating a refresh token record
///
/// `id`, `revoked`, `created_at` and `replaced_by` are owned by the store and
/// cannot be supplied here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRefreshToken {
    user_id: UserId,
    token_hash: String,
    expires_at: Option<DateTime<Utc>>,
}

impl NewRefreshToken {
    /// Validates creation arguments
    ///
    /// # Errors
    ///
    /// `InvalidInput` when `user_id` is not a positive id, or when `token_hash`
    /// is empty or longer than [`TOKEN_HASH_MAX_LENGTH`] characters.
    pub fn new(
        user_id: UserId,
        token_hash: impl Into<String>,
        expires_at: Option<DateTime<Utc>>,
    ) -> StoreResult<Self> {
        let token_hash = token_hash.into();

        if user_id <= 0 {
            return Err(TokenStoreError::invalid_input("user id is required"));
        }
        if token_hash.is_empty() {
            return Err(TokenStoreError::invalid_input("token hash must not be empty"));
        }
        let length = token_hash.chars().count();
        if length > TOKEN_HASH_MAX_LENGTH {
            return Err(TokenStoreError::invalid_input(format!(
                "token hash is {} characters, maximum is {}",
                length, TOKEN_HASH_MAX_LENGTH
            )));
        }

        Ok(Self {
            user_id,
            token_hash,
            expires_at,
        })
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn token_hash(&self) -> &str {
        &self.token_hash
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Builds the record a store persists for this input
    pub fn into_record(self, id: TokenId, created_at: DateTime<Utc>) -> RefreshTokenRecord {
        RefreshTokenRecord {
            id,
            user_id: self.user_id,
            token_hash: self.token_hash,
            revoked: false,
            created_at,
            expires_at: self.expires_at,
            replaced_by: None,
        }
    }
}
