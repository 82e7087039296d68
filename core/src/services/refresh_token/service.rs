//! Refresh token service working with raw tokens on top of a store.
//!
//! Callers hand in raw tokens; only their digests reach the store. Redeeming a
//! token rotates it, and presenting an already-rotated token again is treated
//! as a replay of a stolen token.

use chrono::{DateTime, Duration, Utc};
use rts_shared::config::TokenStoreConfig;
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::entities::refresh_token::{NewRefreshToken, RefreshTokenRecord, UserId};
use crate::errors::{RefreshError, RefreshResult, TokenStoreError};
use crate::repositories::RefreshTokenStore;

use super::hashing::{generate_raw_token, hash_token};

/// A freshly created token
///
/// `raw_token` is handed to the client and is not recoverable afterwards.
#[derive(Clone)]
pub struct IssuedToken {
    pub raw_token: String,
    pub record: RefreshTokenRecord,
}

impl std::fmt::Debug for IssuedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssuedToken")
            .field("raw_token", &"<redacted>")
            .field("record", &self.record)
            .finish()
    }
}

/// Issues, redeems and revokes refresh tokens by raw value
pub struct RefreshTokenService<S: RefreshTokenStore> {
    store: Arc<S>,
    config: TokenStoreConfig,
}

impl<S: RefreshTokenStore> RefreshTokenService<S> {
    pub fn new(store: Arc<S>, config: TokenStoreConfig) -> Self {
        Self { store, config }
    }

    /// The underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    fn next_expiry(&self) -> RefreshResult<DateTime<Utc>> {
        let days = self.config.refresh_token_ttl_days;
        if !self.config.has_valid_ttl() {
            return Err(TokenStoreError::invalid_input(format!(
                "refresh token lifetime of {} days is out of range",
                days
            ))
            .into());
        }

        Duration::try_days(days)
            .and_then(|ttl| Utc::now().checked_add_signed(ttl))
            .ok_or_else(|| {
                TokenStoreError::invalid_input(format!(
                    "refresh token lifetime of {} days overflows",
                    days
                ))
                .into()
            })
    }

    fn new_token(&self, user_id: UserId) -> RefreshResult<(String, NewRefreshToken)> {
        let raw_token = generate_raw_token();
        let new_token = NewRefreshToken::new(user_id, hash_token(&raw_token), Some(self.next_expiry()?))?;
        Ok((raw_token, new_token))
    }

    /// Issue a new refresh token for a user
    ///
    /// # Returns
    ///
    /// * `Ok(IssuedToken)` - The raw token and its stored record
    /// * `Err(RefreshError::Store)` - Invalid user id or storage failure
    pub async fn issue(&self, user_id: UserId) -> RefreshResult<IssuedToken> {
        let (raw_token, new_token) = self.new_token(user_id)?;
        let record = self.store.create(new_token).await?;

        info!(user_id, token_id = record.id, "Issued refresh token");
        Ok(IssuedToken { raw_token, record })
    }

    /// Exchange a raw token for its successor
    ///
    /// # Returns
    ///
    /// * `Ok(IssuedToken)` - The successor; the presented token is now revoked
    /// * `Err(InvalidToken)` - No record for this token
    /// * `Err(ReuseDetected)` - The token was already rotated
    /// * `Err(Revoked)` - The token was revoked without rotation
    /// * `Err(Expired)` - The token expired
    pub async fn redeem(&self, raw_token: &str) -> RefreshResult<IssuedToken> {
        let current = match self.store.find_by_hash(&hash_token(raw_token)).await {
            Ok(record) => record,
            Err(TokenStoreError::NotFound { .. }) => return Err(RefreshError::InvalidToken),
            Err(e) => return Err(e.into()),
        };

        if current.is_rotated() {
            return Err(self.handle_reuse(&current).await);
        }
        if current.revoked {
            return Err(RefreshError::Revoked);
        }
        if current.is_expired() {
            return Err(RefreshError::Expired);
        }

        let (raw_token, successor) = self.new_token(current.user_id)?;
        match self.store.rotate(current.id, successor).await {
            Ok(record) => {
                info!(
                    user_id = current.user_id,
                    old_token_id = current.id,
                    new_token_id = record.id,
                    "Rotated refresh token"
                );
                Ok(IssuedToken { raw_token, record })
            }
            // Lost a race against another redemption of the same token
            Err(TokenStoreError::AlreadyRotated { .. }) => Err(self.handle_reuse(&current).await),
            Err(e) => Err(e.into()),
        }
    }

    async fn handle_reuse(&self, record: &RefreshTokenRecord) -> RefreshError {
        warn!(
            user_id = record.user_id,
            token_id = record.id,
            "Rotated refresh token presented again"
        );

        if self.config.revoke_user_on_reuse {
            match self.store.revoke_all_for_user(record.user_id).await {
                Ok(count) => warn!(user_id = record.user_id, count, "Revoked all refresh tokens after reuse"),
                Err(e) => return e.into(),
            }
        }

        RefreshError::ReuseDetected { user_id: record.user_id }
    }

    /// Revoke the token behind a raw value
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - A record exists and is now revoked
    /// * `Ok(false)` - No record for this token
    pub async fn revoke(&self, raw_token: &str) -> RefreshResult<bool> {
        match self.store.find_by_hash(&hash_token(raw_token)).await {
            Ok(record) => {
                self.store.revoke(record.id).await?;
                info!(user_id = record.user_id, token_id = record.id, "Revoked refresh token");
                Ok(true)
            }
            Err(TokenStoreError::NotFound { .. }) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Revoke every token of a user
    pub async fn revoke_all(&self, user_id: UserId) -> RefreshResult<usize> {
        let count = self.store.revoke_all_for_user(user_id).await?;
        info!(user_id, count, "Revoked all refresh tokens for user");
        Ok(count)
    }
}
