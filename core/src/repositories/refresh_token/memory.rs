//! In-memory implementation of RefreshTokenStore

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::entities::refresh_token::{NewRefreshToken, RefreshTokenRecord, TokenId, UserId};
use crate::errors::{StoreResult, TokenStoreError};

use super::r#trait::RefreshTokenStore;

#[derive(Default)]
struct Records {
    by_id: BTreeMap<TokenId, RefreshTokenRecord>,
    by_hash: HashMap<String, TokenId>,
    last_id: TokenId,
    last_created_at: Option<DateTime<Utc>>,
}

impl Records {
    fn insert(&mut self, new_token: NewRefreshToken) -> StoreResult<RefreshTokenRecord> {
        if self.by_hash.contains_key(new_token.token_hash()) {
            return Err(TokenStoreError::invalid_input("token hash already exists"));
        }

        self.last_id += 1;
        let id = self.last_id;

        // Successors must be created strictly after their predecessor
        let mut created_at = Utc::now();
        if let Some(last) = self.last_created_at {
            if created_at <= last {
                created_at = last + Duration::microseconds(1);
            }
        }
        self.last_created_at = Some(created_at);

        let record = new_token.into_record(id, created_at);
        self.by_hash.insert(record.token_hash.clone(), id);
        self.by_id.insert(id, record.clone());
        Ok(record)
    }
}

/// Refresh token store held in process memory
///
/// Every mutation runs under a single write guard, so `rotate` and
/// `revoke_all_for_user` are atomic with respect to concurrent callers.
/// Clones share the same records.
#[derive(Clone, Default)]
pub struct MemoryRefreshTokenStore {
    records: Arc<RwLock<Records>>,
}

impl MemoryRefreshTokenStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records, revoked ones included
    pub async fn len(&self) -> usize {
        self.records.read().await.by_id.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl RefreshTokenStore for MemoryRefreshTokenStore {
    async fn create(&self, new_token: NewRefreshToken) -> StoreResult<RefreshTokenRecord> {
        let mut records = self.records.write().await;
        let record = records.insert(new_token)?;
        tracing::debug!(token_id = record.id, user_id = record.user_id, "Refresh token created");
        Ok(record)
    }

    async fn find_by_hash(&self, token_hash: &str) -> StoreResult<RefreshTokenRecord> {
        let records = self.records.read().await;
        records
            .by_hash
            .get(token_hash)
            .and_then(|id| records.by_id.get(id))
            .cloned()
            .ok_or_else(|| TokenStoreError::NotFound {
                resource: "refresh token for hash".to_string(),
            })
    }

    async fn find_by_id(&self, id: TokenId) -> StoreResult<RefreshTokenRecord> {
        let records = self.records.read().await;
        records
            .by_id
            .get(&id)
            .cloned()
            .ok_or_else(|| TokenStoreError::token_not_found(id))
    }

    async fn list_for_user(&self, user_id: UserId) -> StoreResult<Vec<RefreshTokenRecord>> {
        let records = self.records.read().await;
        Ok(records
            .by_id
            .values()
            .rev()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn revoke(&self, id: TokenId) -> StoreResult<()> {
        let mut records = self.records.write().await;
        let token = records
            .by_id
            .get_mut(&id)
            .ok_or_else(|| TokenStoreError::token_not_found(id))?;

        if !token.revoked {
            token.revoked = true;
            tracing::debug!(token_id = id, "Refresh token revoked");
        }
        Ok(())
    }

    async fn revoke_all_for_user(&self, user_id: UserId) -> StoreResult<usize> {
        let mut records = self.records.write().await;
        let mut count = 0;

        for token in records.by_id.values_mut() {
            if token.user_id == user_id && !token.revoked {
                token.revoked = true;
                count += 1;
            }
        }

        tracing::debug!(user_id, count, "Revoked all refresh tokens for user");
        Ok(count)
    }

    async fn rotate(
        &self,
        old_id: TokenId,
        successor: NewRefreshToken,
    ) -> StoreResult<RefreshTokenRecord> {
        let mut records = self.records.write().await;

        match records.by_id.get(&old_id) {
            None => return Err(TokenStoreError::token_not_found(old_id)),
            Some(old) if old.replaced_by.is_some() => {
                return Err(TokenStoreError::AlreadyRotated { id: old_id })
            }
            Some(_) => {}
        }

        let new_record = records.insert(successor)?;

        let old = records
            .by_id
            .get_mut(&old_id)
            .ok_or_else(|| TokenStoreError::token_not_found(old_id))?;
        old.replaced_by = Some(new_record.id);
        old.revoked = true;

        tracing::debug!(
            old_token_id = old_id,
            new_token_id = new_record.id,
            "Refresh token rotated"
        );
        Ok(new_record)
    }
}
