//! Store trait defining the persistence contract for refresh token records.

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::entities::refresh_token::{NewRefreshToken, RefreshTokenRecord, TokenId, UserId};
use crate::errors::StoreResult;

/// Persistence contract for refresh token records
///
/// Records are never physically deleted; the only mutations are setting
/// `revoked` and, through [`rotate`](Self::rotate), `replaced_by`.
///
/// # Atomicity
/// - `rotate` creates the successor and marks the predecessor in one unit of
///   work. A successor without a marked predecessor must never be observable.
/// - `revoke_all_for_user` is a single bulk update, not a loop of revokes.
/// - The "already rotated" check is a conditional write on `replaced_by`
///   being unset, not a read followed by a write.
///
/// Implementations perform no retries; storage failures surface as
/// `StorageUnavailable`.
#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    /// Persist a new record
    ///
    /// The store assigns `id` and `created_at`; the record starts with
    /// `revoked = false` and no successor.
    ///
    /// # Returns
    /// * `Ok(RefreshTokenRecord)` - The stored record
    /// * `Err(InvalidInput)` - The digest is already stored
    /// * `Err(StorageUnavailable)` - Persistence failed
    ///
    /// # Example
    /// ```no_run
    /// # use rts_core::repositories::RefreshTokenStore;
    /// # use rts_core::domain::entities::NewRefreshToken;
    /// # async fn example(store: &impl RefreshTokenStore) -> Result<(), Box<dyn std::error::Error>> {
    /// let new_token = NewRefreshToken::new(1, "sha256_digest", None)?;
    /// let record = store.create(new_token).await?;
    /// assert!(!record.revoked);
    /// # Ok(())
    /// # }
    /// ```
    async fn create(&self, new_token: NewRefreshToken) -> StoreResult<RefreshTokenRecord>;

    /// Exact-match lookup by digest
    ///
    /// # Returns
    /// * `Ok(RefreshTokenRecord)` - Record found, revoked or not
    /// * `Err(NotFound)` - No record carries this digest
    async fn find_by_hash(&self, token_hash: &str) -> StoreResult<RefreshTokenRecord>;

    /// Lookup by id
    async fn find_by_id(&self, id: TokenId) -> StoreResult<RefreshTokenRecord>;

    /// Every record of a user, revoked ones included, newest first
    async fn list_for_user(&self, user_id: UserId) -> StoreResult<Vec<RefreshTokenRecord>>;

    /// Mark a record revoked
    ///
    /// Revoking an already revoked record succeeds without changes.
    ///
    /// # Returns
    /// * `Ok(())` - The record is revoked
    /// * `Err(NotFound)` - No record with this id
    async fn revoke(&self, id: TokenId) -> StoreResult<()>;

    /// Revoke every non-revoked record of a user
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of records that changed from active to revoked
    ///
    /// # Example
    /// ```no_run
    /// # use rts_core::repositories::RefreshTokenStore;
    /// # async fn example(store: &impl RefreshTokenStore) -> Result<(), Box<dyn std::error::Error>> {
    /// let revoked = store.revoke_all_for_user(42).await?;
    /// println!("Logged out of {} sessions", revoked);
    /// # Ok(())
    /// # }
    /// ```
    async fn revoke_all_for_user(&self, user_id: UserId) -> StoreResult<usize>;

    /// Replace a record with a successor
    ///
    /// Atomically creates `successor`, sets the old record's `replaced_by` to
    /// the successor id and revokes the old record.
    ///
    /// # Returns
    /// * `Ok(RefreshTokenRecord)` - The successor
    /// * `Err(NotFound)` - `old_id` does not exist
    /// * `Err(AlreadyRotated)` - The old record already has a successor
    /// * `Err(InvalidInput)` - The successor digest is already stored
    async fn rotate(
        &self,
        old_id: TokenId,
        successor: NewRefreshToken,
    ) -> StoreResult<RefreshTokenRecord>;

    /// Follow `replaced_by` links starting at `id`, oldest first
    ///
    /// A link that does not point forward ends the walk.
    async fn rotation_chain(&self, id: TokenId) -> StoreResult<Vec<RefreshTokenRecord>> {
        let mut current = self.find_by_id(id).await?;
        let mut chain = Vec::new();

        while let Some(next_id) = current.replaced_by {
            if next_id <= current.id {
                tracing::warn!(
                    token_id = current.id,
                    replaced_by = next_id,
                    "Rotation chain link does not point forward"
                );
                break;
            }
            let next = self.find_by_id(next_id).await?;
            chain.push(std::mem::replace(&mut current, next));
        }
        chain.push(current);

        Ok(chain)
    }

    /// Count a user's records that are currently active
    async fn count_active_for_user(&self, user_id: UserId) -> StoreResult<usize> {
        let now = Utc::now();
        let tokens = self.list_for_user(user_id).await?;
        Ok(tokens.iter().filter(|t| t.is_active_at(now)).count())
    }
}
