//! MySQL implementation of the RefreshTokenStore trait.
//!
//! Records live in the `refresh_tokens` table created by the embedded
//! migrations. `created_at` is filled by the column default, and rotation runs
//! inside a single transaction guarded by `replaced_by IS NULL`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::{MySql, MySqlConnection, MySqlPool, Row};

use rts_core::domain::entities::refresh_token::{
    NewRefreshToken, RefreshTokenRecord, TokenId, UserId,
};
use rts_core::errors::{StoreResult, TokenStoreError};
use rts_core::repositories::RefreshTokenStore;

/// MySQL implementation of RefreshTokenStore
pub struct MySqlRefreshTokenStore {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlRefreshTokenStore {
    /// Create a new MySQL refresh token store
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert database row to RefreshTokenRecord
    fn row_to_record(row: &MySqlRow) -> StoreResult<RefreshTokenRecord> {
        Ok(RefreshTokenRecord {
            id: row.try_get("id").map_err(|e| decode_error("id", e))?,
            user_id: row.try_get("user_id").map_err(|e| decode_error("user_id", e))?,
            token_hash: row
                .try_get("token_hash")
                .map_err(|e| decode_error("token_hash", e))?,
            revoked: row.try_get("revoked").map_err(|e| decode_error("revoked", e))?,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(|e| decode_error("created_at", e))?,
            expires_at: row
                .try_get::<Option<DateTime<Utc>>, _>("expires_at")
                .map_err(|e| decode_error("expires_at", e))?,
            replaced_by: row
                .try_get("replaced_by")
                .map_err(|e| decode_error("replaced_by", e))?,
        })
    }

    async fn fetch_by_id<'e, E>(executor: E, id: TokenId) -> StoreResult<Option<RefreshTokenRecord>>
    where
        E: sqlx::Executor<'e, Database = MySql>,
    {
        let query = r#"
            SELECT id, user_id, token_hash, revoked, created_at, expires_at, replaced_by
            FROM refresh_tokens
            WHERE id = ?
        "#;

        let row = sqlx::query(query)
            .bind(id)
            .fetch_optional(executor)
            .await
            .map_err(|e| storage_error("Failed to find refresh token by id", e))?;

        row.as_ref().map(Self::row_to_record).transpose()
    }

    /// Insert a record and read it back on the same connection
    async fn insert(
        conn: &mut MySqlConnection,
        new_token: NewRefreshToken,
    ) -> StoreResult<RefreshTokenRecord> {
        let query = r#"
            INSERT INTO refresh_tokens (user_id, token_hash, expires_at)
            VALUES (?, ?, ?)
        "#;

        let result = sqlx::query(query)
            .bind(new_token.user_id())
            .bind(new_token.token_hash())
            .bind(new_token.expires_at())
            .execute(&mut *conn)
            .await
            .map_err(|e| storage_error("Failed to save refresh token", e))?;

        let id = result.last_insert_id() as TokenId;
        Self::fetch_by_id(&mut *conn, id)
            .await?
            .ok_or_else(|| TokenStoreError::storage(format!("Inserted refresh token {} not readable", id)))
    }
}

fn decode_error(column: &str, e: sqlx::Error) -> TokenStoreError {
    TokenStoreError::storage(format!("Failed to get {}: {}", column, e))
}

/// Map a SQLx error onto the store taxonomy
///
/// Duplicate digests violate `ux_refresh_tokens_token_hash` and are reported
/// as invalid input; everything else is a storage failure.
pub(crate) fn storage_error(context: &str, e: sqlx::Error) -> TokenStoreError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return TokenStoreError::invalid_input("token hash already exists");
        }
    }

    tracing::error!(error = %e, "{}", context);
    TokenStoreError::storage(format!("{}: {}", context, e))
}

#[async_trait]
impl RefreshTokenStore for MySqlRefreshTokenStore {
    async fn create(&self, new_token: NewRefreshToken) -> StoreResult<RefreshTokenRecord> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| storage_error("Failed to acquire connection", e))?;

        let record = Self::insert(&mut conn, new_token).await?;
        tracing::debug!(token_id = record.id, user_id = record.user_id, "Refresh token created");
        Ok(record)
    }

    async fn find_by_hash(&self, token_hash: &str) -> StoreResult<RefreshTokenRecord> {
        let query = r#"
            SELECT id, user_id, token_hash, revoked, created_at, expires_at, replaced_by
            FROM refresh_tokens
            WHERE token_hash = ?
            LIMIT 1
        "#;

        let row = sqlx::query(query)
            .bind(token_hash)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to find refresh token", e))?;

        match row {
            Some(row) => Self::row_to_record(&row),
            None => Err(TokenStoreError::NotFound {
                resource: "refresh token for hash".to_string(),
            }),
        }
    }

    async fn find_by_id(&self, id: TokenId) -> StoreResult<RefreshTokenRecord> {
        Self::fetch_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| TokenStoreError::token_not_found(id))
    }

    async fn list_for_user(&self, user_id: UserId) -> StoreResult<Vec<RefreshTokenRecord>> {
        let query = r#"
            SELECT id, user_id, token_hash, revoked, created_at, expires_at, replaced_by
            FROM refresh_tokens
            WHERE user_id = ?
            ORDER BY id DESC
        "#;

        let rows = sqlx::query(query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to list user tokens", e))?;

        rows.iter().map(Self::row_to_record).collect()
    }

    async fn revoke(&self, id: TokenId) -> StoreResult<()> {
        let query = r#"
            UPDATE refresh_tokens
            SET revoked = TRUE
            WHERE id = ? AND revoked = FALSE
        "#;

        let result = sqlx::query(query)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to revoke refresh token", e))?;

        if result.rows_affected() > 0 {
            tracing::debug!(token_id = id, "Refresh token revoked");
            return Ok(());
        }

        // Nothing changed: either already revoked or missing
        match Self::fetch_by_id(&self.pool, id).await? {
            Some(_) => Ok(()),
            None => Err(TokenStoreError::token_not_found(id)),
        }
    }

    async fn revoke_all_for_user(&self, user_id: UserId) -> StoreResult<usize> {
        let query = r#"
            UPDATE refresh_tokens
            SET revoked = TRUE
            WHERE user_id = ? AND revoked = FALSE
        "#;

        let result = sqlx::query(query)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to revoke user tokens", e))?;

        let count = result.rows_affected() as usize;
        tracing::debug!(user_id, count, "Revoked all refresh tokens for user");
        Ok(count)
    }

    async fn rotate(
        &self,
        old_id: TokenId,
        successor: NewRefreshToken,
    ) -> StoreResult<RefreshTokenRecord> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| storage_error("Failed to begin rotation", e))?;

        let lock_query = r#"
            SELECT id, user_id, token_hash, revoked, created_at, expires_at, replaced_by
            FROM refresh_tokens
            WHERE id = ?
            FOR UPDATE
        "#;

        let old = sqlx::query(lock_query)
            .bind(old_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| storage_error("Failed to load refresh token for rotation", e))?
            .ok_or_else(|| TokenStoreError::token_not_found(old_id))?;

        if Self::row_to_record(&old)?.replaced_by.is_some() {
            return Err(TokenStoreError::AlreadyRotated { id: old_id });
        }

        let new_record = Self::insert(&mut tx, successor).await?;

        // Compare-and-set: only the first rotation may link a successor
        let link_query = r#"
            UPDATE refresh_tokens
            SET replaced_by = ?, revoked = TRUE
            WHERE id = ? AND replaced_by IS NULL
        "#;

        let result = sqlx::query(link_query)
            .bind(new_record.id)
            .bind(old_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| storage_error("Failed to link rotated refresh token", e))?;

        if result.rows_affected() == 0 {
            tx.rollback()
                .await
                .map_err(|e| storage_error("Failed to roll back rotation", e))?;
            return Err(TokenStoreError::AlreadyRotated { id: old_id });
        }

        tx.commit()
            .await
            .map_err(|e| storage_error("Failed to commit rotation", e))?;

        tracing::debug!(
            old_token_id = old_id,
            new_token_id = new_record.id,
            "Refresh token rotated"
        );
        Ok(new_record)
    }
}
