//! Unit tests for the refresh token service

use chrono::{Duration, Utc};
use rts_shared::config::TokenStoreConfig;
use std::sync::Arc;

use crate::domain::entities::NewRefreshToken;
use crate::errors::{RefreshError, TokenStoreError};
use crate::repositories::{MemoryRefreshTokenStore, RefreshTokenStore};
use crate::services::refresh_token::{hash_token, RefreshTokenService};

fn service(config: TokenStoreConfig) -> RefreshTokenService<MemoryRefreshTokenStore> {
    RefreshTokenService::new(Arc::new(MemoryRefreshTokenStore::new()), config)
}

#[tokio::test]
async fn test_issue_stores_only_digest() {
    let service = service(TokenStoreConfig::default());

    let issued = service.issue(1).await.unwrap();

    assert_eq!(issued.record.token_hash, hash_token(&issued.raw_token));
    assert_ne!(issued.record.token_hash, issued.raw_token);
    assert!(issued.record.is_active());

    let found = service.store().find_by_hash(&hash_token(&issued.raw_token)).await.unwrap();
    assert_eq!(found.id, issued.record.id);
}

#[tokio::test]
async fn test_issue_sets_configured_expiry() {
    let service = service(TokenStoreConfig::default().with_ttl_days(30));
    let before = Utc::now();

    let issued = service.issue(1).await.unwrap();
    let expires_at = issued.record.expires_at.unwrap();

    assert!(expires_at >= before + Duration::days(30));
    assert!(expires_at <= Utc::now() + Duration::days(30));
}

#[tokio::test]
async fn test_out_of_range_ttl_is_rejected_without_storing() {
    for days in [100_000_000, 0, -1] {
        let config = TokenStoreConfig {
            refresh_token_ttl_days: days,
            ..TokenStoreConfig::default()
        };
        let service = service(config);

        let result = service.issue(1).await;
        assert!(matches!(
            result,
            Err(RefreshError::Store(TokenStoreError::InvalidInput { .. }))
        ));
        assert!(service.store().is_empty().await);
    }
}

#[tokio::test]
async fn test_longest_ttl_issues_token() {
    let service = service(TokenStoreConfig::default().with_ttl_days(i64::MAX));

    let issued = service.issue(1).await.unwrap();
    assert!(issued.record.expires_at.unwrap() > Utc::now() + Duration::days(36_000));
}

#[tokio::test]
async fn test_issue_rejects_invalid_user() {
    let service = service(TokenStoreConfig::default());
    let result = service.issue(0).await;
    assert!(matches!(
        result,
        Err(RefreshError::Store(TokenStoreError::InvalidInput { .. }))
    ));
}

#[tokio::test]
async fn test_redeem_rotates_token() {
    let service = service(TokenStoreConfig::default());
    let issued = service.issue(1).await.unwrap();

    let next = service.redeem(&issued.raw_token).await.unwrap();

    assert_ne!(next.raw_token, issued.raw_token);
    assert_eq!(next.record.user_id, 1);
    let old = service.store().find_by_id(issued.record.id).await.unwrap();
    assert!(old.revoked);
    assert_eq!(old.replaced_by, Some(next.record.id));

    // The successor can be redeemed in turn
    assert!(service.redeem(&next.raw_token).await.is_ok());
}

#[tokio::test]
async fn test_redeem_unknown_token() {
    let service = service(TokenStoreConfig::default());
    let result = service.redeem("never-issued").await;
    assert!(matches!(result, Err(RefreshError::InvalidToken)));
}

#[tokio::test]
async fn test_replay_revokes_all_user_tokens() {
    let service = service(TokenStoreConfig::default());
    let stolen = service.issue(1).await.unwrap();
    let other_device = service.issue(1).await.unwrap();
    let other_user = service.issue(2).await.unwrap();

    let rotated = service.redeem(&stolen.raw_token).await.unwrap();

    let replay = service.redeem(&stolen.raw_token).await;
    assert!(matches!(replay, Err(RefreshError::ReuseDetected { user_id: 1 })));

    let store = service.store();
    assert!(store.find_by_id(rotated.record.id).await.unwrap().revoked);
    assert!(store.find_by_id(other_device.record.id).await.unwrap().revoked);
    assert!(!store.find_by_id(other_user.record.id).await.unwrap().revoked);
}

#[tokio::test]
async fn test_replay_without_user_revocation() {
    let service = service(TokenStoreConfig::default().with_revoke_user_on_reuse(false));
    let issued = service.issue(1).await.unwrap();
    let rotated = service.redeem(&issued.raw_token).await.unwrap();

    let replay = service.redeem(&issued.raw_token).await;
    assert!(matches!(replay, Err(RefreshError::ReuseDetected { .. })));

    let successor = service.store().find_by_id(rotated.record.id).await.unwrap();
    assert!(successor.is_active());
}

#[tokio::test]
async fn test_redeem_revoked_token() {
    let service = service(TokenStoreConfig::default());
    let issued = service.issue(1).await.unwrap();
    let sibling = service.issue(1).await.unwrap();

    assert!(service.revoke(&issued.raw_token).await.unwrap());

    let result = service.redeem(&issued.raw_token).await;
    assert!(matches!(result, Err(RefreshError::Revoked)));

    // Plain revocation does not trigger the reuse response
    let sibling = service.store().find_by_id(sibling.record.id).await.unwrap();
    assert!(sibling.is_active());
}

#[tokio::test]
async fn test_redeem_expired_token() {
    let store = Arc::new(MemoryRefreshTokenStore::new());
    let past = Utc::now() - Duration::minutes(1);
    store
        .create(NewRefreshToken::new(1, hash_token("expired-raw"), Some(past)).unwrap())
        .await
        .unwrap();
    let service = RefreshTokenService::new(Arc::clone(&store), TokenStoreConfig::default());

    let result = service.redeem("expired-raw").await;
    assert!(matches!(result, Err(RefreshError::Expired)));

    let record = store.find_by_hash(&hash_token("expired-raw")).await.unwrap();
    assert!(record.replaced_by.is_none());
}

#[tokio::test]
async fn test_revoke_is_idempotent_and_tolerates_unknown() {
    let service = service(TokenStoreConfig::default());
    let issued = service.issue(1).await.unwrap();

    assert!(service.revoke(&issued.raw_token).await.unwrap());
    assert!(service.revoke(&issued.raw_token).await.unwrap());
    assert!(!service.revoke("unknown").await.unwrap());
}

#[tokio::test]
async fn test_revoke_all() {
    let service = service(TokenStoreConfig::default());
    service.issue(3).await.unwrap();
    service.issue(3).await.unwrap();

    assert_eq!(service.revoke_all(3).await.unwrap(), 2);
    assert_eq!(service.store().count_active_for_user(3).await.unwrap(), 0);
}

#[tokio::test]
async fn test_issued_token_debug_redacts_raw_value() {
    let service = service(TokenStoreConfig::default());
    let issued = service.issue(1).await.unwrap();

    let debug = format!("{:?}", issued);
    assert!(!debug.contains(&issued.raw_token));
    assert!(debug.contains("<redacted>"));
}
