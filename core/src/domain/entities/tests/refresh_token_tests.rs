//! Unit tests for the refresh token entity

use chrono::{Duration, Utc};

use crate::domain::entities::refresh_token::{NewRefreshToken, TOKEN_HASH_MAX_LENGTH};
use crate::errors::TokenStoreError;

fn record(expires_in: Option<Duration>) -> crate::domain::entities::RefreshTokenRecord {
    let now = Utc::now();
    NewRefreshToken::new(1, "hash", expires_in.map(|d| now + d))
        .unwrap()
        .into_record(10, now)
}

#[test]
fn test_new_record_defaults() {
    let token = record(None);

    assert_eq!(token.id, 10);
    assert_eq!(token.user_id, 1);
    assert_eq!(token.token_hash, "hash");
    assert!(!token.revoked);
    assert!(token.replaced_by.is_none());
    assert!(token.expires_at.is_none());
}

#[test]
fn test_active_without_expiry() {
    let token = record(None);
    assert!(token.is_active());
    assert!(!token.is_expired());
}

#[test]
fn test_inactive_when_expired_even_if_not_revoked() {
    let token = record(Some(Duration::minutes(-5)));
    assert!(!token.revoked);
    assert!(token.is_expired());
    assert!(!token.is_active());
}

#[test]
fn test_expiry_boundary_is_exclusive() {
    let token = record(Some(Duration::hours(1)));
    let expires_at = token.expires_at.unwrap();

    assert!(token.is_active_at(expires_at - Duration::seconds(1)));
    assert!(!token.is_active_at(expires_at));
}

#[test]
fn test_revoked_is_inactive() {
    let mut token = record(Some(Duration::days(7)));
    token.revoked = true;
    assert!(!token.is_active());
}

#[test]
fn test_rotated_flag() {
    let mut token = record(None);
    assert!(!token.is_rotated());
    token.replaced_by = Some(11);
    assert!(token.is_rotated());
}

#[test]
fn test_rejects_missing_user() {
    let result = NewRefreshToken::new(0, "hash", None);
    assert!(matches!(result, Err(TokenStoreError::InvalidInput { .. })));

    let result = NewRefreshToken::new(-3, "hash", None);
    assert!(matches!(result, Err(TokenStoreError::InvalidInput { .. })));
}

#[test]
fn test_rejects_empty_hash() {
    let result = NewRefreshToken::new(1, "", None);
    assert!(matches!(result, Err(TokenStoreError::InvalidInput { .. })));
}

#[test]
fn test_hash_length_bound() {
    let at_limit = "a".repeat(TOKEN_HASH_MAX_LENGTH);
    assert!(NewRefreshToken::new(1, at_limit, None).is_ok());

    let over_limit = "a".repeat(TOKEN_HASH_MAX_LENGTH + 1);
    let err = NewRefreshToken::new(1, over_limit, None).unwrap_err();
    assert_eq!(err.code(), "INVALID_INPUT");
    assert!(err.to_string().contains("513"));
}

#[test]
fn test_record_serializes_without_raw_token_fields() {
    let token = record(None);
    let json = serde_json::to_value(&token).unwrap();

    assert_eq!(json["token_hash"], "hash");
    assert_eq!(json["revoked"], false);
    assert!(json["replaced_by"].is_null());
}
