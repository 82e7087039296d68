//! Unit tests for store and service error types

use crate::errors::{RefreshError, TokenStoreError};

#[test]
fn test_store_error_messages() {
    let error = TokenStoreError::invalid_input("token hash must not be empty");
    assert_eq!(error.to_string(), "Invalid input: token hash must not be empty");

    let error = TokenStoreError::token_not_found(42);
    assert!(error.to_string().contains("refresh token 42"));

    let error = TokenStoreError::AlreadyRotated { id: 7 };
    assert_eq!(error.to_string(), "Refresh token 7 has already been rotated");
}

#[test]
fn test_store_error_codes() {
    assert_eq!(TokenStoreError::invalid_input("x").code(), "INVALID_INPUT");
    assert_eq!(TokenStoreError::token_not_found(1).code(), "NOT_FOUND");
    assert_eq!(TokenStoreError::AlreadyRotated { id: 1 }.code(), "ALREADY_ROTATED");
    assert_eq!(TokenStoreError::storage("timeout").code(), "STORAGE_UNAVAILABLE");
}

#[test]
fn test_only_storage_errors_are_transient() {
    assert!(TokenStoreError::storage("pool timed out").is_transient());
    assert!(!TokenStoreError::invalid_input("x").is_transient());
    assert!(!TokenStoreError::AlreadyRotated { id: 3 }.is_transient());
}

#[test]
fn test_refresh_error_wraps_store_error() {
    let error: RefreshError = TokenStoreError::storage("connection reset").into();
    assert_eq!(error.code(), "STORAGE_UNAVAILABLE");
    assert_eq!(error.to_string(), "Storage unavailable: connection reset");

    let error = RefreshError::ReuseDetected { user_id: 9 };
    assert_eq!(error.code(), "REFRESH_TOKEN_REUSED");
}
