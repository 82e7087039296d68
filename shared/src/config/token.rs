//! Refresh token policy configuration

use serde::{Deserialize, Serialize};

/// Shortest accepted refresh token lifetime in days
pub const MIN_TTL_DAYS: i64 = 1;

/// Longest accepted refresh token lifetime in days
pub const MAX_TTL_DAYS: i64 = 36_500;

/// Policy applied by the refresh token service on top of the store
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenStoreConfig {
    /// Lifetime of newly issued refresh tokens in days, within
    /// `MIN_TTL_DAYS..=MAX_TTL_DAYS`
    #[serde(default = "default_ttl_days")]
    pub refresh_token_ttl_days: i64,

    /// Revoke every token of a user when an already rotated token is presented again
    #[serde(default = "default_revoke_user_on_reuse")]
    pub revoke_user_on_reuse: bool,
}

impl Default for TokenStoreConfig {
    fn default() -> Self {
        Self {
            refresh_token_ttl_days: default_ttl_days(),
            revoke_user_on_reuse: default_revoke_user_on_reuse(),
        }
    }
}

impl TokenStoreConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let refresh_token_ttl_days = std::env::var("REFRESH_TOKEN_TTL_DAYS")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|days: &i64| (MIN_TTL_DAYS..=MAX_TTL_DAYS).contains(days))
            .unwrap_or_else(default_ttl_days);
        let revoke_user_on_reuse = std::env::var("REFRESH_TOKEN_REVOKE_USER_ON_REUSE")
            .map(|v| v != "false" && v != "0")
            .unwrap_or_else(|_| default_revoke_user_on_reuse());

        Self {
            refresh_token_ttl_days,
            revoke_user_on_reuse,
        }
    }

    /// Set the refresh token lifetime in days, clamped to the accepted range
    pub fn with_ttl_days(mut self, days: i64) -> Self {
        self.refresh_token_ttl_days = days.clamp(MIN_TTL_DAYS, MAX_TTL_DAYS);
        self
    }

    /// Enable or disable user-wide revocation on token reuse
    pub fn with_revoke_user_on_reuse(mut self, enable: bool) -> Self {
        self.revoke_user_on_reuse = enable;
        self
    }

    /// Whether the configured lifetime is within the accepted range
    pub fn has_valid_ttl(&self) -> bool {
        (MIN_TTL_DAYS..=MAX_TTL_DAYS).contains(&self.refresh_token_ttl_days)
    }
}

fn default_ttl_days() -> i64 {
    7
}

fn default_revoke_user_on_reuse() -> bool {
    true
}
