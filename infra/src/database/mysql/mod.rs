mod refresh_token_store_impl;

pub use refresh_token_store_impl::MySqlRefreshTokenStore;
