//! Endpoint paths and persisted key names for board credentials

/// Login endpoint, relative to the API base URL
pub const LOGIN_PATH: &str = "/auth/login";

/// Refresh endpoint, relative to the API base URL
pub const REFRESH_PATH: &str = "/auth/refresh";

/// Persisted key holding the access token
pub const ACCESS_TOKEN_KEY: &str = "token";

/// Persisted key holding the refresh token
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";
