//! Login and token refresh
//!
//! Both endpoints answer with the standard envelope carrying the pair:
//! `{"success": true, "data": {"token": "...", "refreshToken": "..."}}`.
//! Callers pass a bare `reqwest::Client` so a failing refresh can never
//! re-enter the authenticated pipeline that triggered it.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Access/refresh token pair issued at login and rotated on every refresh.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    /// Bearer credential for API calls
    pub token: String,
    /// Single-use credential exchanged for the next pair
    pub refresh_token: String,
}

impl TokenPair {
    pub fn new(token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            refresh_token: refresh_token.into(),
        }
    }
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .finish()
    }
}

#[derive(Deserialize)]
struct TokenEnvelope {
    data: TokenPair,
}

/// Exchange email and password for a token pair.
pub async fn login(
    client: &reqwest::Client,
    url: &str,
    email: &str,
    password: &str,
) -> Result<TokenPair> {
    let response = client
        .post(url)
        .json(&serde_json::json!({ "email": email, "password": password }))
        .send()
        .await
        .map_err(|e| Error::Http(format!("login request failed: {e}")))?;

    let pair = read_pair(response, "login").await?;
    debug!(email, "login succeeded");
    Ok(pair)
}

/// Exchange a refresh token for a rotated pair.
///
/// The old refresh token is invalid once this succeeds; callers must persist
/// both returned values together.
pub async fn refresh_token(
    client: &reqwest::Client,
    url: &str,
    refresh: &str,
) -> Result<TokenPair> {
    let response = client
        .post(url)
        .json(&serde_json::json!({ "refreshToken": refresh }))
        .send()
        .await
        .map_err(|e| Error::Http(format!("token refresh request failed: {e}")))?;

    read_pair(response, "refresh").await
}

async fn read_pair(response: reqwest::Response, operation: &str) -> Result<TokenPair> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("<no body>"));

        // 401/403 means the credentials themselves were refused
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(Error::InvalidCredentials(format!(
                "{operation} rejected ({status}): {body}"
            )));
        }

        return Err(Error::TokenExchange(format!(
            "{operation} returned {status}: {body}"
        )));
    }

    response
        .json::<TokenEnvelope>()
        .await
        .map(|envelope| envelope.data)
        .map_err(|e| Error::TokenExchange(format!("invalid {operation} response: {e}")))
}
