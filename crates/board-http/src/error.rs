//! Errors surfaced by the HTTP client core
//!
//! Callers see one of three shapes: the server's own failure (`Status`,
//! `Rejected`), a transport problem (`Network`, `Timeout`), or a terminal
//! navigation (`Redirected`) that wraps whichever of those caused it.

use crate::message::{body_message, user_message};
use crate::navigator::Redirect;

/// Errors from `ApiClient` calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Non-2xx response, passed through with status and body intact.
    #[error("request failed with status code {status}")]
    Status { status: u16, body: String },

    /// `{"success": false}` envelope on a 2xx response.
    #[error("{}", .message.as_deref().unwrap_or("request was not successful"))]
    Rejected { message: Option<String> },

    /// The transport produced no response at all.
    #[error("network error: {0}")]
    Network(String),

    /// The client-wide timeout elapsed before a response arrived.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// The request could not be built (bad header, MIME type, or body).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The response body did not match the expected shape.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// Local file I/O failed while saving a download.
    #[error("I/O error: {0}")]
    Io(String),

    /// Token refresh failed; credentials were cleared.
    #[error("token refresh failed: {0}")]
    Refresh(String),

    /// The request was abandoned because the client navigated away.
    #[error("navigating to {target}: {cause}")]
    Redirected {
        target: Redirect,
        #[source]
        cause: Box<ApiError>,
    },
}

impl ApiError {
    pub(crate) fn redirected(target: Redirect, cause: ApiError) -> Self {
        ApiError::Redirected {
            target,
            cause: Box::new(cause),
        }
    }

    /// HTTP status of the response behind this error, if there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Redirected { cause, .. } => cause.status(),
            _ => None,
        }
    }

    /// Raw response body behind this error, if there was one.
    pub fn body(&self) -> Option<&str> {
        match self {
            ApiError::Status { body, .. } => Some(body),
            ApiError::Redirected { cause, .. } => cause.body(),
            _ => None,
        }
    }

    /// Navigation target if this error ended in a redirect.
    pub fn redirect(&self) -> Option<Redirect> {
        match self {
            ApiError::Redirected { target, .. } => Some(*target),
            _ => None,
        }
    }

    /// Whether a response was received before the failure.
    pub fn has_response(&self) -> bool {
        match self {
            ApiError::Status { .. } | ApiError::Rejected { .. } | ApiError::Decode(_) => true,
            ApiError::Redirected { cause, .. } => cause.has_response(),
            ApiError::Network(_)
            | ApiError::Timeout(_)
            | ApiError::InvalidRequest(_)
            | ApiError::Io(_)
            | ApiError::Refresh(_) => false,
        }
    }

    /// Whether the transport failed to reach the server at all.
    pub fn is_transport(&self) -> bool {
        match self {
            ApiError::Network(_) | ApiError::Timeout(_) => true,
            ApiError::Redirected { cause, .. } => cause.is_transport(),
            _ => false,
        }
    }

    /// User-facing message for this failure, falling back to `default`.
    ///
    /// Only transport failures get the connectivity message; local failures
    /// describe themselves.
    pub fn user_message(&self, default: &str) -> String {
        let backend = match self {
            ApiError::Rejected { message } => message.clone(),
            _ => self.body().and_then(body_message),
        };
        let own = self.to_string();
        if self.is_transport() {
            return user_message(None, backend.as_deref(), Some(own.as_str()), default);
        }
        if !self.has_response() {
            return own_message(backend.as_deref(), &own, default);
        }
        let status = self.status().unwrap_or(200);
        user_message(Some(status), backend.as_deref(), Some(own.as_str()), default)
    }
}

fn own_message(backend: Option<&str>, own: &str, default: &str) -> String {
    backend
        .or(Some(own))
        .filter(|m| !m.trim().is_empty())
        .unwrap_or(default)
        .to_string()
}

/// Result alias for client operations.
pub type Result<T> = std::result::Result<T, ApiError>;
