//! User-facing failure messages
//!
//! Pure mapping from (status, backend message, error message) to the text a
//! caller shows in a notification. No I/O, no state.

pub const PERMISSION_DENIED: &str = "You do not have permission to perform this action.";
pub const NOT_FOUND: &str = "The requested resource was not found.";
pub const INVALID_REQUEST: &str = "Invalid request. Please check your input.";
pub const SESSION_EXPIRED: &str = "Session expired. Please log in again.";
pub const SERVER_ERROR: &str = "A server error occurred. Please try again later.";
pub const NETWORK_UNAVAILABLE: &str =
    "Unable to connect to the server. Please check your network connection.";

/// Map a failed call to a user-facing message.
///
/// `status` is `None` when no response was received. `backend` is the
/// `message` field of the response envelope, `error` the failure's own
/// description, and `default` the caller's last-resort text.
pub fn user_message(
    status: Option<u16>,
    backend: Option<&str>,
    error: Option<&str>,
    default: &str,
) -> String {
    let backend = backend.filter(|m| !m.trim().is_empty());
    let error = error.filter(|m| !m.trim().is_empty());

    let Some(status) = status else {
        return NETWORK_UNAVAILABLE.to_string();
    };

    match status {
        403 => PERMISSION_DENIED.to_string(),
        404 => NOT_FOUND.to_string(),
        400 => backend.unwrap_or(INVALID_REQUEST).to_string(),
        401 => SESSION_EXPIRED.to_string(),
        500 => SERVER_ERROR.to_string(),
        _ => backend.or(error).unwrap_or(default).to_string(),
    }
}

/// Extract the `message` field from a JSON error body.
pub fn body_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .and_then(|m| m.as_str())
        .map(str::to_string)
}
