//! Client metrics
//!
//! Emitted through the `metrics` facade; they are no-ops until the embedding
//! application installs a recorder.
//!
//! - `board_http_requests_total` (counter): labels `status`, `method`
//! - `board_http_request_duration_seconds` (histogram): label `status`
//! - `board_http_token_refresh_total` (counter): label `outcome`
//! - `board_http_redirects_total` (counter): label `target`

/// Record one completed attempt. `status` is 0 when no response arrived.
pub fn record_request(status: u16, method: &str, duration_secs: f64) {
    let status_str = status.to_string();
    metrics::counter!(
        "board_http_requests_total",
        "status" => status_str.clone(),
        "method" => method.to_string()
    )
    .increment(1);
    metrics::histogram!("board_http_request_duration_seconds", "status" => status_str)
        .record(duration_secs);
}

/// Record the outcome of a refresh cycle: `success`, `failure`, or `skipped`.
pub fn record_refresh(outcome: &str) {
    metrics::counter!("board_http_token_refresh_total", "outcome" => outcome.to_string())
        .increment(1);
}

/// Record a terminal navigation.
pub fn record_redirect(target: &str) {
    metrics::counter!("board_http_redirects_total", "target" => target.to_string()).increment(1);
}
