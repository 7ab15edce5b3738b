//! Failure classification
//!
//! Pure decision function: given what went wrong with an attempt and the
//! request's auth context, return what the client should do next. The caller
//! (`ApiClient`) performs the I/O implied by the disposition.
//!
//! Precedence, first match wins:
//! 1. 413 / 503 / no response       -> Maintenance
//! 2. 401 after a retry             -> Login, clear tokens
//! 3. 401 without a refresh token   -> Login
//! 4. 401, token rotated since send -> RetryWithCurrentToken
//! 5. 401                           -> Refresh
//! 6. anything else                 -> PassThrough

/// What went wrong with a single attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    /// A response arrived with a non-2xx status
    Status(u16),
    /// The transport reported an error without any response
    NoResponse,
    /// The client-wide timeout elapsed
    Timeout,
}

/// Auth state of the request at the time of failure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FailureContext {
    /// The request already went through one refresh-and-retry cycle
    pub retried: bool,
    /// A refresh token is currently stored
    pub has_refresh_token: bool,
    /// The stored access token differs from the one this attempt carried
    pub token_rotated: bool,
}

/// Next step for a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Return the error to the caller unchanged
    PassThrough,
    /// Navigate to the maintenance page and abandon the request
    Maintenance,
    /// Navigate to login and abandon the request
    Login { clear_tokens: bool },
    /// Join or start the single-flight refresh, then retry once
    Refresh,
    /// Another request already refreshed; retry once with the stored token
    RetryWithCurrentToken,
}

/// Status codes treated as infrastructure failure.
const FATAL_STATUSES: &[u16] = &[413, 503];

const UNAUTHORIZED: u16 = 401;

/// Classify a failed attempt. Pure function: no I/O.
pub fn classify(failure: Failure, context: FailureContext) -> Disposition {
    match failure {
        Failure::NoResponse => Disposition::Maintenance,
        Failure::Timeout => Disposition::PassThrough,
        Failure::Status(status) if FATAL_STATUSES.contains(&status) => Disposition::Maintenance,
        Failure::Status(UNAUTHORIZED) => classify_unauthorized(context),
        Failure::Status(_) => Disposition::PassThrough,
    }
}

fn classify_unauthorized(context: FailureContext) -> Disposition {
    if context.retried {
        return Disposition::Login { clear_tokens: true };
    }
    if !context.has_refresh_token {
        return Disposition::Login {
            clear_tokens: false,
        };
    }
    if context.token_rotated {
        return Disposition::RetryWithCurrentToken;
    }
    Disposition::Refresh
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh() -> FailureContext {
        FailureContext {
            retried: false,
            has_refresh_token: true,
            token_rotated: false,
        }
    }

    #[test]
    fn payload_too_large_is_maintenance() {
        assert_eq!(classify(Failure::Status(413), fresh()), Disposition::Maintenance);
    }

    #[test]
    fn service_unavailable_is_maintenance() {
        assert_eq!(classify(Failure::Status(503), fresh()), Disposition::Maintenance);
    }

    #[test]
    fn no_response_is_maintenance() {
        assert_eq!(classify(Failure::NoResponse, fresh()), Disposition::Maintenance);
    }

    #[test]
    fn maintenance_ignores_token_state() {
        for retried in [false, true] {
            for has_refresh_token in [false, true] {
                let ctx = FailureContext {
                    retried,
                    has_refresh_token,
                    token_rotated: false,
                };
                assert_eq!(classify(Failure::Status(503), ctx), Disposition::Maintenance);
                assert_eq!(classify(Failure::NoResponse, ctx), Disposition::Maintenance);
            }
        }
    }

    #[test]
    fn timeout_passes_through() {
        assert_eq!(classify(Failure::Timeout, fresh()), Disposition::PassThrough);
    }

    #[test]
    fn unauthorized_with_refresh_token_refreshes() {
        assert_eq!(classify(Failure::Status(401), fresh()), Disposition::Refresh);
    }

    #[test]
    fn unauthorized_without_refresh_token_goes_to_login() {
        let ctx = FailureContext {
            has_refresh_token: false,
            ..fresh()
        };
        assert_eq!(
            classify(Failure::Status(401), ctx),
            Disposition::Login {
                clear_tokens: false
            }
        );
    }

    #[test]
    fn unauthorized_after_retry_clears_and_goes_to_login() {
        let ctx = FailureContext {
            retried: true,
            ..fresh()
        };
        assert_eq!(
            classify(Failure::Status(401), ctx),
            Disposition::Login { clear_tokens: true }
        );
    }

    #[test]
    fn retry_exhaustion_wins_over_rotation() {
        let ctx = FailureContext {
            retried: true,
            has_refresh_token: true,
            token_rotated: true,
        };
        assert_eq!(
            classify(Failure::Status(401), ctx),
            Disposition::Login { clear_tokens: true }
        );
    }

    #[test]
    fn rotated_token_retries_without_refresh() {
        let ctx = FailureContext {
            token_rotated: true,
            ..fresh()
        };
        assert_eq!(
            classify(Failure::Status(401), ctx),
            Disposition::RetryWithCurrentToken
        );
    }

    #[test]
    fn other_statuses_pass_through() {
        for status in [400, 403, 404, 409, 422, 429, 500, 502, 504] {
            assert_eq!(
                classify(Failure::Status(status), fresh()),
                Disposition::PassThrough,
                "status {status}"
            );
        }
    }
}
