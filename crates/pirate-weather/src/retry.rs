//! Retry policy for upstream calls.
//!
//! Only 5xx responses are retried, with a fixed delay between attempts.
//! It does NOT retry:
//! - 4xx client errors (bad coordinates, bad key, quota hit)
//! - Transport failures (connection refused, timeouts)
//! - Bodies that fail to decode

use std::time::Duration;

use reqwest::StatusCode;

use crate::error::ClientErrorKind;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one
    pub max_attempts: u32,
    /// Fixed pause between attempts
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay_ms: u64) -> Self {
        Self {
            max_attempts,
            delay: Duration::from_millis(delay_ms),
        }
    }

    /// Attempt budget, never less than one.
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

/// How the orchestrator reacts to a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Success,
    Client(ClientErrorKind),
    Server,
    Unexpected,
}

pub fn classify_status(status: StatusCode) -> StatusClass {
    match status {
        StatusCode::OK => StatusClass::Success,
        StatusCode::BAD_REQUEST => StatusClass::Client(ClientErrorKind::BadRequest),
        StatusCode::UNAUTHORIZED => StatusClass::Client(ClientErrorKind::Unauthorized),
        StatusCode::NOT_FOUND => StatusClass::Client(ClientErrorKind::NotFound),
        StatusCode::TOO_MANY_REQUESTS => StatusClass::Client(ClientErrorKind::QuotaExceeded),
        s if s.is_server_error() => StatusClass::Server,
        _ => StatusClass::Unexpected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_policy_default() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.delay, Duration::from_secs(2));
    }

    #[test]
    fn test_zero_attempts_still_tries_once() {
        assert_eq!(RetryPolicy::new(0, 10).attempts(), 1);
    }

    #[test]
    fn test_classify_status_codes() {
        assert_eq!(classify_status(StatusCode::OK), StatusClass::Success);

        assert_eq!(classify_status(StatusCode::INTERNAL_SERVER_ERROR), StatusClass::Server);
        assert_eq!(classify_status(StatusCode::BAD_GATEWAY), StatusClass::Server);
        assert_eq!(classify_status(StatusCode::SERVICE_UNAVAILABLE), StatusClass::Server);

        assert_eq!(
            classify_status(StatusCode::UNAUTHORIZED),
            StatusClass::Client(ClientErrorKind::Unauthorized)
        );
        assert_eq!(
            classify_status(StatusCode::TOO_MANY_REQUESTS),
            StatusClass::Client(ClientErrorKind::QuotaExceeded)
        );

        // Undocumented statuses are neither retried nor mapped to a client error
        assert_eq!(classify_status(StatusCode::FORBIDDEN), StatusClass::Unexpected);
        assert_eq!(classify_status(StatusCode::NO_CONTENT), StatusClass::Unexpected);
        assert_eq!(classify_status(StatusCode::MOVED_PERMANENTLY), StatusClass::Unexpected);
    }
}
