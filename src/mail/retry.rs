//! HTTP-level retry for mail API calls
//!
//! This only smooths over throttling and flaky connections on mailbox calls.
//! Sends use `RetryPolicy::none()`: a failed send is reported and the
//! contact is skipped.

use crate::error::{ErrorCode, OutreachError, Result};
use reqwest::header::{HeaderValue, RETRY_AFTER};
use reqwest::{RequestBuilder, Response, StatusCode};
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff_ms: 250,
            max_backoff_ms: 2_000,
        }
    }
}

impl RetryPolicy {
    /// Single attempt, no waiting
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    Retryable,
    NonRetryable,
}

pub fn retry_decision_for_status(status: StatusCode) -> RetryDecision {
    if status == StatusCode::TOO_MANY_REQUESTS
        || status == StatusCode::REQUEST_TIMEOUT
        || status.is_server_error()
    {
        RetryDecision::Retryable
    } else {
        RetryDecision::NonRetryable
    }
}

/// Delay before the next attempt; a numeric `Retry-After` wins, capped at 30s
pub fn retry_delay(attempt: u32, policy: &RetryPolicy, retry_after: Option<&HeaderValue>) -> Duration {
    if let Some(secs) = retry_after
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
    {
        return Duration::from_secs(secs.min(30));
    }

    let exponent = 2u64.saturating_pow(attempt.saturating_sub(1));
    let base = policy
        .initial_backoff_ms
        .saturating_mul(exponent)
        .min(policy.max_backoff_ms);
    Duration::from_millis(base)
}

/// Send a request, retrying throttled responses and transport timeouts
///
/// The final response is returned whatever its status; callers map it.
pub async fn send_with_retry(request: RequestBuilder, policy: &RetryPolicy) -> Result<Response> {
    let attempts = policy.max_attempts.max(1);
    let transport_error = |e: reqwest::Error| {
        OutreachError::send_with_code(ErrorCode::SEND_REQUEST_FAILED, "Mail API request failed", None)
            .with_source(e)
    };

    for attempt in 1..=attempts {
        let Some(cloned) = request.try_clone() else {
            return request.send().await.map_err(transport_error);
        };

        match cloned.send().await {
            Ok(response) => {
                let status = response.status();
                if retry_decision_for_status(status) == RetryDecision::Retryable && attempt < attempts {
                    let delay = retry_delay(attempt, policy, response.headers().get(RETRY_AFTER));
                    warn!(
                        "Mail API retry {}/{} after status {} (sleep {:?})",
                        attempt, attempts, status, delay
                    );
                    tokio::time::sleep(delay).await;
                    continue;
                }
                return Ok(response);
            }
            Err(err) => {
                if (err.is_timeout() || err.is_connect()) && attempt < attempts {
                    let delay = retry_delay(attempt, policy, None);
                    warn!(
                        "Mail API retry {}/{} after transport error: {} (sleep {:?})",
                        attempt, attempts, err, delay
                    );
                    tokio::time::sleep(delay).await;
                    continue;
                }
                return Err(transport_error(err));
            }
        }
    }

    Err(OutreachError::send_with_code(
        ErrorCode::SEND_REQUEST_FAILED,
        "Mail API request exhausted retries",
        None,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_decisions() {
        assert_eq!(
            retry_decision_for_status(StatusCode::TOO_MANY_REQUESTS),
            RetryDecision::Retryable
        );
        assert_eq!(
            retry_decision_for_status(StatusCode::BAD_GATEWAY),
            RetryDecision::Retryable
        );
        assert_eq!(
            retry_decision_for_status(StatusCode::BAD_REQUEST),
            RetryDecision::NonRetryable
        );
        assert_eq!(
            retry_decision_for_status(StatusCode::UNAUTHORIZED),
            RetryDecision::NonRetryable
        );
    }

    #[test]
    fn test_retry_delay() {
        let policy = RetryPolicy::default();
        assert_eq!(retry_delay(1, &policy, None), Duration::from_millis(250));
        assert_eq!(retry_delay(2, &policy, None), Duration::from_millis(500));
        assert_eq!(retry_delay(10, &policy, None), Duration::from_millis(2_000));

        let header = HeaderValue::from_static("7");
        assert_eq!(retry_delay(1, &policy, Some(&header)), Duration::from_secs(7));
        let header = HeaderValue::from_static("120");
        assert_eq!(retry_delay(1, &policy, Some(&header)), Duration::from_secs(30));
    }
}
