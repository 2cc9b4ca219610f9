//! Send outcomes and the classifier that maps failed attempts onto them.
//!
//! # Classification rules
//!
//! * **403** → [`SendOutcome::Suppressed`]: the collector deliberately rejected
//!   the event (for example a disabled project). Not an error.
//! * **429** → [`SendOutcome::RateLimited`]: throttled; kept apart from generic
//!   failures so callers do not count it as an application error.
//! * **Anything else, or no status at all** → [`SendOutcome::Failed`].
//!
//! Auxiliary data is best effort: an unparseable `Retry-After` header or a
//! missing status code degrade to "absent" and never escalate.

use std::time::Duration;

use log::debug;

use crate::error::SendError;

/// Message used when the collector gives no usable error detail.
pub const GENERIC_FAILURE_MESSAGE: &str =
    "An exception occurred while submitting the event to the Sentry server.";

/// Why an event was intentionally not delivered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SuppressReason {
    /// The configured sampler rejected the event; no request was made.
    Sampled,
    /// The collector answered 403 Forbidden.
    Forbidden,
}

/// Result of a single delivery attempt.
#[derive(Debug)]
pub enum SendOutcome {
    /// The collector accepted the event.
    Sent,
    /// The event was intentionally not delivered.
    Suppressed { reason: SuppressReason },
    /// The collector is throttling this client.
    RateLimited {
        retry_after_ms: Option<u64>,
        status_code: u16,
    },
    /// Delivery failed for any other reason.
    Failed {
        message: String,
        retry_after_ms: Option<u64>,
        status_code: Option<u16>,
        cause: SendError,
    },
}

impl SendOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, Self::Sent)
    }

    /// Whether the outcome should be surfaced as an application error.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Server-suggested delay before the next attempt, when one was given.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after_ms, .. } | Self::Failed { retry_after_ms, .. } => {
                retry_after_ms.map(Duration::from_millis)
            }
            Self::Sent | Self::Suppressed { .. } => None,
        }
    }

    /// HTTP status seen on the failure path, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::RateLimited { status_code, .. } => Some(*status_code),
            Self::Failed { status_code, .. } => *status_code,
            Self::Sent | Self::Suppressed { .. } => None,
        }
    }
}

/// Everything the classifier may learn about a failed attempt.
#[derive(Debug)]
pub struct FailedAttempt {
    /// HTTP status, absent when no response was received.
    pub status_code: Option<u16>,
    /// Raw `Retry-After` header value.
    pub retry_after: Option<String>,
    /// Error detail supplied by the collector.
    pub detail: Option<String>,
    /// The error that ended the attempt.
    pub cause: SendError,
}

impl FailedAttempt {
    /// A failure that never produced a response.
    pub fn without_response(cause: SendError) -> Self {
        Self {
            status_code: None,
            retry_after: None,
            detail: None,
            cause,
        }
    }
}

/// Map a failed attempt onto a [`SendOutcome`].
pub fn classify_failure(attempt: FailedAttempt) -> SendOutcome {
    let retry_after_ms = attempt.retry_after.as_deref().and_then(parse_retry_after);
    match attempt.status_code {
        Some(403) => SendOutcome::Suppressed {
            reason: SuppressReason::Forbidden,
        },
        Some(429) => SendOutcome::RateLimited {
            retry_after_ms,
            status_code: 429,
        },
        status_code => SendOutcome::Failed {
            message: failure_message(attempt.detail),
            retry_after_ms,
            status_code,
            cause: attempt.cause,
        },
    }
}

/// Parse a `Retry-After` value given in (possibly fractional) seconds into
/// milliseconds. Returns `None` for anything that is not a finite,
/// non-negative number.
pub fn parse_retry_after(raw: &str) -> Option<u64> {
    let seconds = match raw.trim().parse::<f64>() {
        Ok(s) if s.is_finite() && s >= 0.0 => s,
        _ => {
            debug!("could not parse Retry-After value {raw:?}; ignoring it");
            return None;
        }
    };
    // Float-to-int `as` saturates, so absurdly large hints clamp to u64::MAX.
    Some((seconds * 1000.0) as u64)
}

fn failure_message(detail: Option<String>) -> String {
    detail
        .map(|d| d.trim().to_owned())
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_owned())
}
