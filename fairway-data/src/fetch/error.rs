//! Failure taxonomy for remote JSON requests.

use thiserror::Error;

/// How a failed request should be treated by its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchErrorKind {
    /// The server asked us to slow down (HTTP 429).
    RateLimited,
    /// Network or HTTP failure that may succeed on retry.
    Transient,
    /// Retrying will not help; the unit of work should be skipped.
    Fatal,
}

/// Outcome of a single failed HTTP attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The server responded with HTTP 429.
    #[error("rate limited by server (HTTP 429)")]
    RateLimited,
    /// The server responded with another non-success status.
    #[error("server responded with HTTP {status}")]
    Http {
        /// Numeric status code.
        status: u16,
    },
    /// The request did not complete within the configured timeout.
    #[error("request timed out after {timeout_secs}s")]
    Timeout {
        /// Timeout applied to the attempt.
        timeout_secs: u64,
    },
    /// Connection, TLS or body transfer failure.
    #[error("network error: {message}")]
    Network {
        /// Description reported by the HTTP client.
        message: String,
    },
    /// The body arrived but is not a JSON document.
    #[error("response is not valid JSON: {message}")]
    Decode {
        /// Description reported by the JSON parser.
        message: String,
    },
}

impl TransportError {
    /// Classify this attempt failure.
    #[must_use]
    pub const fn kind(&self) -> FetchErrorKind {
        match self {
            Self::RateLimited => FetchErrorKind::RateLimited,
            Self::Http { .. } | Self::Timeout { .. } | Self::Network { .. } => {
                FetchErrorKind::Transient
            }
            Self::Decode { .. } => FetchErrorKind::Fatal,
        }
    }
}

/// A request that failed after the retry budget was spent or on a fatal
/// attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("request to {url} failed after {attempts} attempt(s): {source}")]
pub struct FetchError {
    /// Classification surfaced to callers.
    pub kind: FetchErrorKind,
    /// Requested URL.
    pub url: String,
    /// Number of attempts made, including the failing one.
    pub attempts: u32,
    /// Error from the last attempt.
    #[source]
    pub source: TransportError,
}

impl FetchError {
    /// Build an error with an explicit classification.
    #[must_use]
    pub fn new(
        kind: FetchErrorKind,
        url: impl Into<String>,
        attempts: u32,
        source: TransportError,
    ) -> Self {
        Self {
            kind,
            url: url.into(),
            attempts,
            source,
        }
    }

    /// Build a [`FetchErrorKind::Fatal`] error.
    #[must_use]
    pub fn fatal(url: impl Into<String>, attempts: u32, source: TransportError) -> Self {
        Self::new(FetchErrorKind::Fatal, url, attempts, source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(TransportError::RateLimited, FetchErrorKind::RateLimited)]
    #[case(TransportError::Http { status: 503 }, FetchErrorKind::Transient)]
    #[case(TransportError::Timeout { timeout_secs: 30 }, FetchErrorKind::Transient)]
    #[case(
        TransportError::Network { message: "connection reset".into() },
        FetchErrorKind::Transient
    )]
    #[case(
        TransportError::Decode { message: "expected value".into() },
        FetchErrorKind::Fatal
    )]
    fn classifies_transport_errors(#[case] error: TransportError, #[case] expected: FetchErrorKind) {
        assert_eq!(error.kind(), expected);
    }

    #[rstest]
    fn display_names_url_and_attempts() {
        let err = FetchError::fatal("https://example.test/a", 3, TransportError::RateLimited);

        assert_eq!(
            err.to_string(),
            "request to https://example.test/a failed after 3 attempt(s): rate limited by server (HTTP 429)"
        );
    }
}
