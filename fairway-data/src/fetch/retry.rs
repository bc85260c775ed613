//! Bounded retry with exponential backoff.

use std::time::Duration;

use fairway_core::Pacer;
use serde_json::Value;

use super::{FetchError, FetchErrorKind, TransportError};

/// Default number of attempts per request.
pub const DEFAULT_ATTEMPTS: u32 = 3;

/// Default exponential backoff base, in seconds.
pub const DEFAULT_BACKOFF_BASE: f64 = 2.0;

/// Retry budget and backoff curve for one logical request.
///
/// Attempt `n` (counted from zero) that fails with a retryable error is
/// followed by a pause of `backoff_base^n` seconds, provided another attempt
/// remains.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first. Zero is treated as one.
    pub attempts: u32,
    /// Base of the exponential backoff, in seconds.
    pub backoff_base: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_ATTEMPTS,
            backoff_base: DEFAULT_BACKOFF_BASE,
        }
    }
}

impl RetryPolicy {
    /// Create a policy with the given budget and backoff base.
    #[must_use]
    pub const fn new(attempts: u32, backoff_base: f64) -> Self {
        Self {
            attempts,
            backoff_base,
        }
    }

    /// Pause applied after the zero-based `attempt` fails.
    ///
    /// Non-finite or negative results collapse to zero; overflow saturates.
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let seconds = self.backoff_base.powi(exponent);
        if seconds.is_nan() || seconds <= 0.0 {
            return Duration::ZERO;
        }
        Duration::try_from_secs_f64(seconds).unwrap_or(Duration::MAX)
    }

    fn budget(&self) -> u32 {
        self.attempts.max(1)
    }
}

/// Run `request` until it succeeds, fails fatally or exhausts `policy`.
///
/// Rate-limited and transient failures consume one attempt each and sleep
/// through `pacer` only when a further attempt remains. A decode failure is
/// returned immediately. Exhausting the budget yields a
/// [`FetchErrorKind::Fatal`] error carrying the last attempt's failure.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use fairway_core::Pacer;
/// use fairway_data::fetch::{RetryPolicy, TransportError, fetch_with_retry};
/// use serde_json::json;
///
/// struct NoPause;
///
/// impl Pacer for NoPause {
///     fn pause(&self, _duration: Duration) {}
/// }
///
/// let mut calls = 0;
/// let value = fetch_with_retry(&RetryPolicy::default(), &NoPause, "https://example.test", || {
///     calls += 1;
///     if calls == 1 {
///         Err(TransportError::Http { status: 502 })
///     } else {
///         Ok(json!({"events": []}))
///     }
/// })?;
/// assert_eq!(value, json!({"events": []}));
/// assert_eq!(calls, 2);
/// # Ok::<(), fairway_data::fetch::FetchError>(())
/// ```
pub fn fetch_with_retry<P, F>(
    policy: &RetryPolicy,
    pacer: &P,
    url: &str,
    mut request: F,
) -> Result<Value, FetchError>
where
    P: Pacer + ?Sized,
    F: FnMut() -> Result<Value, TransportError>,
{
    let budget = policy.budget();
    let mut attempt = 0;
    loop {
        let error = match request() {
            Ok(value) => return Ok(value),
            Err(error) => error,
        };
        let made = attempt + 1;
        let kind = error.kind();
        if kind == FetchErrorKind::Fatal || made >= budget {
            return Err(FetchError::fatal(url, made, error));
        }

        let wait = policy.backoff(attempt);
        if kind == FetchErrorKind::RateLimited {
            log::info!("{url}: rate limited, waiting {}s", wait.as_secs());
        } else {
            log::debug!("{url}: {error}; retrying in {}s", wait.as_secs());
        }
        pacer.pause(wait);
        attempt = made;
    }
}
