//! Remote JSON retrieval with bounded retries.
//!
//! [`JsonSource`] is the seam between the harvest logic and the network.
//! [`HttpFetcher`] implements it with `reqwest`; tests substitute
//! [`test_support::StubSource`]. Steady-state pacing between logical calls is
//! the caller's job; this module only paces retries of a single call.

mod endpoints;
mod error;
mod http;
mod retry;

#[doc(hidden)]
pub mod test_support;

use serde_json::Value;

pub use endpoints::{DEFAULT_LEADERBOARD_URL, DEFAULT_SCOREBOARD_URL, EndpointError, Endpoints};
pub use error::{FetchError, FetchErrorKind, TransportError};
pub use http::{
    DEFAULT_TIMEOUT, DEFAULT_USER_AGENT, FetcherBuildError, HttpFetcher, HttpFetcherConfig,
};
pub use retry::{DEFAULT_ATTEMPTS, DEFAULT_BACKOFF_BASE, RetryPolicy, fetch_with_retry};

/// Source of parsed JSON documents addressed by URL.
pub trait JsonSource {
    /// Fetch and parse the document at `url`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] once the implementation has given up on `url`.
    fn fetch_json(&self, url: &str) -> Result<Value, FetchError>;
}

impl<S: JsonSource + ?Sized> JsonSource for &S {
    fn fetch_json(&self, url: &str) -> Result<Value, FetchError> {
        (**self).fetch_json(url)
    }
}
