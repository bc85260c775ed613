//! Blocking [`JsonSource`] backed by `reqwest`.
//!
//! The pipeline is synchronous, so this fetcher owns a Tokio runtime and
//! blocks on each request. When it is called from inside a multi-threaded
//! runtime it reuses that runtime's handle through
//! [`tokio::task::block_in_place`] instead of nesting runtimes.

use std::time::Duration;

use fairway_core::{Pacer, ThreadPacer};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use thiserror::Error;
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};

use super::{FetchError, JsonSource, RetryPolicy, TransportError, fetch_with_retry};

/// Browser-like user agent; the upstream API rejects unknown clients.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; rv:109.0) Gecko/20100101 Firefox/115.0";

/// Per-attempt timeout applied when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors raised while constructing an [`HttpFetcher`].
#[derive(Debug, Error)]
pub enum FetcherBuildError {
    /// The HTTP client rejected its configuration.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
    /// The private Tokio runtime could not start.
    #[error("failed to build Tokio runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

/// Configuration for [`HttpFetcher`].
#[derive(Debug, Clone, PartialEq)]
pub struct HttpFetcherConfig {
    /// Bound applied to each attempt, covering connect and body transfer.
    pub timeout: Duration,
    /// `User-Agent` header sent with every request.
    pub user_agent: String,
    /// Retry budget and backoff for each logical request.
    pub retry: RetryPolicy,
}

impl Default for HttpFetcherConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            retry: RetryPolicy::default(),
        }
    }
}

impl HttpFetcherConfig {
    /// Set the per-attempt timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the retry policy.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

/// Fetches JSON documents over HTTP with bounded retries.
///
/// Backoff pauses go through `P`, which defaults to sleeping the current
/// thread.
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use fairway_data::fetch::{HttpFetcher, HttpFetcherConfig, JsonSource};
///
/// let config = HttpFetcherConfig::default().with_timeout(Duration::from_secs(10));
/// let fetcher = HttpFetcher::new(config)?;
/// let scoreboard = fetcher.fetch_json(
///     "https://site.api.espn.com/apis/site/v2/sports/golf/pga/scoreboard?dates=20250106",
/// )?;
/// println!("{} events", scoreboard["events"].as_array().map_or(0, Vec::len));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct HttpFetcher<P = ThreadPacer> {
    client: Client,
    config: HttpFetcherConfig,
    runtime: Runtime,
    pacer: P,
}

impl<P: std::fmt::Debug> std::fmt::Debug for HttpFetcher<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpFetcher")
            .field("config", &self.config)
            .field("pacer", &self.pacer)
            .field("runtime", &"<tokio::runtime::Runtime>")
            .finish_non_exhaustive()
    }
}

impl HttpFetcher {
    /// Build a fetcher that sleeps the current thread between retries.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn new(config: HttpFetcherConfig) -> Result<Self, FetcherBuildError> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(FetcherBuildError::HttpClient)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(FetcherBuildError::Runtime)?;
        Ok(Self {
            client,
            config,
            runtime,
            pacer: ThreadPacer,
        })
    }
}

impl<P: Pacer> HttpFetcher<P> {
    /// Replace the pacer used for retry backoff.
    #[must_use]
    pub fn with_pacer<Q: Pacer>(self, pacer: Q) -> HttpFetcher<Q> {
        HttpFetcher {
            client: self.client,
            config: self.config,
            runtime: self.runtime,
            pacer,
        }
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &HttpFetcherConfig {
        &self.config
    }

    async fn fetch_once(&self, url: &str) -> Result<Value, TransportError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| self.transport_error(&err))?;
        if let Some(error) = classify_status(response.status()) {
            return Err(error);
        }
        let body = response
            .bytes()
            .await
            .map_err(|err| self.transport_error(&err))?;
        decode_body(&body)
    }

    fn transport_error(&self, error: &reqwest::Error) -> TransportError {
        if error.is_timeout() {
            return TransportError::Timeout {
                timeout_secs: self.config.timeout.as_secs(),
            };
        }
        TransportError::Network {
            message: error.to_string(),
        }
    }

    fn block_on_attempt(&self, url: &str) -> Result<Value, TransportError> {
        let future = self.fetch_once(url);
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(future))
            }
            _ => self.runtime.block_on(future),
        }
    }
}

impl<P: Pacer> JsonSource for HttpFetcher<P> {
    fn fetch_json(&self, url: &str) -> Result<Value, FetchError> {
        fetch_with_retry(&self.config.retry, &self.pacer, url, || {
            self.block_on_attempt(url)
        })
    }
}

fn classify_status(status: StatusCode) -> Option<TransportError> {
    if status == StatusCode::TOO_MANY_REQUESTS {
        Some(TransportError::RateLimited)
    } else if status.is_success() {
        None
    } else {
        Some(TransportError::Http {
            status: status.as_u16(),
        })
    }
}

fn decode_body(body: &[u8]) -> Result<Value, TransportError> {
    serde_json::from_slice(body).map_err(|err| TransportError::Decode {
        message: err.to_string(),
    })
}
