//! Scripted [`JsonSource`] for tests.
//!
//! [`StubSource`] answers from a per-URL table and records every request so
//! tests can assert which endpoints were (or were not) contacted.

use std::{cell::RefCell, collections::HashMap};

use serde_json::Value;

use super::{FetchError, JsonSource, TransportError};

/// Deterministic [`JsonSource`] returning pre-configured responses.
///
/// URLs without a configured response fail with HTTP 404.
///
/// # Example
///
/// ```
/// use fairway_data::fetch::{JsonSource, test_support::StubSource};
/// use serde_json::json;
///
/// let source = StubSource::default().with_json("https://example.test/a", json!({"events": []}));
///
/// assert!(source.fetch_json("https://example.test/a").is_ok());
/// assert!(source.fetch_json("https://example.test/b").is_err());
/// assert_eq!(source.calls().len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct StubSource {
    responses: HashMap<String, Result<Value, TransportError>>,
    calls: RefCell<Vec<String>>,
}

impl StubSource {
    /// Answer `url` with `value`.
    #[must_use]
    pub fn with_json(mut self, url: impl Into<String>, value: Value) -> Self {
        self.responses.insert(url.into(), Ok(value));
        self
    }

    /// Fail every request for `url` with `error`.
    #[must_use]
    pub fn with_failure(mut self, url: impl Into<String>, error: TransportError) -> Self {
        self.responses.insert(url.into(), Err(error));
        self
    }

    /// Every requested URL, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    /// Number of requests whose URL contains `fragment`.
    #[must_use]
    pub fn calls_containing(&self, fragment: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|url| url.contains(fragment))
            .count()
    }
}

impl JsonSource for StubSource {
    fn fetch_json(&self, url: &str) -> Result<Value, FetchError> {
        self.calls.borrow_mut().push(url.to_owned());
        match self.responses.get(url) {
            Some(Ok(value)) => Ok(value.clone()),
            Some(Err(error)) => Err(FetchError::fatal(url, 1, error.clone())),
            None => Err(FetchError::fatal(url, 1, TransportError::Http { status: 404 })),
        }
    }
}
