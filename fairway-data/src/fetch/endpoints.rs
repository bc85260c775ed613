//! Scoreboard and leaderboard URL construction.

use thiserror::Error;
use url::Url;

/// Scoreboard endpoint listing events active on a given date.
pub const DEFAULT_SCOREBOARD_URL: &str =
    "https://site.api.espn.com/apis/site/v2/sports/golf/pga/scoreboard";

/// Leaderboard endpoint returning one event's competitors.
pub const DEFAULT_LEADERBOARD_URL: &str =
    "https://site.web.api.espn.com/apis/site/v2/sports/golf/leaderboard";

/// Errors raised when configuring [`Endpoints`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EndpointError {
    /// The configured value is not an absolute URL.
    #[error("invalid {name} URL {url:?}: {source}")]
    Parse {
        /// Which endpoint was being configured.
        name: &'static str,
        /// Rejected input.
        url: String,
        /// Parser failure.
        #[source]
        source: url::ParseError,
    },
    /// Only `http` and `https` endpoints are supported.
    #[error("{name} URL {url:?} must use http or https")]
    UnsupportedScheme {
        /// Which endpoint was being configured.
        name: &'static str,
        /// Rejected input.
        url: String,
    },
}

/// Base URLs for the two remote endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    scoreboard: Url,
    leaderboard: Url,
}

impl Endpoints {
    /// Validate and store the scoreboard and leaderboard base URLs.
    ///
    /// # Errors
    ///
    /// Returns [`EndpointError`] when either URL does not parse or uses a
    /// scheme other than `http`/`https`.
    pub fn new(scoreboard: &str, leaderboard: &str) -> Result<Self, EndpointError> {
        Ok(Self {
            scoreboard: parse_endpoint("scoreboard", scoreboard)?,
            leaderboard: parse_endpoint("leaderboard", leaderboard)?,
        })
    }

    /// The public ESPN golf endpoints.
    ///
    /// # Errors
    ///
    /// Only fails if the built-in constants stop parsing.
    pub fn espn() -> Result<Self, EndpointError> {
        Self::new(DEFAULT_SCOREBOARD_URL, DEFAULT_LEADERBOARD_URL)
    }

    /// Scoreboard URL for a `YYYYMMDD` date.
    #[must_use]
    pub fn scoreboard(&self, date: &str) -> String {
        with_query(&self.scoreboard, "dates", date)
    }

    /// Leaderboard URL for one event.
    #[must_use]
    pub fn leaderboard(&self, event_id: &str) -> String {
        with_query(&self.leaderboard, "event", event_id)
    }
}

fn parse_endpoint(name: &'static str, raw: &str) -> Result<Url, EndpointError> {
    let url = Url::parse(raw).map_err(|source| EndpointError::Parse {
        name,
        url: raw.to_owned(),
        source,
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(EndpointError::UnsupportedScheme {
            name,
            url: raw.to_owned(),
        }),
    }
}

fn with_query(base: &Url, key: &str, value: &str) -> String {
    let mut url = base.clone();
    url.query_pairs_mut().append_pair(key, value);
    url.into()
}
