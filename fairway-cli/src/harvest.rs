//! Harvest command implementation for the Fairway CLI.

use std::time::Duration;

use camino::Utf8PathBuf;
use clap::Parser;
use fairway_data::{
    RunSummary,
    fetch::{
        DEFAULT_LEADERBOARD_URL, DEFAULT_SCOREBOARD_URL, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT,
        Endpoints, HttpFetcherConfig, RetryPolicy,
    },
    pipeline::{DEFAULT_DELAY, DEFAULT_YEAR, PipelineOptions},
};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::CliError;

pub(crate) const ARG_YEARS: &str = "years";
pub(crate) const ARG_DATABASE: &str = "database";
pub(crate) const ARG_CHECKPOINT: &str = "checkpoint";
pub(crate) const ARG_OUTPUT: &str = "output";
pub(crate) const ARG_DELAY_MS: &str = "delay-ms";
pub(crate) const ARG_RETRIES: &str = "retries";
pub(crate) const ARG_BACKOFF_BASE: &str = "backoff-base";
pub(crate) const ARG_TIMEOUT_SECS: &str = "timeout-secs";
pub(crate) const ARG_USER_AGENT: &str = "user-agent";
pub(crate) const ARG_SCOREBOARD_URL: &str = "scoreboard-url";
pub(crate) const ARG_LEADERBOARD_URL: &str = "leaderboard-url";

pub(crate) const ENV_YEARS: &str = "FAIRWAY_CMDS_HARVEST_YEARS";
pub(crate) const ENV_RETRIES: &str = "FAIRWAY_CMDS_HARVEST_RETRIES";
pub(crate) const ENV_BACKOFF_BASE: &str = "FAIRWAY_CMDS_HARVEST_BACKOFF_BASE";
pub(crate) const ENV_USER_AGENT: &str = "FAIRWAY_CMDS_HARVEST_USER_AGENT";

pub(crate) const DEFAULT_DATABASE: &str = "golf_data.db";
pub(crate) const DEFAULT_CHECKPOINT: &str = "event_ids.json";
pub(crate) const DEFAULT_OUTPUT: &str = "golf/data/golf_results.csv";

/// CLI arguments for the `harvest` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Discover the tournaments of the requested seasons, scrape \
                 every leaderboard not yet stored and export scored rows as \
                 CSV. Runs resume where the previous one stopped; options can \
                 come from CLI flags, configuration files, or environment \
                 variables.",
    about = "Harvest tournament leaderboards into SQLite and CSV"
)]
#[ortho_config(prefix = "FAIRWAY")]
pub(crate) struct HarvestArgs {
    /// Seasons to discover when no checkpoint exists (comma separated).
    #[arg(long = ARG_YEARS, value_name = "year", value_delimiter = ',')]
    #[serde(default)]
    pub(crate) years: Option<Vec<i32>>,
    /// Path to the SQLite result store.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Path to the event checkpoint; delete it to force rediscovery.
    #[arg(long = ARG_CHECKPOINT, value_name = "path")]
    #[serde(default)]
    pub(crate) checkpoint: Option<Utf8PathBuf>,
    /// Destination of the CSV export.
    #[arg(long = ARG_OUTPUT, value_name = "path")]
    #[serde(default)]
    pub(crate) output: Option<Utf8PathBuf>,
    /// Pause after every remote call, in milliseconds.
    #[arg(long = ARG_DELAY_MS, value_name = "ms")]
    #[serde(default)]
    pub(crate) delay_ms: Option<u64>,
    /// Attempts per request, including the first.
    #[arg(long = ARG_RETRIES, value_name = "count")]
    #[serde(default)]
    pub(crate) retries: Option<u32>,
    /// Base of the exponential backoff between attempts, in seconds.
    #[arg(long = ARG_BACKOFF_BASE, value_name = "seconds")]
    #[serde(default)]
    pub(crate) backoff_base: Option<f64>,
    /// Per-attempt request timeout, in seconds.
    #[arg(long = ARG_TIMEOUT_SECS, value_name = "seconds")]
    #[serde(default)]
    pub(crate) timeout_secs: Option<u64>,
    /// `User-Agent` header sent with every request.
    #[arg(long = ARG_USER_AGENT, value_name = "agent")]
    #[serde(default)]
    pub(crate) user_agent: Option<String>,
    /// Scoreboard endpoint used for discovery.
    #[arg(long = ARG_SCOREBOARD_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) scoreboard_url: Option<String>,
    /// Leaderboard endpoint used for scraping.
    #[arg(long = ARG_LEADERBOARD_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) leaderboard_url: Option<String>,
    /// Clear stored events and results before running. The checkpoint is kept.
    #[arg(short = 'c', long = "reset", visible_alias = "clear")]
    #[serde(default)]
    pub(crate) reset: bool,
}

impl HarvestArgs {
    pub(crate) fn into_config(self) -> Result<HarvestConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        HarvestConfig::try_from(merged)
    }
}

/// Resolved `harvest` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct HarvestConfig {
    /// Path to the SQLite result store.
    pub(crate) database: Utf8PathBuf,
    /// Path to the event checkpoint.
    pub(crate) checkpoint: Utf8PathBuf,
    /// HTTP client settings.
    pub(crate) fetcher: HttpFetcherConfig,
    /// Pipeline settings, including the export path.
    pub(crate) options: PipelineOptions,
}

impl TryFrom<HarvestArgs> for HarvestConfig {
    type Error = CliError;

    fn try_from(args: HarvestArgs) -> Result<Self, Self::Error> {
        let years = args.years.unwrap_or_else(|| vec![DEFAULT_YEAR]);
        if years.is_empty() {
            return Err(invalid(ARG_YEARS, ENV_YEARS, "at least one year is required"));
        }

        let retries = args.retries.unwrap_or(RetryPolicy::default().attempts);
        if retries == 0 {
            return Err(invalid(ARG_RETRIES, ENV_RETRIES, "must be at least 1"));
        }

        let backoff_base = args
            .backoff_base
            .unwrap_or(RetryPolicy::default().backoff_base);
        if !backoff_base.is_finite() || backoff_base < 1.0 {
            return Err(invalid(
                ARG_BACKOFF_BASE,
                ENV_BACKOFF_BASE,
                format!("{backoff_base} is not a finite number of at least 1.0"),
            ));
        }

        let user_agent = args
            .user_agent
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_owned());
        if user_agent.trim().is_empty() {
            return Err(invalid(ARG_USER_AGENT, ENV_USER_AGENT, "must not be empty"));
        }

        let endpoints = Endpoints::new(
            args.scoreboard_url
                .as_deref()
                .unwrap_or(DEFAULT_SCOREBOARD_URL),
            args.leaderboard_url
                .as_deref()
                .unwrap_or(DEFAULT_LEADERBOARD_URL),
        )?;
        let delay = args
            .delay_ms
            .map_or(DEFAULT_DELAY, Duration::from_millis);
        let timeout = args.timeout_secs.map_or(DEFAULT_TIMEOUT, Duration::from_secs);
        let output = args
            .output
            .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_OUTPUT));

        Ok(Self {
            database: args
                .database
                .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_DATABASE)),
            checkpoint: args
                .checkpoint
                .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_CHECKPOINT)),
            fetcher: HttpFetcherConfig::default()
                .with_timeout(timeout)
                .with_user_agent(user_agent)
                .with_retry(RetryPolicy::new(retries, backoff_base)),
            options: PipelineOptions::new(endpoints, output)
                .with_years(years)
                .with_delay(delay)
                .with_reset(args.reset),
        })
    }
}

fn invalid(field: &'static str, env: &'static str, reason: impl Into<String>) -> CliError {
    CliError::InvalidArgument {
        field,
        env,
        reason: reason.into(),
    }
}

pub(crate) fn run_harvest(args: HarvestArgs) -> Result<RunSummary, CliError> {
    let config = args.into_config()?;
    execute_harvest(&config)
}

#[cfg(feature = "store-sqlite")]
pub(crate) fn execute_harvest(config: &HarvestConfig) -> Result<RunSummary, CliError> {
    use fairway_core::{SqliteResultStore, ThreadPacer};
    use fairway_data::{HttpFetcher, JsonFileCheckpoint, Pipeline};

    fairway_fs::ensure_parent_dir(&config.database).map_err(|source| {
        CliError::PrepareDatabaseDir {
            path: config.database.clone(),
            source,
        }
    })?;
    let store = SqliteResultStore::open(config.database.as_std_path())?;
    let fetcher = HttpFetcher::new(config.fetcher.clone())?;
    let mut pipeline = Pipeline::new(
        store,
        JsonFileCheckpoint::new(config.checkpoint.clone()),
        fetcher,
        ThreadPacer,
    );
    Ok(pipeline.run(&config.options)?)
}

#[cfg(not(feature = "store-sqlite"))]
pub(crate) fn execute_harvest(_config: &HarvestConfig) -> Result<RunSummary, CliError> {
    Err(CliError::MissingFeature {
        feature: "store-sqlite",
        action: "harvest",
    })
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<HarvestConfig, CliError> {
    let merged = HarvestArgs::merge_from_layers(layers).map_err(CliError::from)?;
    HarvestConfig::try_from(merged)
}
