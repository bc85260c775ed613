//! Error types emitted by the Fairway CLI.
//!
//! Keep this error type reasonably small, as many CLI helpers return
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use fairway_data::{
    PipelineError,
    fetch::{EndpointError, FetcherBuildError},
};
use thiserror::Error;

/// Errors emitted by the Fairway CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A merged option holds a value the harvester cannot use.
    #[error("invalid {field}: {reason} (check --{field} or {env})")]
    InvalidArgument {
        /// Long flag name of the offending option.
        field: &'static str,
        /// Environment variable that can also set it.
        env: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
    /// A configured endpoint URL was rejected.
    #[error(transparent)]
    InvalidEndpoint(#[from] EndpointError),
    /// The requested operation requires a missing compile-time feature.
    #[error("{action} requires the `{feature}` feature to be enabled")]
    MissingFeature {
        /// Cargo feature that must be enabled.
        feature: &'static str,
        /// Operation that needed it.
        action: &'static str,
    },
    /// The directory holding the database could not be created.
    #[error("failed to create the directory for {path:?}: {source}")]
    PrepareDatabaseDir {
        /// Database path whose parent was being created.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Opening the SQLite result store failed.
    #[cfg(feature = "store-sqlite")]
    #[error(transparent)]
    OpenStore(#[from] fairway_core::SqliteResultStoreError),
    /// Constructing the HTTP fetcher failed.
    #[error(transparent)]
    BuildFetcher(#[from] FetcherBuildError),
    /// The harvest run aborted.
    #[error("harvest failed: {0}")]
    Harvest(#[from] PipelineError),
}
