//! Facade crate for the Fairway leaderboard harvester.
//!
//! This crate re-exports the core domain types and exposes the harvest
//! pipeline and the `SQLite` store behind feature flags.

#![forbid(unsafe_code)]

pub use fairway_core::{Event, EventRecord, Pacer, ResultRow, ResultStore, ThreadPacer};

#[cfg(feature = "store-sqlite")]
pub use fairway_core::{SqliteResultStore, SqliteResultStoreError};

#[cfg(feature = "pipeline")]
pub use fairway_data::{
    CheckpointError, Endpoints, EventCheckpoint, ExportError, FetchError, HttpFetcher,
    HttpFetcherConfig, JsonFileCheckpoint, JsonSource, Pipeline, PipelineError, PipelineOptions,
    RetryPolicy, RunSummary,
};
