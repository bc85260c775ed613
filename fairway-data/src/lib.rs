//! Remote access, parsing and file formats for the Fairway harvester.
//!
//! Responsibilities:
//! - Fetch JSON from the scoreboard and leaderboard endpoints with retry and
//!   pacing ([`fetch`]).
//! - Discover the events of a season and checkpoint them ([`discovery`],
//!   [`checkpoint`]).
//! - Turn leaderboard responses into result rows ([`leaderboard`]).
//! - Export stored rows as CSV ([`export`]).
//! - Drive a complete, resumable run ([`pipeline`]).
//!
//! Boundaries:
//! - Domain types and the store live in `fairway-core`.
//! - Callers supply the store, checkpoint, source and pacer, so every stage
//!   runs against in-memory doubles in tests.

pub mod checkpoint;
pub mod discovery;
pub mod export;
pub mod fetch;
pub mod leaderboard;
pub mod pipeline;

pub use checkpoint::{CheckpointError, EventCheckpoint, JsonFileCheckpoint};
pub use export::{CSV_HEADER, ExportError, export_results};
pub use fetch::{Endpoints, FetchError, HttpFetcher, HttpFetcherConfig, JsonSource, RetryPolicy};
pub use leaderboard::parse_leaderboard;
pub use pipeline::{Pipeline, PipelineError, PipelineOptions, RunSummary};
