//! Core domain types for the Fairway leaderboard harvester.
//!
//! The crate models discovered tournaments ([`Event`]), the per-player rows
//! extracted from their leaderboards ([`ResultRow`]) and the durable
//! [`ResultStore`] that records which events have been processed. Pacing
//! between remote calls goes through the [`Pacer`] trait so callers can swap
//! real sleeps for a recording double.
//!
//! Network access and file formats live in `fairway-data`; this crate stays
//! free of I/O apart from the optional SQLite store.
#![forbid(unsafe_code)]

mod event;
pub mod pacing;
mod result;
pub mod store;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use event::{Event, year_from_date};
pub use pacing::{Pacer, ThreadPacer};
pub use result::{EventRecord, ResultRow};
pub use store::ResultStore;

#[cfg(feature = "store-sqlite")]
pub use store::{SCHEMA_VERSION, SqliteResultStore, SqliteResultStoreError};
