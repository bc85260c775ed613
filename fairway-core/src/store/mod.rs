//! Durable storage for scraped events and leaderboard rows.
//!
//! The [`ResultStore`] trait is the single write path for harvested data. Its
//! only write primitive is a keyed upsert: writing an existing key replaces
//! the whole row, so re-scraping an event converges on the latest remote data
//! instead of duplicating it.

use std::collections::HashSet;

use crate::{Event, EventRecord, ResultRow};

#[cfg(feature = "store-sqlite")]
mod schema;
#[cfg(feature = "store-sqlite")]
mod sqlite;

#[cfg(feature = "store-sqlite")]
pub use schema::{SCHEMA_VERSION, SchemaError};
#[cfg(feature = "store-sqlite")]
pub use sqlite::{SqliteResultStore, SqliteResultStoreError};

/// Keyed persistence for events and their result rows.
///
/// Events are keyed by `event_id`; rows by `(player_name, event_id)`.
/// Implementations must treat [`ResultStore::record_scraped`] as one unit of
/// recovery: either the rows and the scraped flag are both committed or
/// neither is.
///
/// # Examples
///
/// ```rust
/// # #[cfg(feature = "store-sqlite")]
/// # fn main() -> Result<(), fairway_core::SqliteResultStoreError> {
/// use fairway_core::{Event, ResultRow, ResultStore, SqliteResultStore};
///
/// let mut store = SqliteResultStore::open_in_memory()?;
/// let event = Event::new("401580360", "Masters Tournament", "2024-04-11");
/// let row = ResultRow {
///     player_name: "Scottie Scheffler".into(),
///     event_name: "Masters Tournament".into(),
///     year: 2024,
///     score_to_par: Some(-11),
///     position: "1".into(),
///     event_id: "401580360".into(),
/// };
///
/// store.record_scraped(&event, &[row])?;
/// assert!(store.scraped_event_ids()?.contains("401580360"));
/// # Ok(())
/// # }
/// # #[cfg(not(feature = "store-sqlite"))]
/// # fn main() {}
/// ```
pub trait ResultStore {
    /// Error raised by the underlying storage engine.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Insert or replace the record for one event.
    fn upsert_event(&mut self, record: &EventRecord) -> Result<(), Self::Error>;

    /// Insert or replace each row by `(player_name, event_id)`.
    fn upsert_results(&mut self, rows: &[ResultRow]) -> Result<(), Self::Error>;

    /// Persist `rows` and mark `event` as scraped in a single unit.
    ///
    /// `rows` may be empty; the event is still marked as scraped.
    fn record_scraped(&mut self, event: &Event, rows: &[ResultRow]) -> Result<(), Self::Error>;

    /// Identifiers of every event whose `scraped` flag is set.
    fn scraped_event_ids(&self) -> Result<HashSet<String>, Self::Error>;

    /// Every stored row, in no particular order.
    fn results(&self) -> Result<Vec<ResultRow>, Self::Error>;

    /// Remove every stored event and row.
    fn clear(&mut self) -> Result<(), Self::Error>;
}
