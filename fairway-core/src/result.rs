//! Normalised leaderboard rows and the per-event scrape record.

use crate::Event;

/// One player's standing in one event.
///
/// Identity is `(player_name, event_id)`; writing the same key again replaces
/// the stored row. `score_to_par` is `None` for withdrawn, cut or disqualified
/// players whose score could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResultRow {
    /// Player display name, trimmed.
    pub player_name: String,
    /// Tournament name, trimmed.
    pub event_name: String,
    /// Season year, `0` when unknown.
    pub year: i32,
    /// Score relative to par; `0` is even.
    pub score_to_par: Option<i32>,
    /// Position or status label such as `T5` or `CUT`.
    pub position: String,
    /// Identifier of the owning [`Event`].
    pub event_id: String,
}

impl ResultRow {
    /// Whether the row carries a parsed score and therefore appears in exports.
    #[must_use]
    pub const fn has_score(&self) -> bool {
        self.score_to_par.is_some()
    }
}

/// Durable record that an event has been processed.
///
/// The `scraped` flag is explicit: an event that legitimately produced no rows
/// (for example a cancelled tournament) is still recorded as scraped.
///
/// # Examples
/// ```
/// use fairway_core::{Event, EventRecord};
///
/// let event = Event::new("401", "Cancelled Open", "2020-03-19");
/// let record = EventRecord::scraped(&event, &[]);
/// assert_eq!(record.event_name, "Cancelled Open");
/// assert_eq!(record.year, 2020);
/// assert!(record.scraped);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    /// Identifier of the recorded event.
    pub event_id: String,
    /// Tournament name as stored alongside the rows.
    pub event_name: String,
    /// Season year.
    pub year: i32,
    /// Whether the event's leaderboard has been fully processed.
    pub scraped: bool,
}

impl EventRecord {
    /// Build the scraped record for `event` given the rows parsed from it.
    ///
    /// Name and year come from the first row when present, otherwise from
    /// the discovered event.
    #[must_use]
    pub fn scraped(event: &Event, rows: &[ResultRow]) -> Self {
        let (event_name, year) = rows.first().map_or_else(
            || (event.name.trim().to_owned(), event.year()),
            |row| (row.event_name.clone(), row.year),
        );
        Self {
            event_id: event.id.clone(),
            event_name,
            year,
            scraped: true,
        }
    }
}
