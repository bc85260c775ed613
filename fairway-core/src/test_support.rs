//! Test-only, in-memory doubles for the store and pacing seams.

use std::{
    cell::RefCell,
    collections::{BTreeMap, HashSet},
    convert::Infallible,
    time::Duration,
};

use crate::{Event, EventRecord, Pacer, ResultRow, ResultStore};

/// In-memory [`ResultStore`] with the same keyed upsert semantics as SQLite.
#[derive(Default, Debug, Clone)]
pub struct MemoryResultStore {
    events: BTreeMap<String, EventRecord>,
    rows: BTreeMap<(String, String), ResultRow>,
}

impl MemoryResultStore {
    /// Create a store in which `event_ids` are already marked as scraped.
    pub fn with_scraped<I, S>(event_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let events = event_ids
            .into_iter()
            .map(Into::into)
            .map(|event_id: String| {
                let record = EventRecord {
                    event_id: event_id.clone(),
                    event_name: String::new(),
                    year: 0,
                    scraped: true,
                };
                (event_id, record)
            })
            .collect();
        Self {
            events,
            rows: BTreeMap::new(),
        }
    }

    /// Stored record for `event_id`, if any.
    pub fn event(&self, event_id: &str) -> Option<&EventRecord> {
        self.events.get(event_id)
    }
}

impl ResultStore for MemoryResultStore {
    type Error = Infallible;

    fn upsert_event(&mut self, record: &EventRecord) -> Result<(), Self::Error> {
        self.events.insert(record.event_id.clone(), record.clone());
        Ok(())
    }

    fn upsert_results(&mut self, rows: &[ResultRow]) -> Result<(), Self::Error> {
        for row in rows {
            let key = (row.player_name.clone(), row.event_id.clone());
            self.rows.insert(key, row.clone());
        }
        Ok(())
    }

    fn record_scraped(&mut self, event: &Event, rows: &[ResultRow]) -> Result<(), Self::Error> {
        self.upsert_results(rows)?;
        self.upsert_event(&EventRecord::scraped(event, rows))
    }

    fn scraped_event_ids(&self) -> Result<HashSet<String>, Self::Error> {
        Ok(self
            .events
            .values()
            .filter(|record| record.scraped)
            .map(|record| record.event_id.clone())
            .collect())
    }

    fn results(&self) -> Result<Vec<ResultRow>, Self::Error> {
        Ok(self.rows.values().cloned().collect())
    }

    fn clear(&mut self) -> Result<(), Self::Error> {
        self.events.clear();
        self.rows.clear();
        Ok(())
    }
}

/// [`Pacer`] that records requested pauses instead of sleeping.
#[derive(Default, Debug)]
pub struct RecordingPacer {
    pauses: RefCell<Vec<Duration>>,
}

impl RecordingPacer {
    /// Every pause requested so far, in order.
    pub fn pauses(&self) -> Vec<Duration> {
        self.pauses.borrow().clone()
    }

    /// Sum of every requested pause.
    pub fn total(&self) -> Duration {
        self.pauses.borrow().iter().sum()
    }
}

impl Pacer for RecordingPacer {
    fn pause(&self, duration: Duration) {
        self.pauses.borrow_mut().push(duration);
    }
}
