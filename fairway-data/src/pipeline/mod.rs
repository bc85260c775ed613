//! End-to-end harvest run.
//!
//! A run moves through [`Stage`]s in order: optional reset, load or discover
//! events, compute the events not yet scraped, scrape each of them, and
//! export. Per-event failures are logged and skipped so that one bad
//! leaderboard never stops the run; the event stays unscraped and is retried
//! next time. Only store, checkpoint and export failures abort.

use std::{collections::HashSet, fmt, time::Duration};

use camino::Utf8PathBuf;
use fairway_core::{Event, Pacer, ResultRow, ResultStore};
use thiserror::Error;

use crate::checkpoint::{CheckpointError, EventCheckpoint};
use crate::discovery::{discover_events, discovery_call_count, load_or_discover};
use crate::export::{ExportError, export_results};
use crate::fetch::{Endpoints, FetchError, JsonSource};
use crate::leaderboard::parse_leaderboard;

/// Steady-state pause between logical API calls.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(1500);

/// Season harvested when none is configured.
pub const DEFAULT_YEAR: i32 = 2025;

/// Phases of a harvest run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Clear the store before doing anything else.
    Reset,
    /// Read the checkpoint or discover events from the scoreboard.
    LoadOrDiscoverEvents,
    /// Subtract already-scraped events.
    ComputeRemaining,
    /// Fetch, parse and store each remaining event.
    ScrapeLoop,
    /// Write the CSV export.
    Export,
    /// The run finished.
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Reset => "reset",
            Self::LoadOrDiscoverEvents => "load or discover events",
            Self::ComputeRemaining => "compute remaining",
            Self::ScrapeLoop => "scrape",
            Self::Export => "export",
            Self::Done => "done",
        };
        f.write_str(label)
    }
}

/// Errors that abort a harvest run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A store operation needed by the whole run failed.
    #[error("failed to {operation}")]
    Store {
        /// What the pipeline was doing.
        operation: &'static str,
        /// Error raised by the store.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// The event checkpoint could not be read or written.
    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),
    /// The export could not be written.
    #[error(transparent)]
    Export(#[from] ExportError),
}

impl PipelineError {
    fn store<E>(operation: &'static str) -> impl FnOnce(E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        move |source| Self::Store {
            operation,
            source: Box::new(source),
        }
    }
}

/// Settings for one harvest run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOptions {
    /// Seasons to discover when no checkpoint exists.
    pub years: Vec<i32>,
    /// Clear the store (not the checkpoint) before running.
    pub reset: bool,
    /// Pause after every scoreboard query and every leaderboard fetch.
    pub delay: Duration,
    /// Remote endpoints.
    pub endpoints: Endpoints,
    /// CSV export destination.
    pub output: Utf8PathBuf,
}

impl PipelineOptions {
    /// Options with the default season, delay and no reset.
    pub fn new(endpoints: Endpoints, output: impl Into<Utf8PathBuf>) -> Self {
        Self {
            years: vec![DEFAULT_YEAR],
            reset: false,
            delay: DEFAULT_DELAY,
            endpoints,
            output: output.into(),
        }
    }

    /// Replace the seasons to discover.
    #[must_use]
    pub fn with_years(mut self, years: impl Into<Vec<i32>>) -> Self {
        self.years = years.into();
        self
    }

    /// Request a store reset before the run.
    #[must_use]
    pub const fn with_reset(mut self, reset: bool) -> Self {
        self.reset = reset;
        self
    }

    /// Replace the steady-state delay.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Counts reported at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Events in the checkpoint or found by discovery.
    pub discovered: usize,
    /// Events the store already marked as scraped when the run started.
    pub already_scraped: usize,
    /// Events attempted in this run.
    pub remaining: usize,
    /// Events fetched and stored in this run.
    pub scraped: usize,
    /// Events skipped after a fetch or store failure.
    pub skipped: usize,
    /// Rows written to the export.
    pub exported: usize,
}

/// Rough wall-clock minutes for `calls` paced by `delay`, rounded up.
#[must_use]
pub fn estimate_minutes(calls: usize, delay: Duration) -> u64 {
    let calls = u128::try_from(calls).unwrap_or(u128::MAX);
    let millis = delay.as_millis().saturating_mul(calls);
    u64::try_from(millis / 60_000)
        .unwrap_or(u64::MAX)
        .saturating_add(1)
}

/// Harvest driver over injected store, checkpoint, source and pacer.
///
/// # Examples
///
/// ```
/// use fairway_core::{SqliteResultStore, ThreadPacer};
/// use fairway_data::checkpoint::MemoryCheckpoint;
/// use fairway_data::fetch::{Endpoints, test_support::StubSource};
/// use fairway_data::pipeline::{Pipeline, PipelineOptions};
/// use std::time::Duration;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dir = tempfile::tempdir()?;
/// let output = camino::Utf8PathBuf::try_from(dir.path().join("golf_results.csv"))?;
/// let options = PipelineOptions::new(Endpoints::espn()?, output)
///     .with_years([2025])
///     .with_delay(Duration::ZERO);
///
/// let mut pipeline = Pipeline::new(
///     SqliteResultStore::open_in_memory()?,
///     MemoryCheckpoint::default(),
///     StubSource::default(),
///     ThreadPacer,
/// );
/// let summary = pipeline.run(&options)?;
///
/// assert_eq!(summary.discovered, 0);
/// assert_eq!(summary.exported, 0);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Pipeline<S, C, F, P> {
    store: S,
    checkpoint: C,
    source: F,
    pacer: P,
}

impl<S, C, F, P> Pipeline<S, C, F, P>
where
    S: ResultStore,
    C: EventCheckpoint,
    F: JsonSource,
    P: Pacer,
{
    /// Assemble a pipeline from its collaborators.
    pub const fn new(store: S, checkpoint: C, source: F, pacer: P) -> Self {
        Self {
            store,
            checkpoint,
            source,
            pacer,
        }
    }

    /// The result store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// The event checkpoint.
    pub const fn checkpoint(&self) -> &C {
        &self.checkpoint
    }

    /// The JSON source.
    pub const fn source(&self) -> &F {
        &self.source
    }

    /// The pacer.
    pub const fn pacer(&self) -> &P {
        &self.pacer
    }

    /// Run every stage once.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] when the store cannot be reset or queried,
    /// the checkpoint cannot be read or written, or the export fails.
    pub fn run(&mut self, options: &PipelineOptions) -> Result<RunSummary, PipelineError> {
        let mut summary = RunSummary::default();

        if options.reset {
            enter(Stage::Reset);
            log::info!("clearing existing data");
            self.store
                .clear()
                .map_err(PipelineError::store("reset the result store"))?;
        }

        enter(Stage::LoadOrDiscoverEvents);
        let events = self.load_or_discover_events(options)?;
        summary.discovered = events.len();

        enter(Stage::ComputeRemaining);
        let scraped = self
            .store
            .scraped_event_ids()
            .map_err(PipelineError::store("query scraped events"))?;
        let remaining = remaining_events(&events, &scraped);
        summary.already_scraped = scraped.len();
        summary.remaining = remaining.len();
        log::info!(
            "events to scrape: {} (already done: {}), est. ~{} min",
            remaining.len(),
            scraped.len(),
            estimate_minutes(remaining.len(), options.delay)
        );

        enter(Stage::ScrapeLoop);
        self.scrape_all(&remaining, options, &mut summary);

        enter(Stage::Export);
        summary.exported = export_results(&self.store, &options.output)?;

        enter(Stage::Done);
        log::info!(
            "discovered {}, scraped {}, skipped {}, exported {} rows",
            summary.discovered,
            summary.scraped,
            summary.skipped,
            summary.exported
        );
        Ok(summary)
    }

    fn load_or_discover_events(
        &mut self,
        options: &PipelineOptions,
    ) -> Result<Vec<Event>, PipelineError> {
        let source = &self.source;
        let pacer = &self.pacer;
        let events = load_or_discover(&mut self.checkpoint, || {
            let calls = discovery_call_count(&options.years);
            log::info!(
                "discovering events for {:?} (~{calls} calls, ~{} min)",
                options.years,
                estimate_minutes(calls, options.delay)
            );
            discover_events(
                source,
                &options.endpoints,
                &options.years,
                pacer,
                options.delay,
            )
        })?;
        Ok(events)
    }

    fn scrape_all(
        &mut self,
        remaining: &[&Event],
        options: &PipelineOptions,
        summary: &mut RunSummary,
    ) {
        let total = remaining.len();
        for (index, event) in remaining.iter().enumerate() {
            let position = index + 1;
            match self.scrape_event(event, &options.endpoints) {
                Ok(rows) => match self.store.record_scraped(event, &rows) {
                    Ok(()) => {
                        summary.scraped += 1;
                        log::info!(
                            "[{position}/{total}] {}: {} players",
                            event.label(),
                            rows.len()
                        );
                    }
                    Err(err) => {
                        summary.skipped += 1;
                        log::warn!("skip {}: failed to store results: {err}", event.label());
                    }
                },
                Err(err) => {
                    summary.skipped += 1;
                    log::warn!("skip {}: {err}", event.label());
                }
            }
            self.pacer.pause(options.delay);
        }
    }

    fn scrape_event(
        &self,
        event: &Event,
        endpoints: &Endpoints,
    ) -> Result<Vec<ResultRow>, FetchError> {
        let raw = self.source.fetch_json(&endpoints.leaderboard(&event.id))?;
        Ok(parse_leaderboard(&raw, event))
    }
}

/// Events not yet scraped, in discovery order, each id at most once.
fn remaining_events<'a>(events: &'a [Event], scraped: &HashSet<String>) -> Vec<&'a Event> {
    let mut seen = HashSet::new();
    events
        .iter()
        .filter(|event| !scraped.contains(&event.id) && seen.insert(event.id.as_str()))
        .collect()
}

fn enter(stage: Stage) {
    log::debug!("stage: {stage}");
}
