//! Event discovery by weekly scoreboard queries.
//!
//! The scoreboard endpoint lists the events active on a given date. Querying
//! one date per week (every Monday) of each requested year and deduplicating
//! by id yields every tournament of those seasons.

use std::{collections::HashSet, time::Duration};

use chrono::{Datelike, Days, NaiveDate, Weekday};
use fairway_core::{Event, Pacer};
use serde_json::Value;

use crate::checkpoint::{CheckpointError, EventCheckpoint};
use crate::fetch::{Endpoints, JsonSource};

/// Every Monday of `year`, formatted as `YYYYMMDD`.
///
/// Years outside chrono's supported range yield no dates.
///
/// # Examples
/// ```
/// use fairway_data::discovery::weekly_query_dates;
///
/// let dates = weekly_query_dates(2025);
/// assert_eq!(dates.first().map(String::as_str), Some("20250106"));
/// assert_eq!(dates.len(), 52);
/// ```
#[must_use]
pub fn weekly_query_dates(year: i32) -> Vec<String> {
    let Some(first_monday) = first_monday(year) else {
        return Vec::new();
    };
    first_monday
        .iter_weeks()
        .take_while(|date| date.year() == year)
        .map(|date| date.format("%Y%m%d").to_string())
        .collect()
}

fn first_monday(year: i32) -> Option<NaiveDate> {
    let new_year = NaiveDate::from_ymd_opt(year, 1, 1)?;
    let offset = (7 - new_year.weekday().num_days_from_monday()) % 7;
    let monday = new_year.checked_add_days(Days::new(u64::from(offset)))?;
    debug_assert_eq!(monday.weekday(), Weekday::Mon);
    Some(monday)
}

/// Number of scoreboard queries a discovery over `years` will issue.
#[must_use]
pub fn discovery_call_count(years: &[i32]) -> usize {
    years.iter().map(|&year| weekly_query_dates(year).len()).sum()
}

/// Extract events from one scoreboard response.
///
/// Entries without an `id` are skipped. Numeric ids are converted to
/// strings. A missing name becomes empty and the date is cut to its first
/// ten characters (`YYYY-MM-DD`).
#[must_use]
pub fn events_from_scoreboard(response: &Value) -> Vec<Event> {
    response
        .get("events")
        .and_then(Value::as_array)
        .map(|entries| entries.iter().filter_map(event_from_entry).collect())
        .unwrap_or_default()
}

fn event_from_entry(entry: &Value) -> Option<Event> {
    let id = match entry.get("id")? {
        Value::String(id) if !id.is_empty() => id.clone(),
        Value::Number(id) => id.to_string(),
        _ => return None,
    };
    let name = entry.get("name").and_then(Value::as_str).unwrap_or_default();
    let date: String = entry
        .get("date")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .chars()
        .take(10)
        .collect();
    Some(Event::new(id, name, date))
}

/// Query the scoreboard for every week of `years` and collect unique events.
///
/// Events keep the order in which they were first seen. A failed date is
/// logged and skipped. `delay` is applied after every query, successful or
/// not.
pub fn discover_events<S, P>(
    source: &S,
    endpoints: &Endpoints,
    years: &[i32],
    pacer: &P,
    delay: Duration,
) -> Vec<Event>
where
    S: JsonSource + ?Sized,
    P: Pacer + ?Sized,
{
    let mut seen = HashSet::new();
    let mut events = Vec::new();
    for &year in years {
        for date in weekly_query_dates(year) {
            match source.fetch_json(&endpoints.scoreboard(&date)) {
                Ok(response) => {
                    for event in events_from_scoreboard(&response) {
                        if seen.insert(event.id.clone()) {
                            log::debug!("discovered {} ({})", event.label(), event.id);
                            events.push(event);
                        }
                    }
                }
                Err(err) => log::warn!("skip {date}: {err}"),
            }
            pacer.pause(delay);
        }
    }
    events
}

/// Load events from `checkpoint`, or run `discover` and save its result.
///
/// An existing checkpoint is used verbatim, even when it is empty.
///
/// # Errors
///
/// Propagates checkpoint read and write failures; both abort the run.
pub fn load_or_discover<C, F>(checkpoint: &mut C, discover: F) -> Result<Vec<Event>, CheckpointError>
where
    C: EventCheckpoint + ?Sized,
    F: FnOnce() -> Vec<Event>,
{
    if let Some(events) = checkpoint.load()? {
        log::info!("loaded {} events from checkpoint", events.len());
        return Ok(events);
    }
    let events = discover();
    checkpoint.save(&events)?;
    if events.is_empty() {
        log::warn!("discovery found no events; delete the checkpoint to search again");
    } else {
        log::info!("found {} unique events", events.len());
    }
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkpoint::MemoryCheckpoint;
    use crate::fetch::{TransportError, test_support::StubSource};
    use fairway_core::test_support::RecordingPacer;
    use rstest::{fixture, rstest};
    use serde_json::json;

    #[fixture]
    fn endpoints() -> Endpoints {
        Endpoints::espn().expect("built-in endpoints")
    }

    #[rstest]
    #[case(2024, "20240101", "20241230", 53)]
    #[case(2025, "20250106", "20251229", 52)]
    #[case(2023, "20230102", "20231225", 52)]
    fn enumerates_mondays(
        #[case] year: i32,
        #[case] first: &str,
        #[case] last: &str,
        #[case] count: usize,
    ) {
        let dates = weekly_query_dates(year);

        assert_eq!(dates.first().map(String::as_str), Some(first));
        assert_eq!(dates.last().map(String::as_str), Some(last));
        assert_eq!(dates.len(), count);
    }

    #[rstest]
    fn unsupported_years_have_no_dates() {
        assert!(weekly_query_dates(i32::MAX).is_empty());
    }

    #[rstest]
    fn counts_calls_across_years() {
        assert_eq!(discovery_call_count(&[2024, 2025]), 105);
        assert_eq!(discovery_call_count(&[]), 0);
    }

    #[rstest]
    fn scoreboard_entries_are_normalised() {
        let response = json!({
            "events": [
                {"id": "401580360", "name": "Masters Tournament", "date": "2024-04-11T07:00Z"},
                {"id": 401580361, "date": "2024-04-18"},
                {"name": "No identifier"},
                {"id": "", "name": "Empty identifier"},
                {"id": "401580362", "name": "Undated"}
            ]
        });

        assert_eq!(
            events_from_scoreboard(&response),
            vec![
                Event::new("401580360", "Masters Tournament", "2024-04-11"),
                Event::new("401580361", "", "2024-04-18"),
                Event::new("401580362", "Undated", ""),
            ]
        );
    }

    #[rstest]
    #[case(json!({}))]
    #[case(json!({"events": null}))]
    #[case(json!({"events": {"id": "1"}}))]
    fn missing_event_lists_yield_nothing(#[case] response: Value) {
        assert!(events_from_scoreboard(&response).is_empty());
    }

    #[rstest]
    fn discovery_deduplicates_and_tolerates_failed_dates(endpoints: Endpoints) {
        let source = StubSource::default()
            .with_json(
                endpoints.scoreboard("20250106"),
                json!({"events": [{"id": "1", "name": "Sentry", "date": "2025-01-02T00:00Z"}]}),
            )
            .with_json(
                endpoints.scoreboard("20250113"),
                json!({"events": [
                    {"id": "1", "name": "Sentry (renamed)"},
                    {"id": "2", "name": "Sony Open", "date": "2025-01-09"}
                ]}),
            )
            .with_failure(endpoints.scoreboard("20250120"), TransportError::RateLimited);
        let pacer = RecordingPacer::default();

        let events = discover_events(
            &source,
            &endpoints,
            &[2025],
            &pacer,
            Duration::from_millis(1500),
        );

        assert_eq!(
            events,
            vec![
                Event::new("1", "Sentry", "2025-01-02"),
                Event::new("2", "Sony Open", "2025-01-09"),
            ]
        );
        assert_eq!(source.calls().len(), 52);
        assert_eq!(pacer.pauses().len(), 52, "every date is paced");
        assert_eq!(pacer.total(), Duration::from_millis(1500 * 52));
    }

    #[rstest]
    fn existing_checkpoint_skips_discovery() {
        let saved = vec![Event::new("401580360", "Masters Tournament", "2024-04-11")];
        let mut checkpoint = MemoryCheckpoint::with_events(saved.clone());

        let events = load_or_discover(&mut checkpoint, || panic!("discovery must not run"))
            .expect("load checkpoint");

        assert_eq!(events, saved);
        assert_eq!(checkpoint.saves(), 0);
    }

    #[rstest]
    fn empty_checkpoint_is_used_verbatim() {
        let mut checkpoint = MemoryCheckpoint::with_events(Vec::new());

        let events = load_or_discover(&mut checkpoint, || panic!("discovery must not run"))
            .expect("load checkpoint");

        assert!(events.is_empty());
    }

    #[rstest]
    fn missing_checkpoint_runs_discovery_and_saves() {
        let mut checkpoint = MemoryCheckpoint::default();
        let discovered = vec![Event::new("1", "Sentry", "2025-01-02")];

        let events = load_or_discover(&mut checkpoint, || discovered.clone()).expect("discover");

        assert_eq!(events, discovered);
        assert_eq!(checkpoint.saves(), 1);
        assert_eq!(checkpoint.events(), Some(discovered.as_slice()));
    }

    #[rstest]
    fn fruitless_discovery_is_saved_and_reused(endpoints: Endpoints) {
        let source = StubSource::default();
        let pacer = RecordingPacer::default();
        let mut checkpoint = MemoryCheckpoint::default();

        let events = load_or_discover(&mut checkpoint, || {
            discover_events(&source, &endpoints, &[2025], &pacer, Duration::ZERO)
        })
        .expect("discover");
        let reloaded = load_or_discover(&mut checkpoint, || panic!("discovery must not rerun"))
            .expect("reload checkpoint");

        assert!(events.is_empty());
        assert!(reloaded.is_empty());
        assert_eq!(checkpoint.saves(), 1);
        assert_eq!(checkpoint.events(), Some([].as_slice()));
    }
}
