//! Leaderboard response parsing.
//!
//! Upstream responses are inconsistent: some tournaments nest the event list
//! one level deeper, fields go missing and scores live in different places.
//! [`parse_leaderboard`] never fails; anything it cannot read degrades to an
//! empty string, a zero year or a missing score.

mod score;

use fairway_core::{Event, ResultRow, year_from_date};
use serde_json::Value;

pub use score::{ScoreLookup, ScoreStrategy, parse_display_score, score_to_par};

/// Extract one row per competitor from a leaderboard response.
///
/// The event name and date come from the response, falling back to `event`
/// when missing or empty. Every row carries `event.id`.
///
/// # Examples
/// ```
/// use fairway_core::Event;
/// use fairway_data::leaderboard::parse_leaderboard;
/// use serde_json::json;
///
/// let raw = json!({"events": [{
///     "name": "Masters Tournament",
///     "date": "2024-04-11T07:00Z",
///     "competitions": [{"competitors": [{
///         "athlete": {"displayName": "Scottie Scheffler"},
///         "status": {"displayValue": "1"},
///         "statistics": [{"name": "scoreToPar", "displayValue": "-11"}]
///     }]}]
/// }]});
/// let event = Event::new("401580360", "", "");
///
/// let rows = parse_leaderboard(&raw, &event);
/// assert_eq!(rows[0].player_name, "Scottie Scheffler");
/// assert_eq!(rows[0].year, 2024);
/// assert_eq!(rows[0].score_to_par, Some(-11));
/// ```
#[must_use]
pub fn parse_leaderboard(raw: &Value, event: &Event) -> Vec<ResultRow> {
    let Some(details) = first_event(raw) else {
        return Vec::new();
    };
    let competitors = details
        .get("competitions")
        .and_then(Value::as_array)
        .and_then(|competitions| competitions.first())
        .and_then(|competition| competition.get("competitors"))
        .and_then(Value::as_array);
    let Some(competitors) = competitors else {
        return Vec::new();
    };

    let event_name = non_empty_str(details, "name").unwrap_or(&event.name).trim();
    let event_date = non_empty_str(details, "date").unwrap_or(&event.date);
    let year = year_from_date(event_date);

    competitors
        .iter()
        .map(|competitor| ResultRow {
            player_name: nested_str(competitor, "athlete", "displayName").to_owned(),
            event_name: event_name.to_owned(),
            year,
            score_to_par: score_to_par(competitor),
            position: nested_str(competitor, "status", "displayValue").to_owned(),
            event_id: event.id.clone(),
        })
        .collect()
}

/// First event object, unwrapping the doubly-nested `events[0][..]` shape.
fn first_event(raw: &Value) -> Option<&Value> {
    let events = raw.get("events")?.as_array()?;
    let events = match events.first()? {
        Value::Array(nested) => nested,
        _ => events,
    };
    events.first().filter(|event| event.is_object())
}

fn non_empty_str<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value
        .get(key)
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
}

fn nested_str<'a>(value: &'a Value, outer: &str, inner: &str) -> &'a str {
    value
        .get(outer)
        .and_then(|object| object.get(inner))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .trim()
}
