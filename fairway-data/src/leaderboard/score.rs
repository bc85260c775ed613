//! Score-to-par extraction.
//!
//! Competitors report their score in more than one place. Each location is a
//! [`ScoreStrategy`]; strategies are consulted in [`ScoreStrategy::ORDER`] and
//! the first one that finds its field decides the result, even when that
//! field holds no usable score.

use serde_json::Value;

/// Result of asking one strategy for a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreLookup {
    /// The field exists and holds a score.
    Score(i32),
    /// The field exists but holds no usable score; later strategies are
    /// not consulted.
    NoScore,
    /// The field is absent; try the next strategy.
    NotPresent,
}

/// A place where a competitor's score to par may be reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreStrategy {
    /// `statistics[]` entry named `scoreToPar`.
    StatisticScoreToPar,
    /// `score.displayValue`, when numeric.
    ScoreDisplayValue,
}

impl ScoreStrategy {
    /// Strategies in the order they are consulted.
    pub const ORDER: [Self; 2] = [Self::StatisticScoreToPar, Self::ScoreDisplayValue];

    /// Stable name used in trace logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::StatisticScoreToPar => "statistic-score-to-par",
            Self::ScoreDisplayValue => "score-display-value",
        }
    }

    /// Look for a score in `competitor`.
    #[must_use]
    pub fn lookup(self, competitor: &Value) -> ScoreLookup {
        match self {
            Self::StatisticScoreToPar => statistic_score_to_par(competitor),
            Self::ScoreDisplayValue => score_display_value(competitor),
        }
    }
}

/// Resolve a competitor's score to par through [`ScoreStrategy::ORDER`].
///
/// # Examples
/// ```
/// use fairway_data::leaderboard::score_to_par;
/// use serde_json::json;
///
/// let even = json!({"statistics": [{"name": "scoreToPar", "displayValue": "E"}]});
/// assert_eq!(score_to_par(&even), Some(0));
///
/// let fallback = json!({"score": {"displayValue": -4}});
/// assert_eq!(score_to_par(&fallback), Some(-4));
/// ```
#[must_use]
pub fn score_to_par(competitor: &Value) -> Option<i32> {
    for strategy in ScoreStrategy::ORDER {
        match strategy.lookup(competitor) {
            ScoreLookup::Score(score) => {
                log::trace!("score {score} from {}", strategy.name());
                return Some(score);
            }
            ScoreLookup::NoScore => return None,
            ScoreLookup::NotPresent => {}
        }
    }
    None
}

/// Interpret a display string such as `"E"`, `"-5"` or `"+2"`.
///
/// Surrounding whitespace is ignored. `"E"` and `"EVEN"` (any case) mean
/// zero; empty or non-numeric text has no score.
#[must_use]
pub fn parse_display_score(raw: &str) -> Option<i32> {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("E") || trimmed.eq_ignore_ascii_case("EVEN") {
        return Some(0);
    }
    trimmed.parse().ok()
}

fn statistic_score_to_par(competitor: &Value) -> ScoreLookup {
    let Some(statistic) = competitor
        .get("statistics")
        .and_then(Value::as_array)
        .and_then(|stats| {
            stats
                .iter()
                .find(|stat| stat.get("name").and_then(Value::as_str) == Some("scoreToPar"))
        })
    else {
        return ScoreLookup::NotPresent;
    };
    let score = match statistic.get("displayValue") {
        Some(Value::String(raw)) => parse_display_score(raw),
        Some(number @ Value::Number(_)) => truncate_number(number),
        _ => None,
    };
    score.map_or(ScoreLookup::NoScore, ScoreLookup::Score)
}

fn score_display_value(competitor: &Value) -> ScoreLookup {
    let score = match competitor.get("score").and_then(|score| score.get("displayValue")) {
        Some(Value::String(raw)) => parse_display_score(raw),
        Some(number @ Value::Number(_)) => truncate_number(number),
        _ => None,
    };
    score.map_or(ScoreLookup::NotPresent, ScoreLookup::Score)
}

fn truncate_number(number: &Value) -> Option<i32> {
    if let Some(integer) = number.as_i64() {
        return i32::try_from(integer).ok();
    }
    let float = number.as_f64()?.trunc();
    if float.is_finite() && float >= f64::from(i32::MIN) && float <= f64::from(i32::MAX) {
        Some(float as i32)
    } else {
        None
    }
}
