/// A tournament instance discovered from the scoreboard API.
///
/// Identity is the opaque `id` handed out by the source API. The `date` is an
/// ISO date (`YYYY-MM-DD`) and may be empty when the API omitted it.
///
/// # Examples
/// ```
/// use fairway_core::Event;
///
/// let event = Event::new("401580360", "Masters Tournament", "2024-04-11");
/// assert_eq!(event.id, "401580360");
/// assert_eq!(event.year(), 2024);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Event {
    /// Stable identifier from the source API.
    pub id: String,
    /// Display name of the tournament.
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: String,
    /// Start date, truncated to `YYYY-MM-DD`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub date: String,
}

impl Event {
    /// Construct an event from its identifier, name and date.
    pub fn new(id: impl Into<String>, name: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            date: date.into(),
        }
    }

    /// Season year derived from [`Event::date`], or `0` when unknown.
    #[must_use]
    pub fn year(&self) -> i32 {
        year_from_date(&self.date)
    }

    /// Human-friendly label used in progress messages.
    #[must_use]
    pub fn label(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}

/// Parse the leading four characters of `date` as a year.
///
/// Returns `0` unless the date starts with exactly four ASCII digits.
///
/// # Examples
/// ```
/// use fairway_core::year_from_date;
///
/// assert_eq!(year_from_date("2024-04-11T07:00Z"), 2024);
/// assert_eq!(year_from_date("24-04"), 0);
/// assert_eq!(year_from_date(""), 0);
/// ```
#[must_use]
pub fn year_from_date(date: &str) -> i32 {
    let prefix: String = date.chars().take(4).collect();
    if prefix.len() == 4 && prefix.chars().all(|ch| ch.is_ascii_digit()) {
        prefix.parse().unwrap_or(0)
    } else {
        0
    }
}
