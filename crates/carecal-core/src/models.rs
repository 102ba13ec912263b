use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};
use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

use crate::error::CoreError;
use crate::shift::ShiftMonth;

/// Colour used when an event's category cannot be resolved.
pub const DEFAULT_COLOR: &str = "#64748b";

/// Built-in categories: (lookup key, display label, colour).
pub const BUILTIN_CATEGORIES: [(&str, &str, &str); 4] = [
    ("monitoring", "Monitoring", "#0ea5e9"),
    ("assessment", "Assessment", "#f43f5e"),
    ("conference", "Care conference", "#8b5cf6"),
    ("other", "Other", DEFAULT_COLOR),
];

// ============================================================================
// Calendar Events
// ============================================================================

/// When an event happens. Weekly templates use the span as the anchor of the
/// first day the rule may materialize.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TimeSpan {
    Timed {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
    AllDay {
        date: NaiveDate,
    },
}

impl TimeSpan {
    pub fn timed(date: NaiveDate, start_time: NaiveTime, end_time: NaiveTime) -> Self {
        TimeSpan::Timed {
            start: date.and_time(start_time),
            end: date.and_time(end_time),
        }
    }

    /// Calendar date the span starts on
    pub fn date(&self) -> NaiveDate {
        match self {
            TimeSpan::Timed { start, .. } => start.date(),
            TimeSpan::AllDay { date } => *date,
        }
    }

    pub fn is_all_day(&self) -> bool {
        matches!(self, TimeSpan::AllDay { .. })
    }

    pub fn start_time(&self) -> Option<NaiveTime> {
        match self {
            TimeSpan::Timed { start, .. } => Some(start.time()),
            TimeSpan::AllDay { .. } => None,
        }
    }

    pub fn end_time(&self) -> Option<NaiveTime> {
        match self {
            TimeSpan::Timed { end, .. } => Some(end.time()),
            TimeSpan::AllDay { .. } => None,
        }
    }
}

/// Recurrence of a stored event. Weekdays are numbered 0 (Sunday) to 6 (Saturday).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Recurrence {
    /// A concrete single occurrence
    #[default]
    None,
    /// Indefinite template materialized on every matching weekday
    #[serde(rename_all = "camelCase")]
    Weekly {
        days_of_week: BTreeSet<u8>,
        start_time: NaiveTime,
        end_time: NaiveTime,
    },
    /// One of the eagerly generated monthly instances. A missing group id marks
    /// a legacy instance whose group was never recorded.
    #[serde(rename_all = "camelCase")]
    MonthlyExpanded {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        group_id: Option<Uuid>,
        week: u8,
        weekday: u8,
        start_time: NaiveTime,
        end_time: NaiveTime,
    },
}

impl Recurrence {
    pub fn is_recurring(&self) -> bool {
        !matches!(self, Recurrence::None)
    }

    pub fn is_weekly(&self) -> bool {
        matches!(self, Recurrence::Weekly { .. })
    }

    pub fn is_monthly(&self) -> bool {
        matches!(self, Recurrence::MonthlyExpanded { .. })
    }

    pub fn group_id(&self) -> Option<Uuid> {
        match self {
            Recurrence::MonthlyExpanded { group_id, .. } => *group_id,
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Uuid,
    /// "<client>: <category>" or the category label alone for personal entries
    pub title: String,
    /// Category label copied at save time
    pub category: String,
    /// Category colour copied at save time
    pub color: String,
    /// None marks a personal (staff-only) event
    #[serde(default)]
    pub subject_id: Option<Uuid>,
    #[serde(default)]
    pub owner_id: Option<Uuid>,
    #[serde(default)]
    pub notes: String,
    pub time_span: TimeSpan,
    #[serde(default)]
    pub recurrence: Recurrence,
    /// Dates on which a weekly rule is suppressed
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub exception_dates: BTreeSet<NaiveDate>,
    /// Last date a weekly rule may materialize on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series_end_date: Option<NaiveDate>,
}

impl Event {
    pub fn date(&self) -> NaiveDate {
        self.time_span.date()
    }

    pub fn group_id(&self) -> Option<Uuid> {
        self.recurrence.group_id()
    }

    pub fn is_recurring(&self) -> bool {
        self.recurrence.is_recurring()
    }
}

/// Target of a scoped edit or delete: the occurrence the user picked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccurrenceRef {
    /// Stored event the occurrence came from. Legacy entries may lack one.
    pub event_id: Option<Uuid>,
    pub group_id: Option<Uuid>,
    pub title: String,
    /// Calendar date of the occurrence
    pub date: NaiveDate,
}

impl OccurrenceRef {
    pub fn from_event(event: &Event, date: NaiveDate) -> Self {
        Self {
            event_id: Some(event.id),
            group_id: event.group_id(),
            title: event.title.clone(),
            date,
        }
    }

    /// Whether `event` is the stored event this occurrence belongs to: exact id,
    /// or identical title when the occurrence carries no id.
    pub fn is_parent(&self, event: &Event) -> bool {
        match self.event_id {
            Some(id) => event.id == id,
            None => event.title == self.title,
        }
    }
}

/// Scope for editing an occurrence of a recurring event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditScope {
    /// Affect only the selected occurrence
    ThisOccurrence,
    /// Modify the whole series
    EntireSeries,
}

impl std::fmt::Display for EditScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EditScope::ThisOccurrence => write!(f, "this"),
            EditScope::EntireSeries => write!(f, "all"),
        }
    }
}

impl FromStr for EditScope {
    type Err = ParseEditScopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "this" | "single" | "occurrence" => Ok(EditScope::ThisOccurrence),
            "all" | "series" | "entire" => Ok(EditScope::EntireSeries),
            _ => Err(ParseEditScopeError(s.to_string())),
        }
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid edit scope: {0}")]
pub struct ParseEditScopeError(String);

/// Scope for deleting an occurrence of a recurring event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteScope {
    ThisOccurrence,
    ThisAndFollowing,
    EntireSeries,
}

impl std::fmt::Display for DeleteScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeleteScope::ThisOccurrence => write!(f, "this"),
            DeleteScope::ThisAndFollowing => write!(f, "following"),
            DeleteScope::EntireSeries => write!(f, "all"),
        }
    }
}

impl FromStr for DeleteScope {
    type Err = ParseDeleteScopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "this" | "single" | "occurrence" => Ok(DeleteScope::ThisOccurrence),
            "following" | "future" | "this_and_following" => Ok(DeleteScope::ThisAndFollowing),
            "all" | "series" | "entire" => Ok(DeleteScope::EntireSeries),
            _ => Err(ParseDeleteScopeError(s.to_string())),
        }
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid delete scope: {0}")]
pub struct ParseDeleteScopeError(String);

// ============================================================================
// Event Save Payloads
// ============================================================================

/// Timing chosen in a save action. Missing times fall back to the category
/// defaults, then to 10:00-11:00.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventTiming {
    Single {
        start_time: Option<NaiveTime>,
        end_time: Option<NaiveTime>,
    },
    AllDay,
    Weekly {
        days_of_week: BTreeSet<u8>,
        start_time: Option<NaiveTime>,
        end_time: Option<NaiveTime>,
    },
    Monthly {
        week: u8,
        weekday: u8,
        start_time: Option<NaiveTime>,
        end_time: Option<NaiveTime>,
    },
}

impl EventTiming {
    pub fn times(&self) -> (Option<NaiveTime>, Option<NaiveTime>) {
        match self {
            EventTiming::Single { start_time, end_time }
            | EventTiming::Weekly { start_time, end_time, .. }
            | EventTiming::Monthly { start_time, end_time, .. } => (*start_time, *end_time),
            EventTiming::AllDay => (None, None),
        }
    }
}

/// Data of a save action (new event, or the edited fields of an existing one)
#[derive(Debug, Clone)]
pub struct NewEventData {
    pub subject_id: Option<Uuid>,
    pub owner_id: Option<Uuid>,
    /// Category id or name
    pub category: String,
    pub notes: String,
    /// The day the user picked
    pub date: NaiveDate,
    pub timing: EventTiming,
}

impl NewEventData {
    /// Rejects incomplete payloads before anything is written.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.category.trim().is_empty() {
            return Err(CoreError::InvalidInput("A category is required".to_string()));
        }

        if let (Some(start), Some(end)) = self.timing.times() {
            if end < start {
                return Err(CoreError::InvalidInput(format!(
                    "End time {} is before start time {}",
                    end.format("%H:%M"),
                    start.format("%H:%M")
                )));
            }
        }

        match &self.timing {
            EventTiming::Weekly { days_of_week, .. } => {
                if days_of_week.is_empty() {
                    return Err(CoreError::InvalidRecurrence(
                        "Weekly events need at least one day of the week".to_string(),
                    ));
                }
                if let Some(day) = days_of_week.iter().find(|d| **d > 6) {
                    return Err(CoreError::InvalidRecurrence(format!(
                        "Day of week {} is out of range 0-6",
                        day
                    )));
                }
            }
            EventTiming::Monthly { week, weekday, .. } => {
                if !(1..=4).contains(week) {
                    return Err(CoreError::InvalidRecurrence(format!(
                        "Week of month {} is out of range 1-4",
                        week
                    )));
                }
                if *weekday > 6 {
                    return Err(CoreError::InvalidRecurrence(format!(
                        "Weekday {} is out of range 0-6",
                        weekday
                    )));
                }
            }
            EventTiming::Single { .. } | EventTiming::AllDay => {}
        }

        Ok(())
    }
}

// ============================================================================
// Master Data
// ============================================================================

/// A schedule type ("category") from the user-managed master list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_start_time: Option<NaiveTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_end_time: Option<NaiveTime>,
}

impl Category {
    /// The built-in categories a fresh document starts with
    pub fn builtin() -> Vec<Category> {
        BUILTIN_CATEGORIES
            .iter()
            .map(|(_, name, color)| Category {
                id: Uuid::new_v4(),
                name: name.to_string(),
                color: color.to_string(),
                default_start_time: None,
                default_end_time: None,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct NewCategoryData {
    pub name: String,
    pub color: Option<String>,
    pub default_start_time: Option<NaiveTime>,
    pub default_end_time: Option<NaiveTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub address: String,
    /// e.g. "Care level 1", "Support level 2"
    #[serde(default)]
    pub care_level: String,
    #[serde(default)]
    pub care_manager_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct NewClientData {
    pub name: String,
    pub address: String,
    pub care_level: String,
    pub care_manager_id: Option<Uuid>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateClientData {
    pub name: Option<String>,
    pub address: Option<String>,
    pub care_level: Option<String>,
    pub care_manager_id: Option<Option<Uuid>>,
    pub notes: Option<Option<String>>,
}

/// Staff member who owns clients and personal events
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CareManager {
    pub id: Uuid,
    pub name: String,
}

// ============================================================================
// Months and the Persisted Document
// ============================================================================

/// A calendar month, written `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    first: NaiveDate,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self, CoreError> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|first| Self { first })
            .ok_or_else(|| CoreError::InvalidYearMonth(format!("{}-{:02}", year, month)))
    }

    /// The month containing `date`
    pub fn of(date: NaiveDate) -> Self {
        Self {
            first: date - Duration::days(date.day0() as i64),
        }
    }

    pub fn year(&self) -> i32 {
        self.first.year()
    }

    pub fn month(&self) -> u32 {
        self.first.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    pub fn last_day(&self) -> NaiveDate {
        self.days().last().unwrap_or(self.first)
    }

    /// Month `n` months after this one
    pub fn add_months(&self, n: u32) -> Option<Self> {
        self.first
            .checked_add_months(Months::new(n))
            .map(|first| Self { first })
    }

    /// Every date of the month in order
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let month = self.first.month();
        self.first.iter_days().take_while(move |d| d.month() == month)
    }

    pub fn day_count(&self) -> usize {
        self.days().count()
    }
}

impl std::fmt::Display for YearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl FromStr for YearMonth {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| CoreError::InvalidYearMonth(s.to_string()))?;
        let year: i32 = year
            .parse()
            .map_err(|_| CoreError::InvalidYearMonth(s.to_string()))?;
        let month: u32 = month
            .parse()
            .map_err(|_| CoreError::InvalidYearMonth(s.to_string()))?;
        YearMonth::new(year, month).map_err(|_| CoreError::InvalidYearMonth(s.to_string()))
    }
}

/// The whole persisted store, read and written as one JSON document.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default)]
    pub events: Vec<Event>,
    #[serde(default)]
    pub clients: Vec<Client>,
    #[serde(default)]
    pub schedule_types: Vec<Category>,
    #[serde(default)]
    pub care_managers: Vec<CareManager>,
    #[serde(default)]
    pub holidays: BTreeSet<NaiveDate>,
    /// Shift grids keyed by `YYYY-MM`
    #[serde_as(as = "BTreeMap<DisplayFromStr, _>")]
    #[serde(default)]
    pub shifts: BTreeMap<YearMonth, ShiftMonth>,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            events: Vec::new(),
            clients: Vec::new(),
            schedule_types: Category::builtin(),
            care_managers: Vec::new(),
            holidays: BTreeSet::new(),
            shifts: BTreeMap::new(),
        }
    }
}
