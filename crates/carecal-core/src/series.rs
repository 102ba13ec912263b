//! Save, edit and delete actions on stored events.
//!
//! Every action takes the current event list and returns the next one. An
//! action whose target cannot be found returns the list unchanged.

use chrono::{NaiveDate, NaiveTime};
use tracing::debug;
use uuid::Uuid;

use crate::error::CoreError;
use crate::models::{
    Category, Client, DeleteScope, EditScope, Event, EventTiming, NewEventData, OccurrenceRef,
    Recurrence, TimeSpan, YearMonth, BUILTIN_CATEGORIES, DEFAULT_COLOR,
};
use crate::recurrence::MonthlyRule;

/// A category resolved for display and storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCategory {
    pub label: String,
    pub color: String,
    pub default_start_time: Option<NaiveTime>,
    pub default_end_time: Option<NaiveTime>,
}

/// Master data an action needs to derive titles and colours.
#[derive(Debug, Clone, Copy)]
pub struct Catalog<'a> {
    categories: &'a [Category],
    clients: &'a [Client],
}

impl<'a> Catalog<'a> {
    pub fn new(categories: &'a [Category], clients: &'a [Client]) -> Self {
        Self { categories, clients }
    }

    /// Looks `key` up by category id, then name, then the built-in list.
    /// Unknown keys keep their text as the label with the default colour.
    pub fn resolve_category(&self, key: &str) -> ResolvedCategory {
        let key = key.trim();
        if let Some(category) = self
            .categories
            .iter()
            .find(|c| c.id.to_string() == key)
            .or_else(|| self.categories.iter().find(|c| c.name.eq_ignore_ascii_case(key)))
        {
            return ResolvedCategory {
                label: category.name.clone(),
                color: category.color.clone(),
                default_start_time: category.default_start_time,
                default_end_time: category.default_end_time,
            };
        }

        let builtin = BUILTIN_CATEGORIES
            .iter()
            .find(|(id, label, _)| id.eq_ignore_ascii_case(key) || label.eq_ignore_ascii_case(key));
        match builtin {
            Some((_, label, color)) => ResolvedCategory {
                label: label.to_string(),
                color: color.to_string(),
                default_start_time: None,
                default_end_time: None,
            },
            None => ResolvedCategory {
                label: key.to_string(),
                color: DEFAULT_COLOR.to_string(),
                default_start_time: None,
                default_end_time: None,
            },
        }
    }

    pub fn client(&self, id: Uuid) -> Option<&'a Client> {
        self.clients.iter().find(|c| c.id == id)
    }

    /// "<client name>: <label>", or the label alone for personal events
    pub fn title_for(&self, subject_id: Option<Uuid>, label: &str) -> Result<String, CoreError> {
        match subject_id {
            None => Ok(label.to_string()),
            Some(id) => self
                .client(id)
                .map(|client| format!("{}: {}", client.name, label))
                .ok_or_else(|| CoreError::InvalidInput(format!("Client {} does not exist", id))),
        }
    }

    /// Client name for display, falling back to the raw id of a removed client
    pub fn display_subject(&self, subject_id: Option<Uuid>) -> Option<String> {
        subject_id.map(|id| {
            self.client(id)
                .map(|c| c.name.clone())
                .unwrap_or_else(|| id.to_string())
        })
    }
}

/// Fields shared by every event a save action creates
struct Draft {
    title: String,
    category: String,
    color: String,
    subject_id: Option<Uuid>,
    owner_id: Option<Uuid>,
    notes: String,
    start_time: NaiveTime,
    end_time: NaiveTime,
}

impl Draft {
    fn new(data: &NewEventData, catalog: &Catalog<'_>) -> Result<Self, CoreError> {
        let category = catalog.resolve_category(&data.category);
        let title = catalog.title_for(data.subject_id, &category.label)?;
        let (start_time, end_time) = data.timing.times();
        let start_time = start_time
            .or(category.default_start_time)
            .unwrap_or_else(default_start_time);
        let end_time = end_time
            .or(category.default_end_time)
            .unwrap_or_else(default_end_time);

        // Defaults can still invert a half-specified span
        if !matches!(data.timing, EventTiming::AllDay) && end_time < start_time {
            return Err(CoreError::InvalidInput(format!(
                "End time {} is before start time {}",
                end_time.format("%H:%M"),
                start_time.format("%H:%M")
            )));
        }

        Ok(Self {
            title,
            subject_id: data.subject_id,
            owner_id: data.owner_id,
            notes: data.notes.clone(),
            start_time,
            end_time,
            category: category.label,
            color: category.color,
        })
    }

    fn event(&self, time_span: TimeSpan, recurrence: Recurrence) -> Event {
        Event {
            id: Uuid::new_v4(),
            title: self.title.clone(),
            category: self.category.clone(),
            color: self.color.clone(),
            subject_id: self.subject_id,
            owner_id: self.owner_id,
            notes: self.notes.clone(),
            time_span,
            recurrence,
            exception_dates: Default::default(),
            series_end_date: None,
        }
    }

    /// Copies the descriptive fields onto an existing event
    fn apply_to(&self, event: &mut Event) {
        event.title = self.title.clone();
        event.category = self.category.clone();
        event.color = self.color.clone();
        event.subject_id = self.subject_id;
        event.owner_id = self.owner_id;
        event.notes = self.notes.clone();
    }
}

fn default_start_time() -> NaiveTime {
    NaiveTime::from_hms_opt(10, 0, 0).unwrap_or_default()
}

fn default_end_time() -> NaiveTime {
    NaiveTime::from_hms_opt(11, 0, 0).unwrap_or_default()
}

/// Events a save action creates: one concrete event, one weekly template, or
/// twelve monthly instances starting at `start_month` under a fresh group id.
pub fn build_events(data: &NewEventData, catalog: &Catalog<'_>, start_month: YearMonth) -> Result<Vec<Event>, CoreError> {
    data.validate()?;
    let draft = Draft::new(data, catalog)?;

    let events = match &data.timing {
        EventTiming::Single { .. } => vec![draft.event(
            TimeSpan::timed(data.date, draft.start_time, draft.end_time),
            Recurrence::None,
        )],
        EventTiming::AllDay => vec![draft.event(TimeSpan::AllDay { date: data.date }, Recurrence::None)],
        EventTiming::Weekly { days_of_week, .. } => vec![draft.event(
            TimeSpan::timed(data.date, draft.start_time, draft.end_time),
            Recurrence::Weekly {
                days_of_week: days_of_week.clone(),
                start_time: draft.start_time,
                end_time: draft.end_time,
            },
        )],
        EventTiming::Monthly { week, weekday, .. } => {
            let rule = MonthlyRule::new(*week, *weekday, draft.start_time, draft.end_time)?;
            let template = draft.event(
                TimeSpan::timed(data.date, draft.start_time, draft.end_time),
                Recurrence::None,
            );
            rule.expand(&template, start_month, Uuid::new_v4())?
        }
    };

    debug!(count = events.len(), title = %draft.title, "Built events from save action");
    Ok(events)
}

/// The same payload pinned to one date as a concrete event
fn single_on(data: &NewEventData, date: NaiveDate) -> NewEventData {
    let (start_time, end_time) = data.timing.times();
    let timing = match data.timing {
        EventTiming::AllDay => EventTiming::AllDay,
        _ => EventTiming::Single { start_time, end_time },
    };
    NewEventData {
        date,
        timing,
        ..data.clone()
    }
}

/// Applies an edit to the occurrence `target` under `scope`.
///
/// Editing one occurrence of a weekly template suppresses that date on the
/// template and adds a concrete replacement. Editing a whole monthly group
/// replaces it, and any ungrouped legacy instances with the same title and
/// owner, by twelve fresh instances starting at the month of `today`.
pub fn edit_occurrence(
    mut events: Vec<Event>,
    target: &OccurrenceRef,
    data: &NewEventData,
    catalog: &Catalog<'_>,
    scope: EditScope,
    today: NaiveDate,
) -> Result<Vec<Event>, CoreError> {
    data.validate()?;

    let Some(index) = events.iter().position(|e| target.is_parent(e)) else {
        debug!(title = %target.title, "Edit target not found, nothing changed");
        return Ok(events);
    };
    let parent = events[index].clone();
    let draft = Draft::new(data, catalog)?;

    match (&parent.recurrence, scope) {
        (Recurrence::Weekly { .. }, EditScope::ThisOccurrence) => {
            let replacement = build_events(&single_on(data, target.date), catalog, YearMonth::of(target.date))?;
            events[index].exception_dates.insert(target.date);
            events.extend(replacement);
        }
        (Recurrence::Weekly { days_of_week, .. }, EditScope::EntireSeries) => {
            let days_of_week = match &data.timing {
                EventTiming::Weekly { days_of_week, .. } => days_of_week.clone(),
                _ => days_of_week.clone(),
            };
            let event = &mut events[index];
            draft.apply_to(event);
            event.recurrence = Recurrence::Weekly {
                days_of_week,
                start_time: draft.start_time,
                end_time: draft.end_time,
            };
            if !event.time_span.is_all_day() {
                event.time_span = TimeSpan::timed(event.date(), draft.start_time, draft.end_time);
            }
        }
        (Recurrence::MonthlyExpanded { .. }, EditScope::ThisOccurrence) => {
            let event = &mut events[index];
            draft.apply_to(event);
            event.time_span = match data.timing {
                EventTiming::AllDay => TimeSpan::AllDay { date: event.date() },
                _ => TimeSpan::timed(event.date(), draft.start_time, draft.end_time),
            };
        }
        (Recurrence::MonthlyExpanded { group_id, .. }, EditScope::EntireSeries) => {
            let rule = match data.timing {
                EventTiming::Monthly { week, weekday, .. } => {
                    MonthlyRule::new(week, weekday, draft.start_time, draft.end_time)?
                }
                _ => {
                    let current = MonthlyRule::of_event(&parent)
                        .unwrap_or_else(|| MonthlyRule::for_date(parent.date(), draft.start_time, draft.end_time));
                    MonthlyRule {
                        start_time: draft.start_time,
                        end_time: draft.end_time,
                        ..current
                    }
                }
            };

            let old_group = *group_id;
            events.retain(|e| !in_monthly_group(e, &parent, old_group));

            let template = draft.event(TimeSpan::timed(parent.date(), rule.start_time, rule.end_time), Recurrence::None);
            let regenerated = rule.expand(&template, YearMonth::of(today), Uuid::new_v4())?;
            debug!(
                old_group = ?old_group,
                count = regenerated.len(),
                "Regenerated monthly group"
            );
            events.extend(regenerated);
        }
        (Recurrence::None, _) => {
            let mut rebuilt = build_events(data, catalog, YearMonth::of(data.date))?;
            if let [single] = rebuilt.as_mut_slice() {
                single.id = parent.id;
            }
            events.remove(index);
            events.extend(rebuilt);
        }
    }

    Ok(events)
}

/// Whether `event` belongs to the monthly group being replaced: the same group
/// id, the parent itself, or an ungrouped monthly instance with the parent's
/// title and owner.
fn in_monthly_group(event: &Event, parent: &Event, group_id: Option<Uuid>) -> bool {
    if event.id == parent.id {
        return true;
    }
    match (group_id, event.group_id()) {
        (Some(old), Some(current)) if old == current => true,
        _ => {
            event.recurrence.is_monthly()
                && event.group_id().is_none()
                && event.title == parent.title
                && event.owner_id == parent.owner_id
        }
    }
}

/// Applies a delete to the occurrence `target` under `scope`.
pub fn delete_occurrence(mut events: Vec<Event>, target: &OccurrenceRef, scope: DeleteScope) -> Vec<Event> {
    let before = events.len();
    match scope {
        DeleteScope::ThisOccurrence => {
            match events.iter().position(|e| target.is_parent(e)) {
                Some(index) if events[index].recurrence.is_weekly() => {
                    events[index].exception_dates.insert(target.date);
                }
                Some(index) => {
                    events.remove(index);
                }
                None => {}
            }
        }
        DeleteScope::ThisAndFollowing => {
            if let Some(group_id) = target.group_id {
                events.retain(|e| !(e.group_id() == Some(group_id) && e.date() >= target.date));
            } else if let Some(index) = events.iter().position(|e| target.is_parent(e)) {
                if events[index].recurrence.is_weekly() {
                    events[index].series_end_date = target.date.pred_opt();
                } else {
                    events.remove(index);
                }
            }
        }
        DeleteScope::EntireSeries => {
            events.retain(|e| {
                let same_group = target.group_id.is_some() && e.group_id() == target.group_id;
                let same_id = target.event_id == Some(e.id);
                let same_title =
                    target.event_id.is_none() && target.group_id.is_none() && e.title == target.title;
                !(same_group || same_id || same_title)
            });
        }
    }
    debug!(
        scope = %scope,
        removed = before.saturating_sub(events.len()),
        "Applied delete"
    );
    events
}
