use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Weekday};
use uuid::Uuid;

use crate::error::CoreError;
use crate::models::{Event, OccurrenceRef, Recurrence, TimeSpan, YearMonth};

/// Number of instances generated for a monthly pattern
pub const MONTHLY_INSTANCE_COUNT: u32 = 12;

/// Highest week-of-month a monthly pattern may name
pub const MAX_WEEK_OF_MONTH: u8 = 4;

/// Weekday for an index where 0 is Sunday and 6 is Saturday
#[inline]
pub fn weekday_from_index(index: u8) -> Option<Weekday> {
    match index {
        0 => Some(Weekday::Sun),
        1 => Some(Weekday::Mon),
        2 => Some(Weekday::Tue),
        3 => Some(Weekday::Wed),
        4 => Some(Weekday::Thu),
        5 => Some(Weekday::Fri),
        6 => Some(Weekday::Sat),
        _ => None,
    }
}

#[inline]
pub fn weekday_index(weekday: Weekday) -> u8 {
    weekday.num_days_from_sunday() as u8
}

/// The `week`-th `weekday` of a month. When that date would fall into the next
/// month, the last earlier occurrence that fits is returned instead.
pub fn nth_weekday_of_month(month: YearMonth, week: u8, weekday: u8) -> Result<NaiveDate, CoreError> {
    let target = weekday_from_index(weekday)
        .ok_or_else(|| CoreError::InvalidRecurrence(format!("Weekday {} is out of range 0-6", weekday)))?;
    if week == 0 {
        return Err(CoreError::InvalidRecurrence("Week of month starts at 1".to_string()));
    }

    let first = month.first_day();
    let offset = (7 + target.num_days_from_sunday() - first.weekday().num_days_from_sunday()) % 7;
    let first_match = first + Duration::days(offset as i64);

    // Every month holds at least four of each weekday, so this terminates by week 4.
    let mut n = week.min(5);
    loop {
        let candidate = first_match + Duration::weeks((n - 1) as i64);
        if candidate.month() == first.month() || n == 1 {
            return Ok(candidate);
        }
        n -= 1;
    }
}

/// Inclusive range of calendar dates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self, CoreError> {
        if to < from {
            return Err(CoreError::InvalidInput(format!(
                "Range end {} is before its start {}",
                to, from
            )));
        }
        Ok(Self { from, to })
    }

    /// The whole of one calendar month
    pub fn month(month: YearMonth) -> Self {
        Self {
            from: month.first_day(),
            to: month.last_day(),
        }
    }

    #[inline]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }
}

/// The "Nth weekday of the month" pattern behind a monthly group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthlyRule {
    pub week: u8,
    pub weekday: u8,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

impl MonthlyRule {
    pub fn new(week: u8, weekday: u8, start_time: NaiveTime, end_time: NaiveTime) -> Result<Self, CoreError> {
        if !(1..=MAX_WEEK_OF_MONTH).contains(&week) {
            return Err(CoreError::InvalidRecurrence(format!(
                "Week of month {} is out of range 1-{}",
                week, MAX_WEEK_OF_MONTH
            )));
        }
        if weekday_from_index(weekday).is_none() {
            return Err(CoreError::InvalidRecurrence(format!(
                "Weekday {} is out of range 0-6",
                weekday
            )));
        }
        Ok(Self {
            week,
            weekday,
            start_time,
            end_time,
        })
    }

    /// Pattern a picked date belongs to: its weekday and ceil(day / 7), capped at 4.
    pub fn for_date(date: NaiveDate, start_time: NaiveTime, end_time: NaiveTime) -> Self {
        let week = ((date.day() + 6) / 7).min(MAX_WEEK_OF_MONTH as u32) as u8;
        Self {
            week,
            weekday: weekday_index(date.weekday()),
            start_time,
            end_time,
        }
    }

    /// Rule of a stored monthly instance
    pub fn of_event(event: &Event) -> Option<Self> {
        match event.recurrence {
            Recurrence::MonthlyExpanded {
                week,
                weekday,
                start_time,
                end_time,
                ..
            } => Some(Self {
                week,
                weekday,
                start_time,
                end_time,
            }),
            _ => None,
        }
    }

    /// Dates of the twelve consecutive months starting at `start`
    pub fn dates(&self, start: YearMonth) -> Result<Vec<NaiveDate>, CoreError> {
        (0..MONTHLY_INSTANCE_COUNT)
            .map(|i| {
                let month = start
                    .add_months(i)
                    .ok_or_else(|| CoreError::InvalidRecurrence(format!("Month {} + {} is out of range", start, i)))?;
                nth_weekday_of_month(month, self.week, self.weekday)
            })
            .collect()
    }

    /// Materializes the group: one concrete event per month, all sharing
    /// `group_id` and copying every other field from `template`.
    pub fn expand(&self, template: &Event, start: YearMonth, group_id: Uuid) -> Result<Vec<Event>, CoreError> {
        let events = self
            .dates(start)?
            .into_iter()
            .map(|date| Event {
                id: Uuid::new_v4(),
                time_span: TimeSpan::timed(date, self.start_time, self.end_time),
                recurrence: Recurrence::MonthlyExpanded {
                    group_id: Some(group_id),
                    week: self.week,
                    weekday: self.weekday,
                    start_time: self.start_time,
                    end_time: self.end_time,
                },
                exception_dates: Default::default(),
                series_end_date: None,
                ..template.clone()
            })
            .collect();
        Ok(events)
    }
}

/// Dates a weekly template materializes on within `range`: from its anchor
/// date, through its series end, on its weekdays, minus its exception dates.
/// Yields nothing for non-weekly events.
pub fn weekly_dates(event: &Event, range: DateRange) -> impl Iterator<Item = NaiveDate> + '_ {
    let days = match &event.recurrence {
        Recurrence::Weekly { days_of_week, .. } => Some(days_of_week),
        _ => None,
    };
    let from = range.from.max(event.date());
    let to = event
        .series_end_date
        .map_or(range.to, |end| end.min(range.to));

    from.iter_days()
        .take_while(move |d| days.is_some() && *d <= to)
        .filter(move |d| days.map_or(false, |set| set.contains(&weekday_index(d.weekday()))))
        .filter(move |d| !event.exception_dates.contains(d))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OccurrenceKind {
    Single,
    Weekly,
    Monthly,
}

/// One visible entry on the calendar
#[derive(Debug, Clone, PartialEq)]
pub struct Occurrence {
    pub event_id: Uuid,
    pub group_id: Option<Uuid>,
    pub title: String,
    pub category: String,
    pub color: String,
    pub subject_id: Option<Uuid>,
    pub owner_id: Option<Uuid>,
    pub notes: String,
    pub time_span: TimeSpan,
    pub kind: OccurrenceKind,
}

impl Occurrence {
    #[inline]
    pub fn date(&self) -> NaiveDate {
        self.time_span.date()
    }

    /// Reference used to address this occurrence in a scoped edit or delete
    pub fn target(&self) -> OccurrenceRef {
        OccurrenceRef {
            event_id: Some(self.event_id),
            group_id: self.group_id,
            title: self.title.clone(),
            date: self.date(),
        }
    }

    fn from_event(event: &Event, time_span: TimeSpan, kind: OccurrenceKind) -> Self {
        Self {
            event_id: event.id,
            group_id: event.group_id(),
            title: event.title.clone(),
            category: event.category.clone(),
            color: event.color.clone(),
            subject_id: event.subject_id,
            owner_id: event.owner_id,
            notes: event.notes.clone(),
            time_span,
            kind,
        }
    }
}

/// Lazily expands stored events into the occurrences visible in `range`.
/// Concrete events yield themselves; weekly templates yield one occurrence per
/// matching date with the rule's current times.
pub fn occurrences<'a>(events: &'a [Event], range: DateRange) -> impl Iterator<Item = Occurrence> + 'a {
    events.iter().flat_map(move |event: &'a Event| -> Box<dyn Iterator<Item = Occurrence> + 'a> {
        match &event.recurrence {
            Recurrence::Weekly {
                start_time, end_time, ..
            } => {
                let (start_time, end_time) = (*start_time, *end_time);
                let all_day = event.time_span.is_all_day();
                Box::new(weekly_dates(event, range).map(move |date| {
                    let span = if all_day {
                        TimeSpan::AllDay { date }
                    } else {
                        TimeSpan::timed(date, start_time, end_time)
                    };
                    Occurrence::from_event(event, span, OccurrenceKind::Weekly)
                }))
            }
            recurrence => {
                let date = event.date();
                let visible = range.contains(date) && !event.exception_dates.contains(&date);
                let kind = if recurrence.is_monthly() {
                    OccurrenceKind::Monthly
                } else {
                    OccurrenceKind::Single
                };
                Box::new(
                    visible
                        .then(|| Occurrence::from_event(event, event.time_span.clone(), kind))
                        .into_iter(),
                )
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::BTreeSet;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn ym(s: &str) -> YearMonth {
        s.parse().unwrap()
    }

    fn weekly_event(anchor: NaiveDate, days: &[u8]) -> Event {
        Event {
            id: Uuid::new_v4(),
            title: "Team meeting".to_string(),
            category: "Other".to_string(),
            color: "#64748b".to_string(),
            subject_id: None,
            owner_id: None,
            notes: String::new(),
            time_span: TimeSpan::timed(anchor, time(9, 0), time(10, 0)),
            recurrence: Recurrence::Weekly {
                days_of_week: days.iter().copied().collect::<BTreeSet<u8>>(),
                start_time: time(9, 0),
                end_time: time(10, 0),
            },
            exception_dates: BTreeSet::new(),
            series_end_date: None,
        }
    }

    mod nth_weekday_tests {
        use super::*;

        #[rstest]
        #[case("2026-02", 1, 2, date(2026, 2, 3))]
        #[case("2026-02", 4, 2, date(2026, 2, 24))]
        #[case("2026-03", 1, 0, date(2026, 3, 1))]
        #[case("2026-03", 2, 6, date(2026, 3, 14))]
        #[case("2025-12", 4, 3, date(2025, 12, 24))]
        fn test_nth_weekday(#[case] month: &str, #[case] week: u8, #[case] weekday: u8, #[case] expected: NaiveDate) {
            assert_eq!(nth_weekday_of_month(ym(month), week, weekday).unwrap(), expected);
        }

        #[test]
        fn test_fifth_week_falls_back_to_fourth() {
            // February 2026 has only four Mondays
            assert_eq!(nth_weekday_of_month(ym("2026-02"), 5, 1).unwrap(), date(2026, 2, 23));
            // March 2026 has five Mondays
            assert_eq!(nth_weekday_of_month(ym("2026-03"), 5, 1).unwrap(), date(2026, 3, 30));
        }

        #[test]
        fn test_invalid_arguments() {
            assert!(nth_weekday_of_month(ym("2026-02"), 1, 7).is_err());
            assert!(nth_weekday_of_month(ym("2026-02"), 0, 1).is_err());
        }
    }

    mod monthly_rule_tests {
        use super::*;

        #[rstest]
        #[case(date(2026, 2, 3), 1, 2)]
        #[case(date(2026, 2, 7), 1, 6)]
        #[case(date(2026, 2, 8), 2, 0)]
        #[case(date(2026, 3, 31), 4, 2)]
        fn test_for_date(#[case] picked: NaiveDate, #[case] week: u8, #[case] weekday: u8) {
            let rule = MonthlyRule::for_date(picked, time(10, 0), time(11, 0));
            assert_eq!(rule.week, week);
            assert_eq!(rule.weekday, weekday);
        }

        #[test]
        fn test_new_rejects_out_of_range() {
            assert!(MonthlyRule::new(5, 1, time(10, 0), time(11, 0)).is_err());
            assert!(MonthlyRule::new(0, 1, time(10, 0), time(11, 0)).is_err());
            assert!(MonthlyRule::new(2, 7, time(10, 0), time(11, 0)).is_err());
        }

        #[test]
        fn test_expand_first_tuesday() {
            let rule = MonthlyRule::new(1, 2, time(10, 0), time(11, 0)).unwrap();
            let template = weekly_event(date(2026, 2, 3), &[2]);
            let group = Uuid::new_v4();
            let events = rule.expand(&template, ym("2026-02"), group).unwrap();

            assert_eq!(events.len(), 12);
            assert_eq!(events[0].date(), date(2026, 2, 3));
            assert_eq!(events[1].date(), date(2026, 3, 3));
            assert_eq!(events[11].date(), date(2027, 1, 5));

            let ids: BTreeSet<Uuid> = events.iter().map(|e| e.id).collect();
            assert_eq!(ids.len(), 12);
            for event in &events {
                assert_eq!(event.group_id(), Some(group));
                assert_eq!(event.date().weekday(), Weekday::Tue);
                assert!(event.date().day() <= 7);
                assert_eq!(event.title, template.title);
                assert_eq!(event.time_span.start_time(), Some(time(10, 0)));
            }
        }

        #[test]
        fn test_of_event() {
            let rule = MonthlyRule::new(3, 4, time(13, 0), time(14, 0)).unwrap();
            let template = weekly_event(date(2026, 2, 3), &[2]);
            let events = rule.expand(&template, ym("2026-02"), Uuid::new_v4()).unwrap();
            assert_eq!(MonthlyRule::of_event(&events[0]), Some(rule));
            assert_eq!(MonthlyRule::of_event(&template), None);
        }
    }

    mod weekly_tests {
        use super::*;

        #[test]
        fn test_weekly_dates_in_month() {
            let event = weekly_event(date(2026, 2, 1), &[1, 3]);
            let dates: Vec<_> = weekly_dates(&event, DateRange::month(ym("2026-02"))).collect();
            assert_eq!(dates.len(), 8);
            assert!(dates.iter().all(|d| matches!(d.weekday(), Weekday::Mon | Weekday::Wed)));
        }

        #[test]
        fn test_weekly_dates_respect_anchor_end_and_exceptions() {
            let mut event = weekly_event(date(2026, 2, 10), &[2]);
            event.exception_dates.insert(date(2026, 2, 17));
            event.series_end_date = Some(date(2026, 3, 9));

            let range = DateRange::new(date(2026, 2, 1), date(2026, 3, 31)).unwrap();
            let dates: Vec<_> = weekly_dates(&event, range).collect();
            assert_eq!(dates, vec![date(2026, 2, 10), date(2026, 2, 24), date(2026, 3, 3)]);
        }

        #[test]
        fn test_non_weekly_yields_nothing() {
            let mut event = weekly_event(date(2026, 2, 1), &[1]);
            event.recurrence = Recurrence::None;
            assert_eq!(weekly_dates(&event, DateRange::month(ym("2026-02"))).count(), 0);
        }
    }

    mod occurrence_tests {
        use super::*;

        #[test]
        fn test_mixed_occurrences() {
            let weekly = weekly_event(date(2026, 2, 1), &[5]);
            let mut single = weekly_event(date(2026, 2, 14), &[]);
            single.recurrence = Recurrence::None;
            let mut outside = single.clone();
            outside.id = Uuid::new_v4();
            outside.time_span = TimeSpan::AllDay { date: date(2026, 3, 2) };

            let events = vec![weekly.clone(), single.clone(), outside];
            let found: Vec<_> = occurrences(&events, DateRange::month(ym("2026-02"))).collect();

            // four Fridays plus the single event
            assert_eq!(found.len(), 5);
            assert_eq!(found.iter().filter(|o| o.kind == OccurrenceKind::Weekly).count(), 4);
            let one_off = found.iter().find(|o| o.kind == OccurrenceKind::Single).unwrap();
            assert_eq!(one_off.event_id, single.id);
            assert_eq!(one_off.target().date, date(2026, 2, 14));
        }

        #[test]
        fn test_weekly_occurrences_use_rule_times() {
            let mut event = weekly_event(date(2026, 2, 1), &[2]);
            event.recurrence = Recurrence::Weekly {
                days_of_week: [2u8].into_iter().collect(),
                start_time: time(15, 0),
                end_time: time(16, 0),
            };
            let first = occurrences(std::slice::from_ref(&event), DateRange::month(ym("2026-02")))
                .next()
                .unwrap();
            assert_eq!(first.time_span, TimeSpan::timed(date(2026, 2, 3), time(15, 0), time(16, 0)));
            assert_eq!(first.target().event_id, Some(event.id));
        }
    }
}
