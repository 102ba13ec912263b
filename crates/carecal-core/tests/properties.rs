use carecal_core::models::*;
use carecal_core::recurrence::{occurrences, weekday_index, DateRange, MonthlyRule};
use carecal_core::series::delete_occurrence;
use carecal_core::shift::{auto_assign, CellKey, HolidayQuota, ShiftMonth, WorkState};
use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Weekday};
use proptest::prelude::*;
use std::collections::BTreeSet;
use uuid::Uuid;

fn time(h: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, 0, 0).unwrap()
}

fn weekly_event(anchor: NaiveDate, days: BTreeSet<u8>) -> Event {
    Event {
        id: Uuid::new_v4(),
        title: "Round".to_string(),
        category: "Other".to_string(),
        color: DEFAULT_COLOR.to_string(),
        subject_id: None,
        owner_id: None,
        notes: String::new(),
        time_span: TimeSpan::timed(anchor, time(9), time(10)),
        recurrence: Recurrence::Weekly {
            days_of_week: days,
            start_time: time(9),
            end_time: time(10),
        },
        exception_dates: BTreeSet::new(),
        series_end_date: None,
    }
}

fn off_cap(date: NaiveDate) -> usize {
    match date.weekday() {
        Weekday::Sat | Weekday::Sun => 2,
        _ => 1,
    }
}

fn state_strategy() -> impl Strategy<Value = WorkState> {
    prop_oneof![
        Just(WorkState::HopeHoliday),
        Just(WorkState::PaidLeave),
        Just(WorkState::FixedWork),
        Just(WorkState::LegalHoliday),
        Just(WorkState::Work),
    ]
}

fn year_month_strategy() -> impl Strategy<Value = YearMonth> {
    (2000i32..2100, 1u32..=12).prop_map(|(y, m)| YearMonth::new(y, m).unwrap())
}

proptest! {
    #[test]
    fn monthly_instances_land_on_the_requested_weekday(
        week in 1u8..=4,
        weekday in 0u8..=6,
        start in year_month_strategy(),
    ) {
        let rule = MonthlyRule::new(week, weekday, time(10), time(11)).unwrap();
        let dates = rule.dates(start).unwrap();
        prop_assert_eq!(dates.len(), 12);
        for (i, date) in dates.iter().enumerate() {
            let expected_month = start.add_months(i as u32).unwrap();
            prop_assert_eq!(YearMonth::of(*date), expected_month);
            prop_assert_eq!(weekday_index(date.weekday()), weekday);
            prop_assert_eq!(((date.day() + 6) / 7) as u8, week);
        }
    }

    #[test]
    fn weekly_exceptions_suppress_exactly_their_date(
        days in prop::collection::btree_set(0u8..=6, 1..=7),
        anchor_offset in 0i64..28,
        exception_offset in 0i64..60,
    ) {
        let anchor = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap() + Duration::days(anchor_offset);
        let range = DateRange::new(anchor, anchor + Duration::days(62)).unwrap();
        let exception = anchor + Duration::days(exception_offset);

        let plain = weekly_event(anchor, days.clone());
        let mut excepted = plain.clone();
        excepted.exception_dates.insert(exception);

        let before: BTreeSet<NaiveDate> = occurrences(std::slice::from_ref(&plain), range).map(|o| o.date()).collect();
        let after: BTreeSet<NaiveDate> = occurrences(std::slice::from_ref(&excepted), range).map(|o| o.date()).collect();

        prop_assert!(!after.contains(&exception));
        let mut expected = before.clone();
        expected.remove(&exception);
        prop_assert_eq!(after, expected);
        for date in &before {
            prop_assert!(days.contains(&weekday_index(date.weekday())));
        }
    }

    #[test]
    fn delete_following_keeps_the_week_before(
        weekday in 0u8..=6,
        weeks_in in 1i64..20,
    ) {
        let anchor = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();
        let event = weekly_event(anchor, [weekday].into_iter().collect());
        let first = (0..7)
            .map(|i| anchor + Duration::days(i))
            .find(|d| weekday_index(d.weekday()) == weekday)
            .unwrap();
        let target_date = first + Duration::weeks(weeks_in);

        let events = delete_occurrence(
            vec![event.clone()],
            &OccurrenceRef::from_event(&event, target_date),
            DeleteScope::ThisAndFollowing,
        );
        let range = DateRange::new(anchor, target_date + Duration::days(30)).unwrap();
        let dates: BTreeSet<NaiveDate> = occurrences(&events, range).map(|o| o.date()).collect();

        prop_assert!(dates.contains(&(target_date - Duration::weeks(1))));
        prop_assert!(!dates.contains(&target_date));
        prop_assert!(!dates.contains(&(target_date + Duration::weeks(1))));
    }

    #[test]
    fn each_staff_member_reaches_the_holiday_quota(
        month in year_month_strategy(),
        staff_count in 1usize..=4,
        legal in 0u32..=6,
        legal_out in 0u32..=6,
        prefill in prop::collection::vec((0usize..4, 0u32..28, state_strategy()), 0..20),
        seed in any::<u64>(),
    ) {
        let mut current = ShiftMonth::default();
        for (staff, day, state) in prefill {
            if staff < staff_count {
                current.set_state(CellKey::new(staff, day), Some(state));
            }
        }
        let quota = HolidayQuota { legal, legal_out };
        let mut rng = fastrand::Rng::with_seed(seed);
        let planned = auto_assign(&current, month, staff_count, quota, &mut rng);
        let day_count = month.day_count() as u32;

        for summary in planned.summary(staff_count, day_count) {
            let requested = summary.hope_holiday + summary.paid_leave;
            let free = day_count - requested - summary.fixed_work;
            let needed = quota.total().saturating_sub(requested);
            prop_assert_eq!(summary.unset, 0);
            // Overflow fill reaches the quota unless the month runs out of free days
            prop_assert_eq!(summary.days_off(), requested + needed.min(free));
            prop_assert!(summary.legal_holiday <= legal.saturating_sub(requested));
        }
    }

    #[test]
    fn daily_off_cap_holds_when_demand_is_low(
        month in year_month_strategy(),
        staff_count in 1usize..=3,
        legal in 0u32..=2,
        legal_out in 0u32..=1,
        seed in any::<u64>(),
    ) {
        let quota = HolidayQuota { legal, legal_out };
        let mut rng = fastrand::Rng::with_seed(seed);
        let planned = auto_assign(&ShiftMonth::default(), month, staff_count, quota, &mut rng);

        for (day, date) in month.days().enumerate() {
            let off = (0..staff_count)
                .filter(|s| planned.state(CellKey::new(*s, day as u32)).map_or(false, |st| st.is_day_off()))
                .count();
            prop_assert!(off <= off_cap(date), "{} staff off on {}", off, date);
        }
    }

    #[test]
    fn on_call_rotates_fairly_when_everyone_works(
        month in year_month_strategy(),
        staff_count in 1usize..=6,
        seed in any::<u64>(),
    ) {
        let mut current = ShiftMonth::default();
        for staff in 0..staff_count {
            for day in 0..month.day_count() as u32 {
                current.set_state(CellKey::new(staff, day), Some(WorkState::FixedWork));
            }
        }
        let quota = HolidayQuota { legal: 0, legal_out: 0 };
        let mut rng = fastrand::Rng::with_seed(seed);
        let planned = auto_assign(&current, month, staff_count, quota, &mut rng);

        prop_assert_eq!(planned.on_call.len(), month.day_count());
        let counts: Vec<u32> = planned
            .summary(staff_count, month.day_count() as u32)
            .iter()
            .map(|s| s.on_call)
            .collect();
        let max = counts.iter().max().copied().unwrap_or(0);
        let min = counts.iter().min().copied().unwrap_or(0);
        prop_assert!(max - min <= 1);
    }

    #[test]
    fn rerunning_the_planner_keeps_manual_cells(
        month in year_month_strategy(),
        staff_count in 1usize..=4,
        prefill in prop::collection::vec((0usize..4, 0u32..28, state_strategy()), 0..24),
        first_seed in any::<u64>(),
        second_seed in any::<u64>(),
    ) {
        let mut current = ShiftMonth::default();
        for (staff, day, state) in prefill {
            if staff < staff_count {
                current.set_state(CellKey::new(staff, day), Some(state));
            }
        }
        let quota = HolidayQuota::default();
        let once = auto_assign(&current, month, staff_count, quota, &mut fastrand::Rng::with_seed(first_seed));
        let twice = auto_assign(&once, month, staff_count, quota, &mut fastrand::Rng::with_seed(second_seed));

        for (key, state) in &once.shifts {
            if matches!(state, WorkState::HopeHoliday | WorkState::PaidLeave | WorkState::FixedWork) {
                prop_assert_eq!(twice.state(*key), Some(*state));
            }
        }
        for (key, state) in &current.shifts {
            if matches!(state, WorkState::HopeHoliday | WorkState::PaidLeave | WorkState::FixedWork) {
                prop_assert_eq!(once.state(*key), Some(*state));
            }
        }
    }
}
