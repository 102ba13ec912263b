//! Monthly staff shift grids and the automatic holiday planner.
//!
//! Staff are addressed by their position in the configured staff list and days
//! by their 0-based index within the month. A cell with no entry is unset.

use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};
use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

use crate::models::YearMonth;

/// State of one staff-day cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkState {
    Work,
    /// Requested day off
    HopeHoliday,
    /// Must work; never changed by the planner
    FixedWork,
    PaidLeave,
    /// Statutory holiday
    LegalHoliday,
    /// Holiday beyond the statutory count
    LegalOutHoliday,
}

impl WorkState {
    /// States the planner counts as a day off
    pub fn is_day_off(self) -> bool {
        matches!(
            self,
            WorkState::HopeHoliday | WorkState::PaidLeave | WorkState::LegalHoliday | WorkState::LegalOutHoliday
        )
    }

    /// States entered by hand and kept across planner runs
    pub fn is_requested(self) -> bool {
        matches!(self, WorkState::HopeHoliday | WorkState::PaidLeave)
    }

    pub fn is_working(self) -> bool {
        matches!(self, WorkState::Work | WorkState::FixedWork)
    }

    /// Short grid label
    pub fn symbol(self) -> &'static str {
        match self {
            WorkState::Work => "W",
            WorkState::HopeHoliday => "x",
            WorkState::FixedWork => "F",
            WorkState::PaidLeave => "P",
            WorkState::LegalHoliday => "L",
            WorkState::LegalOutHoliday => "O",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WorkState::Work => "work",
            WorkState::HopeHoliday => "hope_holiday",
            WorkState::FixedWork => "fixed_work",
            WorkState::PaidLeave => "paid_leave",
            WorkState::LegalHoliday => "legal_holiday",
            WorkState::LegalOutHoliday => "legal_out_holiday",
        }
    }

    /// Next state of the manual cycle: unset, hope_holiday, fixed_work,
    /// paid_leave, unset. Planner-written states cycle back to unset.
    pub fn cycle(current: Option<WorkState>) -> Option<WorkState> {
        match current {
            None => Some(WorkState::HopeHoliday),
            Some(WorkState::HopeHoliday) => Some(WorkState::FixedWork),
            Some(WorkState::FixedWork) => Some(WorkState::PaidLeave),
            Some(_) => None,
        }
    }
}

impl std::fmt::Display for WorkState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkState {
    type Err = ParseWorkStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "work" | "w" => Ok(WorkState::Work),
            "hope_holiday" | "hope" | "x" => Ok(WorkState::HopeHoliday),
            "fixed_work" | "fixed" | "f" => Ok(WorkState::FixedWork),
            "paid_leave" | "paid" | "p" => Ok(WorkState::PaidLeave),
            "legal_holiday" | "legal" | "l" => Ok(WorkState::LegalHoliday),
            "legal_out_holiday" | "legal_out" | "o" => Ok(WorkState::LegalOutHoliday),
            _ => Err(ParseWorkStateError(s.to_string())),
        }
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid shift state: {0}")]
pub struct ParseWorkStateError(String);

/// A staff-day coordinate, written `<staff>-<day>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellKey {
    pub staff: usize,
    pub day: u32,
}

impl CellKey {
    pub fn new(staff: usize, day: u32) -> Self {
        Self { staff, day }
    }
}

impl std::fmt::Display for CellKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.staff, self.day)
    }
}

impl FromStr for CellKey {
    type Err = ParseCellKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (staff, day) = s
            .split_once('-')
            .ok_or_else(|| ParseCellKeyError(s.to_string()))?;
        Ok(CellKey {
            staff: staff.parse().map_err(|_| ParseCellKeyError(s.to_string()))?,
            day: day.parse().map_err(|_| ParseCellKeyError(s.to_string()))?,
        })
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid cell key: {0}")]
pub struct ParseCellKeyError(String);

/// Holidays each staff member must get in a month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolidayQuota {
    pub legal: u32,
    pub legal_out: u32,
}

impl HolidayQuota {
    pub fn total(&self) -> u32 {
        self.legal + self.legal_out
    }
}

impl Default for HolidayQuota {
    fn default() -> Self {
        Self { legal: 4, legal_out: 5 }
    }
}

/// The persisted grid of one month
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftMonth {
    #[serde_as(as = "BTreeMap<DisplayFromStr, _>")]
    #[serde(default)]
    pub shifts: BTreeMap<CellKey, WorkState>,
    /// Day index to staff index
    #[serde_as(as = "BTreeMap<DisplayFromStr, DisplayFromStr>")]
    #[serde(default)]
    pub on_call: BTreeMap<u32, usize>,
    #[serde_as(as = "BTreeSet<DisplayFromStr>")]
    #[serde(default)]
    pub telework: BTreeSet<CellKey>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ShiftMonth {
    pub fn state(&self, key: CellKey) -> Option<WorkState> {
        self.shifts.get(&key).copied()
    }

    /// Writes or clears one cell
    pub fn set_state(&mut self, key: CellKey, state: Option<WorkState>) {
        match state {
            Some(state) => {
                self.shifts.insert(key, state);
            }
            None => {
                self.shifts.remove(&key);
            }
        }
    }

    /// Advances a cell through the manual cycle and returns its new state
    pub fn cycle_cell(&mut self, key: CellKey) -> Option<WorkState> {
        let next = WorkState::cycle(self.state(key));
        self.set_state(key, next);
        next
    }

    /// Flips the telework marker and returns whether it is now set
    pub fn toggle_telework(&mut self, key: CellKey) -> bool {
        if self.telework.remove(&key) {
            false
        } else {
            self.telework.insert(key);
            true
        }
    }

    /// Makes `staff` on call for `day`, or clears the day when `staff` already is
    pub fn toggle_on_call(&mut self, day: u32, staff: usize) -> Option<usize> {
        if self.on_call.get(&day) == Some(&staff) {
            self.on_call.remove(&day);
            None
        } else {
            self.on_call.insert(day, staff);
            Some(staff)
        }
    }

    pub fn is_telework(&self, key: CellKey) -> bool {
        self.telework.contains(&key)
    }

    /// Per-staff totals for the month
    pub fn summary(&self, staff_count: usize, day_count: u32) -> Vec<ShiftSummary> {
        (0..staff_count)
            .map(|staff| {
                let mut summary = ShiftSummary {
                    staff,
                    ..Default::default()
                };
                for day in 0..day_count {
                    match self.state(CellKey::new(staff, day)) {
                        Some(WorkState::Work) => summary.work += 1,
                        Some(WorkState::FixedWork) => summary.fixed_work += 1,
                        Some(WorkState::HopeHoliday) => summary.hope_holiday += 1,
                        Some(WorkState::PaidLeave) => summary.paid_leave += 1,
                        Some(WorkState::LegalHoliday) => summary.legal_holiday += 1,
                        Some(WorkState::LegalOutHoliday) => summary.legal_out_holiday += 1,
                        None => summary.unset += 1,
                    }
                    if self.is_telework(CellKey::new(staff, day)) {
                        summary.telework += 1;
                    }
                }
                summary.on_call = self.on_call.values().filter(|s| **s == staff).count() as u32;
                summary
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShiftSummary {
    pub staff: usize,
    pub work: u32,
    pub fixed_work: u32,
    pub hope_holiday: u32,
    pub paid_leave: u32,
    pub legal_holiday: u32,
    pub legal_out_holiday: u32,
    pub unset: u32,
    pub on_call: u32,
    pub telework: u32,
}

impl ShiftSummary {
    pub fn days_off(&self) -> u32 {
        self.hope_holiday + self.paid_leave + self.legal_holiday + self.legal_out_holiday
    }
}

/// Planner cell: a kept state, an undecided holiday, or nothing yet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Unset,
    Kept(WorkState),
    Holiday,
}

impl Slot {
    fn is_day_off(self) -> bool {
        match self {
            Slot::Unset => false,
            Slot::Kept(state) => state.is_day_off(),
            Slot::Holiday => true,
        }
    }

    fn is_set(self) -> bool {
        self != Slot::Unset
    }
}

/// Staff who may be off on one date: two on weekends, one otherwise
fn daily_off_cap(date: NaiveDate) -> u32 {
    match date.weekday() {
        Weekday::Sat | Weekday::Sun => 2,
        _ => 1,
    }
}

/// Plans the month.
///
/// Requested holidays and fixed work are kept; every other state is
/// recomputed. Each staff member gets holidays up to `quota`, preferring to
/// break runs of three working days, then random days within the daily cap,
/// then any remaining day. Holidays are labelled statutory in date order until
/// the statutory quota is spent, the rest work. On-call duty goes to whoever
/// works today and tomorrow with the fewest duties so far. Telework markers
/// carry over unchanged.
pub fn auto_assign(
    current: &ShiftMonth,
    month: YearMonth,
    staff_count: usize,
    quota: HolidayQuota,
    rng: &mut fastrand::Rng,
) -> ShiftMonth {
    let days: Vec<NaiveDate> = month.days().collect();
    let caps: Vec<u32> = days.iter().map(|d| daily_off_cap(*d)).collect();
    let mut daily_off = vec![0u32; days.len()];

    let mut grid: Vec<Vec<Slot>> = Vec::with_capacity(staff_count);
    for staff in 0..staff_count {
        let mut row = Vec::with_capacity(days.len());
        for (day, off) in daily_off.iter_mut().enumerate() {
            let slot = match current.state(CellKey::new(staff, day as u32)) {
                Some(state) if state.is_requested() => {
                    *off += 1;
                    Slot::Kept(state)
                }
                Some(WorkState::FixedWork) => Slot::Kept(WorkState::FixedWork),
                _ => Slot::Unset,
            };
            row.push(slot);
        }
        grid.push(row);
    }

    for row in grid.iter_mut() {
        assign_holidays(row, &caps, &mut daily_off, quota, rng);
    }

    let mut shifts = BTreeMap::new();
    for (staff, row) in grid.iter().enumerate() {
        for (day, slot) in row.iter().enumerate() {
            if let Slot::Kept(state) = slot {
                shifts.insert(CellKey::new(staff, day as u32), *state);
            }
        }
    }

    let on_call = assign_on_call(&shifts, staff_count, days.len() as u32);
    debug!(
        month = %month,
        staff = staff_count,
        on_call_days = on_call.len(),
        "Auto-assigned shifts"
    );

    ShiftMonth {
        shifts,
        on_call,
        telework: current.telework.clone(),
        updated_at: current.updated_at,
    }
}

/// Places one staff member's holidays and fills the rest of the row with work.
fn assign_holidays(
    row: &mut [Slot],
    caps: &[u32],
    daily_off: &mut [u32],
    quota: HolidayQuota,
    rng: &mut fastrand::Rng,
) {
    let len = row.len();
    let requested = row
        .iter()
        .filter(|s| matches!(s, Slot::Kept(state) if state.is_requested()))
        .count() as u32;
    let needed = quota.total().saturating_sub(requested);

    let mut available: Vec<usize> = (0..len).filter(|d| !row[*d].is_set()).collect();
    rng.shuffle(&mut available);

    let mut placed = place_within_cap(row, caps, daily_off, &available, needed);

    // Whatever is still missing ignores the cap.
    for &day in &available {
        if placed >= needed {
            break;
        }
        if row[day].is_set() {
            continue;
        }
        mark_holiday(row, daily_off, day);
        placed += 1;
    }

    let mut legal_remaining = quota.legal.saturating_sub(requested);
    for slot in row.iter_mut() {
        *slot = match *slot {
            Slot::Holiday if legal_remaining > 0 => {
                legal_remaining -= 1;
                Slot::Kept(WorkState::LegalHoliday)
            }
            Slot::Holiday => Slot::Kept(WorkState::LegalOutHoliday),
            Slot::Unset => Slot::Kept(WorkState::Work),
            kept => kept,
        };
    }
}

/// Places up to `needed` holidays without exceeding any daily cap. Returns
/// how many were placed.
fn place_within_cap(row: &mut [Slot], caps: &[u32], daily_off: &mut [u32], available: &[usize], needed: u32) -> u32 {
    let len = row.len();
    let mut placed = 0u32;

    // Break runs of three or more working days.
    for day in 0..len {
        if placed >= needed {
            break;
        }
        if row[day].is_set() {
            continue;
        }
        let streak = row[..day].iter().rev().take_while(|s| !s.is_day_off()).count();
        if streak >= 3 && daily_off[day] < caps[day] {
            mark_holiday(row, daily_off, day);
            placed += 1;
        }
    }

    // Random days within the daily cap, joining an existing holiday at most once
    // and never into a run of three.
    let mut joined_adjacent = false;
    for &day in available {
        if placed >= needed {
            break;
        }
        if row[day].is_set() || daily_off[day] >= caps[day] {
            continue;
        }
        let prev = day > 0 && row[day - 1].is_day_off();
        let next = day + 1 < len && row[day + 1].is_day_off();
        if prev || next {
            if joined_adjacent {
                continue;
            }
            let prev2 = day > 1 && row[day - 2].is_day_off();
            let next2 = day + 2 < len && row[day + 2].is_day_off();
            if prev2 || next2 {
                continue;
            }
            joined_adjacent = true;
        }
        mark_holiday(row, daily_off, day);
        placed += 1;
    }

    placed
}

fn mark_holiday(row: &mut [Slot], daily_off: &mut [u32], day: usize) {
    row[day] = Slot::Holiday;
    daily_off[day] += 1;
}

/// Picks one on-call staff member per day.
fn assign_on_call(shifts: &BTreeMap<CellKey, WorkState>, staff_count: usize, day_count: u32) -> BTreeMap<u32, usize> {
    let working = |staff: usize, day: u32| {
        shifts
            .get(&CellKey::new(staff, day))
            .map_or(false, |s| s.is_working())
    };

    let mut counts = vec![0u32; staff_count];
    let mut on_call = BTreeMap::new();
    for day in 0..day_count {
        let tomorrow = if day + 1 < day_count { day + 1 } else { day };
        let mut eligible: Vec<usize> = (0..staff_count)
            .filter(|s| working(*s, day) && working(*s, tomorrow))
            .collect();
        if eligible.is_empty() {
            eligible = (0..staff_count).filter(|s| working(*s, day)).collect();
        }
        if let Some(chosen) = eligible.into_iter().min_by_key(|s| counts[*s]) {
            counts[chosen] += 1;
            on_call.insert(day, chosen);
        }
    }
    on_call
}
