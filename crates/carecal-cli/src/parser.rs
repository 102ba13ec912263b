use anyhow::{anyhow, Result};
use carecal_core::models::YearMonth;
use chrono::{Local, NaiveDate, NaiveTime};
use chrono_english::{parse_date_string, Dialect};
use std::collections::BTreeSet;

const WEEKDAY_NAMES: [&str; 7] = ["sun", "mon", "tue", "wed", "thu", "fri", "sat"];
const FULL_WEEKDAY_NAMES: [&str; 7] = ["sunday", "monday", "tuesday", "wednesday", "thursday", "friday", "saturday"];

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Accepts `YYYY-MM-DD` or a phrase such as "tomorrow" or "next friday".
pub fn parse_date(date_str: &str) -> Result<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d") {
        return Ok(date);
    }
    parse_date_string(date_str, Local::now(), Dialect::Uk)
        .map(|dt| dt.date_naive())
        .map_err(|e| anyhow!("Failed to parse date '{}': {}", date_str, e))
}

pub fn parse_optional_date(date_str: Option<&str>) -> Result<Option<NaiveDate>> {
    date_str.map(parse_date).transpose()
}

pub fn parse_time(time_str: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(time_str.trim(), "%H:%M")
        .map_err(|_| anyhow!("Failed to parse time '{}'. Expected HH:MM", time_str))
}

pub fn parse_optional_time(time_str: Option<&str>) -> Result<Option<NaiveTime>> {
    time_str.map(parse_time).transpose()
}

/// Weekday name, three-letter abbreviation or number (0 = Sunday).
pub fn parse_weekday(day_str: &str) -> Result<u8> {
    let day = day_str.trim().to_lowercase();
    if let Ok(index) = day.parse::<u8>() {
        if index <= 6 {
            return Ok(index);
        }
    }
    FULL_WEEKDAY_NAMES
        .iter()
        .position(|full| day.len() >= 3 && full.starts_with(&day))
        .map(|index| index as u8)
        .ok_or_else(|| anyhow!("Unknown weekday '{}'", day_str))
}

/// Comma separated weekdays, e.g. "mon,thu".
pub fn parse_weekdays(days_str: &str) -> Result<BTreeSet<u8>> {
    days_str
        .split(',')
        .filter(|part| !part.trim().is_empty())
        .map(parse_weekday)
        .collect()
}

pub fn weekday_label(index: u8) -> &'static str {
    WEEKDAY_NAMES.get(index as usize).copied().unwrap_or("?")
}

/// `YYYY-MM`, defaulting to the current month.
pub fn parse_month(month_str: Option<&str>) -> Result<YearMonth> {
    match month_str {
        Some(s) => Ok(s.parse::<YearMonth>()?),
        None => Ok(YearMonth::of(today())),
    }
}
