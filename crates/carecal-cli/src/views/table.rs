use carecal_core::models::{CareManager, Category, Client, YearMonth};
use carecal_core::recurrence::{weekday_index, Occurrence, OccurrenceKind};
use carecal_core::series::Catalog;
use carecal_core::shift::{CellKey, ShiftMonth, ShiftSummary, WorkState};
use chrono::{Datelike, NaiveDate};
use comfy_table::{Attribute, Cell, CellAlignment, Color, Row, Table};
use std::collections::BTreeSet;

use crate::parser::weekday_label;
use crate::util::short_id;

/// `#rrggbb` to a terminal colour
fn hex_color(hex: &str) -> Option<Color> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    Some(Color::Rgb {
        r: channel(0)?,
        g: channel(2)?,
        b: channel(4)?,
    })
}

fn color_cell(text: impl ToString, hex: &str) -> Cell {
    let cell = Cell::new(text.to_string());
    match hex_color(hex) {
        Some(color) => cell.fg(color),
        None => cell,
    }
}

pub fn display_occurrences(occurrences: &[Occurrence], catalog: &Catalog<'_>) {
    if occurrences.is_empty() {
        println!("No events found.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Date", "Time", "Title", "Client", "Category", "Notes"]);

    let mut previous_date = None;
    for occurrence in occurrences {
        let mut row = Row::new();
        row.add_cell(Cell::new(short_id(&occurrence.event_id)));

        let date = occurrence.date();
        let date_text = if previous_date == Some(date) {
            String::new()
        } else {
            format!("{} {}", date.format("%Y-%m-%d"), weekday_label(weekday_index(date.weekday())))
        };
        previous_date = Some(date);
        row.add_cell(Cell::new(date_text));

        let time_text = match (occurrence.time_span.start_time(), occurrence.time_span.end_time()) {
            (Some(start), Some(end)) => format!("{}-{}", start.format("%H:%M"), end.format("%H:%M")),
            _ => "all day".to_string(),
        };
        row.add_cell(Cell::new(time_text));

        let title = match occurrence.kind {
            OccurrenceKind::Single => occurrence.title.clone(),
            OccurrenceKind::Weekly | OccurrenceKind::Monthly => format!("↻ {}", occurrence.title),
        };
        let mut title_cell = Cell::new(title);
        if occurrence.subject_id.is_none() {
            title_cell = title_cell.add_attribute(Attribute::Italic);
        }
        row.add_cell(title_cell);
        row.add_cell(Cell::new(catalog.display_subject(occurrence.subject_id).unwrap_or_default()));

        row.add_cell(color_cell(&occurrence.category, &occurrence.color));
        row.add_cell(Cell::new(&occurrence.notes).fg(Color::DarkGrey));
        table.add_row(row);
    }

    println!("{table}");
}

pub fn display_clients(clients: &[Client], managers: &[CareManager]) {
    if clients.is_empty() {
        println!("No clients found.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Care level", "Address", "Care manager", "Notes"]);

    for client in clients {
        let manager = client
            .care_manager_id
            .and_then(|id| managers.iter().find(|m| m.id == id))
            .map(|m| m.name.clone())
            .unwrap_or_default();
        table.add_row(vec![
            Cell::new(short_id(&client.id)),
            Cell::new(&client.name).add_attribute(Attribute::Bold),
            Cell::new(&client.care_level),
            Cell::new(&client.address),
            Cell::new(manager),
            Cell::new(client.notes.as_deref().unwrap_or("")).fg(Color::DarkGrey),
        ]);
    }

    println!("{table}");
}

pub fn display_categories(categories: &[Category]) {
    if categories.is_empty() {
        println!("No categories found.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Colour", "Default time"]);

    for category in categories {
        let default_time = match (category.default_start_time, category.default_end_time) {
            (Some(start), Some(end)) => format!("{}-{}", start.format("%H:%M"), end.format("%H:%M")),
            (Some(start), None) => format!("{}-", start.format("%H:%M")),
            _ => String::new(),
        };
        table.add_row(vec![
            Cell::new(short_id(&category.id)),
            color_cell(&category.name, &category.color),
            Cell::new(&category.color),
            Cell::new(default_time),
        ]);
    }

    println!("{table}");
}

pub fn display_managers(managers: &[CareManager]) {
    if managers.is_empty() {
        println!("No care managers found.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Name"]);
    for manager in managers {
        table.add_row(vec![Cell::new(short_id(&manager.id)), Cell::new(&manager.name)]);
    }

    println!("{table}");
}

pub fn display_holidays(holidays: &[NaiveDate]) {
    if holidays.is_empty() {
        println!("No holidays found.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["Date", "Weekday"]);
    for date in holidays {
        table.add_row(vec![
            Cell::new(date.format("%Y-%m-%d")),
            Cell::new(weekday_label(weekday_index(date.weekday()))),
        ]);
    }

    println!("{table}");
}

fn state_color(state: WorkState) -> Color {
    match state {
        WorkState::Work => Color::Reset,
        WorkState::FixedWork => Color::Blue,
        WorkState::HopeHoliday => Color::Magenta,
        WorkState::PaidLeave => Color::Yellow,
        WorkState::LegalHoliday => Color::Green,
        WorkState::LegalOutHoliday => Color::Cyan,
    }
}

/// Staff rows by day columns. Telework cells carry a `*`, weekends and
/// public holidays are highlighted in the header.
pub fn display_shift_grid(month: YearMonth, shifts: &ShiftMonth, staff: &[String], holidays: &BTreeSet<NaiveDate>) {
    let mut table = Table::new();

    let mut header = vec![Cell::new(month.to_string()).add_attribute(Attribute::Bold)];
    for date in month.days() {
        let label = format!("{}\n{}", date.day(), &weekday_label(weekday_index(date.weekday()))[..2]);
        let mut cell = Cell::new(label).set_alignment(CellAlignment::Center);
        if holidays.contains(&date) || weekday_index(date.weekday()) == 0 {
            cell = cell.fg(Color::Red);
        } else if weekday_index(date.weekday()) == 6 {
            cell = cell.fg(Color::Blue);
        }
        header.push(cell);
    }
    table.set_header(header);

    for (index, name) in staff.iter().enumerate() {
        let mut row = Row::new();
        row.add_cell(Cell::new(name));
        for day in 0..month.day_count() as u32 {
            let key = CellKey::new(index, day);
            let mut text = shifts.state(key).map_or("-", |s| s.symbol()).to_string();
            if shifts.is_telework(key) {
                text.push('*');
            }
            let mut cell = Cell::new(text).set_alignment(CellAlignment::Center);
            if let Some(state) = shifts.state(key) {
                cell = cell.fg(state_color(state));
            }
            if shifts.on_call.get(&day) == Some(&index) {
                cell = cell.add_attribute(Attribute::Underlined);
            }
            row.add_cell(cell);
        }
        table.add_row(row);
    }

    let mut on_call_row = Row::new();
    on_call_row.add_cell(Cell::new("On call").add_attribute(Attribute::Italic));
    for day in 0..month.day_count() as u32 {
        let text = shifts
            .on_call
            .get(&day)
            .map(|s| (s + 1).to_string())
            .unwrap_or_default();
        on_call_row.add_cell(Cell::new(text).set_alignment(CellAlignment::Center));
    }
    table.add_row(on_call_row);

    println!("{table}");
    println!("W work  F fixed work  x requested  P paid leave  L legal holiday  O extra holiday  * telework");
}

pub fn display_shift_summary(summaries: &[ShiftSummary], staff: &[String], required_off: u32) {
    let mut table = Table::new();
    table.set_header(vec![
        "Staff", "Work", "Fixed", "Requested", "Paid", "Legal", "Extra", "Off", "Unset", "On call", "Telework",
    ]);

    for summary in summaries {
        let name = staff.get(summary.staff).map(String::as_str).unwrap_or("?");
        let off = summary.days_off();
        let off_cell = if off < required_off {
            Cell::new(format!("{}/{}", off, required_off)).fg(Color::Red)
        } else {
            Cell::new(format!("{}/{}", off, required_off)).fg(Color::Green)
        };
        table.add_row(vec![
            Cell::new(name),
            Cell::new(summary.work),
            Cell::new(summary.fixed_work),
            Cell::new(summary.hope_holiday),
            Cell::new(summary.paid_leave),
            Cell::new(summary.legal_holiday),
            Cell::new(summary.legal_out_holiday),
            off_cell,
            Cell::new(summary.unset),
            Cell::new(summary.on_call),
            Cell::new(summary.telework),
        ]);
    }

    println!("{table}");
}
