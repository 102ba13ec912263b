use anyhow::{anyhow, Result};
use carecal_core::error::CoreError;
use carecal_core::models::{
    DeleteScope, EditScope, Event, EventTiming, NewEventData, OccurrenceRef, Recurrence,
};
use carecal_core::recurrence::{weekly_dates, DateRange, MonthlyRule};
use carecal_core::repository::{OccurrenceFilter, Repository};
use carecal_core::series::Catalog;
use chrono::{NaiveDate, NaiveTime};
use dialoguer::{Confirm, Select};
use owo_colors::{OwoColorize, Style};

use crate::cli::{AddEventCommand, DeleteEventCommand, EditEventCommand, EventSubcommand, ListEventsCommand};
use crate::parser::{
    parse_date, parse_month, parse_optional_date, parse_optional_time, parse_weekday, parse_weekdays, today,
};
use crate::util::{resolve_client_id, resolve_event_id, resolve_manager_id, resolve_optional_manager_id, short_id};
use crate::views::table::display_occurrences;

pub async fn event_command(repo: &(impl Repository + Sync), command: EventSubcommand) -> Result<()> {
    match command {
        EventSubcommand::Add(command) => add_event(repo, command).await,
        EventSubcommand::List(command) => list_events(repo, command).await,
        EventSubcommand::Edit(command) => edit_event(repo, command).await,
        EventSubcommand::Delete(command) => delete_event(repo, command).await,
    }
}

async fn add_event(repo: &(impl Repository + Sync), command: AddEventCommand) -> Result<()> {
    let date = parse_optional_date(command.date.as_deref())?.unwrap_or_else(today);
    let start_time = parse_optional_time(command.start.as_deref())?;
    let end_time = parse_optional_time(command.end.as_deref())?;

    let timing = if command.all_day {
        EventTiming::AllDay
    } else if let Some(days) = &command.weekly {
        EventTiming::Weekly {
            days_of_week: parse_weekdays(days)?,
            start_time,
            end_time,
        }
    } else if command.monthly || command.week.is_some() || command.weekday.is_some() {
        let picked = MonthlyRule::for_date(date, NaiveTime::MIN, NaiveTime::MIN);
        EventTiming::Monthly {
            week: command.week.unwrap_or(picked.week),
            weekday: command.weekday.as_deref().map(parse_weekday).transpose()?.unwrap_or(picked.weekday),
            start_time,
            end_time,
        }
    } else {
        EventTiming::Single { start_time, end_time }
    };

    let subject_id = match command.client.as_deref() {
        Some(client) => Some(resolve_client_id(repo, client).await?),
        None => None,
    };
    let owner_id = resolve_optional_manager_id(repo, command.owner.as_deref()).await?;

    let data = NewEventData {
        subject_id,
        owner_id,
        category: command.category,
        notes: command.notes.unwrap_or_default(),
        date,
        timing,
    };
    let created = repo.add_event(data).await?;

    let success_style = Style::new().green().bold();
    match created.as_slice() {
        [] => println!("Nothing was added."),
        [event] => {
            println!(
                "{} Added {} '{}' ({})",
                "✓".style(success_style),
                describe_kind(event),
                event.title.bold(),
                short_id(&event.id).dimmed()
            );
            println!("  {} {}", "Starts:".dimmed(), event.date());
        }
        [first, .., last] => {
            println!(
                "{} Added monthly series '{}' with {} events",
                "✓".style(success_style),
                first.title.bold(),
                created.len()
            );
            println!("  {} {} to {}", "Dates:".dimmed(), first.date(), last.date());
        }
    }
    Ok(())
}

fn describe_kind(event: &Event) -> &'static str {
    match event.recurrence {
        Recurrence::None => "event",
        Recurrence::Weekly { .. } => "weekly series",
        Recurrence::MonthlyExpanded { .. } => "monthly event",
    }
}

async fn list_events(repo: &(impl Repository + Sync), command: ListEventsCommand) -> Result<()> {
    let range = match (command.from.as_deref(), command.to.as_deref()) {
        (Some(from), Some(to)) => DateRange::new(parse_date(from)?, parse_date(to)?)?,
        _ => DateRange::month(parse_month(command.month.as_deref())?),
    };
    let filter = OccurrenceFilter {
        manager: resolve_optional_manager_id(repo, command.manager.as_deref()).await?,
        client: match command.client.as_deref() {
            Some(key) => Some(resolve_client_id(repo, key).await?),
            None => None,
        },
    };

    let occurrences = repo.find_occurrences(range, filter).await?;
    let clients = repo.find_clients().await?;
    display_occurrences(&occurrences, &Catalog::new(&[], &clients));
    Ok(())
}

/// Date of the occurrence a command addresses. Weekly templates need an
/// explicit date unless the whole series is meant.
fn occurrence_date(event: &Event, date: Option<&str>, whole_series: bool) -> Result<NaiveDate> {
    if !event.recurrence.is_weekly() {
        if let Some(date) = date.map(parse_date).transpose()? {
            if date != event.date() {
                return Err(anyhow!(CoreError::InvalidInput(format!(
                    "'{}' takes place on {}, not {}",
                    event.title,
                    event.date(),
                    date
                ))));
            }
        }
        return Ok(event.date());
    }

    match date {
        Some(date) => {
            let date = parse_date(date)?;
            let range = DateRange::new(date, date)?;
            if weekly_dates(event, range).next().is_none() {
                return Err(anyhow!(CoreError::InvalidInput(format!(
                    "'{}' has no occurrence on {}",
                    event.title, date
                ))));
            }
            Ok(date)
        }
        None if whole_series => Ok(event.date()),
        None => Err(anyhow!(CoreError::InvalidInput(format!(
            "'{}' repeats weekly. Pass --date to pick an occurrence",
            event.title
        )))),
    }
}

fn prompt_edit_scope(date: NaiveDate) -> Result<EditScope> {
    let scope_options = vec![
        format!("This occurrence only ({})", date),
        "Entire series".to_string(),
    ];

    println!("{}", "This event is part of a recurring series.".yellow());
    let selection = Select::new()
        .with_prompt("How would you like to apply your changes?")
        .items(&scope_options)
        .default(0)
        .interact()?;

    Ok(match selection {
        0 => EditScope::ThisOccurrence,
        _ => EditScope::EntireSeries,
    })
}

fn prompt_delete_scope(date: NaiveDate) -> Result<DeleteScope> {
    let scope_options = vec![
        format!("This occurrence only ({})", date),
        "This and following occurrences".to_string(),
        "Entire series".to_string(),
    ];

    println!("{}", "This event is part of a recurring series.".yellow());
    let selection = Select::new()
        .with_prompt("What would you like to delete?")
        .items(&scope_options)
        .default(0)
        .interact()?;

    Ok(match selection {
        0 => DeleteScope::ThisOccurrence,
        1 => DeleteScope::ThisAndFollowing,
        _ => DeleteScope::EntireSeries,
    })
}

/// Start and end times the occurrence currently shows
fn current_times(event: &Event) -> (Option<NaiveTime>, Option<NaiveTime>) {
    match &event.recurrence {
        Recurrence::Weekly { start_time, end_time, .. } if !event.time_span.is_all_day() => {
            (Some(*start_time), Some(*end_time))
        }
        _ => (event.time_span.start_time(), event.time_span.end_time()),
    }
}

fn edit_timing(event: &Event, command: &EditEventCommand, scope: EditScope, date: NaiveDate) -> Result<EventTiming> {
    if command.all_day {
        return Ok(EventTiming::AllDay);
    }

    let (current_start, current_end) = current_times(event);
    let start = parse_optional_time(command.start.as_deref())?;
    let end = parse_optional_time(command.end.as_deref())?;
    let times_given = start.is_some() || end.is_some();
    let start_time = start.or(current_start);
    let end_time = end.or(current_end);
    let weekday = command.weekday.as_deref().map(parse_weekday).transpose()?;

    let timing = match (&event.recurrence, scope) {
        (Recurrence::Weekly { days_of_week, .. }, EditScope::EntireSeries) => EventTiming::Weekly {
            days_of_week: match &command.weekly {
                Some(days) => parse_weekdays(days)?,
                None => days_of_week.clone(),
            },
            start_time,
            end_time,
        },
        (Recurrence::MonthlyExpanded { week, weekday: current, .. }, EditScope::EntireSeries) => EventTiming::Monthly {
            week: command.week.unwrap_or(*week),
            weekday: weekday.unwrap_or(*current),
            start_time,
            end_time,
        },
        (Recurrence::None, _) if command.weekly.is_some() => EventTiming::Weekly {
            days_of_week: parse_weekdays(command.weekly.as_deref().unwrap_or_default())?,
            start_time,
            end_time,
        },
        (Recurrence::None, _) if command.week.is_some() || weekday.is_some() => {
            let picked = MonthlyRule::for_date(date, NaiveTime::MIN, NaiveTime::MIN);
            EventTiming::Monthly {
                week: command.week.unwrap_or(picked.week),
                weekday: weekday.unwrap_or(picked.weekday),
                start_time,
                end_time,
            }
        }
        _ if event.time_span.is_all_day() && !times_given => EventTiming::AllDay,
        _ => EventTiming::Single { start_time, end_time },
    };
    Ok(timing)
}

async fn edit_event(repo: &(impl Repository + Sync), command: EditEventCommand) -> Result<()> {
    let event_id = resolve_event_id(repo, &command.id).await?;
    let event = repo
        .find_event_by_id(event_id)
        .await?
        .ok_or_else(|| anyhow!(CoreError::NotFound(format!("Event '{}' not found", command.id))))?;

    let whole_series = command.scope == Some(EditScope::EntireSeries);
    let date = occurrence_date(&event, command.date.as_deref(), whole_series)?;
    let scope = match command.scope {
        _ if !event.is_recurring() => EditScope::ThisOccurrence,
        Some(scope) => scope,
        None => prompt_edit_scope(date)?,
    };

    let new_date = match parse_optional_date(command.move_to.as_deref())? {
        Some(_) if event.is_recurring() => {
            return Err(anyhow!(CoreError::InvalidInput(
                "Only single events can be moved to another date".to_string()
            )));
        }
        Some(moved) => moved,
        None => date,
    };

    let subject_id = if command.personal {
        None
    } else if let Some(client) = command.client.as_deref() {
        Some(resolve_client_id(repo, client).await?)
    } else {
        event.subject_id
    };
    let owner_id = match command.owner.as_deref() {
        Some(owner) => Some(resolve_manager_id(repo, owner).await?),
        None => event.owner_id,
    };

    let data = NewEventData {
        subject_id,
        owner_id,
        category: command.category.clone().unwrap_or_else(|| event.category.clone()),
        notes: command.notes.clone().unwrap_or_else(|| event.notes.clone()),
        date: new_date,
        timing: edit_timing(&event, &command, scope, new_date)?,
    };

    let target = OccurrenceRef::from_event(&event, date);
    if repo.update_event(target, data, scope).await? {
        let success_style = Style::new().green().bold();
        let what = match scope {
            EditScope::ThisOccurrence if event.is_recurring() => format!("occurrence on {}", date),
            EditScope::ThisOccurrence => "event".to_string(),
            EditScope::EntireSeries => "series".to_string(),
        };
        println!("{} Updated {} of '{}'", "✓".style(success_style), what, event.title.bold());
    } else {
        println!("Nothing changed.");
    }
    Ok(())
}

async fn delete_event(repo: &(impl Repository + Sync), command: DeleteEventCommand) -> Result<()> {
    let event_id = resolve_event_id(repo, &command.id).await?;
    let event = repo
        .find_event_by_id(event_id)
        .await?
        .ok_or_else(|| anyhow!(CoreError::NotFound(format!("Event '{}' not found", command.id))))?;

    let whole_series = command.scope == Some(DeleteScope::EntireSeries);
    let date = occurrence_date(&event, command.date.as_deref(), whole_series)?;
    let scope = match command.scope {
        _ if !event.is_recurring() => DeleteScope::ThisOccurrence,
        Some(scope) => scope,
        None => prompt_delete_scope(date)?,
    };

    if !command.force {
        let what = match scope {
            _ if !event.is_recurring() => format!("'{}' on {}", event.title, date),
            DeleteScope::ThisOccurrence => format!("the occurrence of '{}' on {}", event.title, date),
            DeleteScope::ThisAndFollowing => format!("'{}' from {} on", event.title, date),
            DeleteScope::EntireSeries => format!("every occurrence of '{}'", event.title),
        };
        let confirmation = Confirm::new()
            .with_prompt(format!("Are you sure you want to delete {}?", what))
            .default(false)
            .interact()
            .unwrap_or(false);

        if !confirmation {
            println!("Deletion cancelled.");
            return Ok(());
        }
    }

    let target = OccurrenceRef::from_event(&event, date);
    if repo.delete_event(target, scope).await? {
        println!("{} Deleted '{}' ({})", "✓".style(Style::new().green().bold()), event.title.bold(), scope);
    } else {
        println!("Nothing was deleted.");
    }
    Ok(())
}
