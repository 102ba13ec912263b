use anyhow::{anyhow, Result};
use carecal_core::error::CoreError;
use carecal_core::models::YearMonth;
use carecal_core::recurrence::DateRange;
use carecal_core::repository::Repository;
use carecal_core::shift::{auto_assign, CellKey, HolidayQuota, ShiftMonth, WorkState};
use dialoguer::Confirm;
use owo_colors::{OwoColorize, Style};
use std::collections::BTreeSet;
use tracing::debug;

use crate::cli::{AutoShiftCommand, ShiftCommand, ShiftSubcommand};
use crate::config::ShiftConfig;
use crate::parser::parse_month;
use crate::util::resolve_staff;
use crate::views::table::{display_shift_grid, display_shift_summary};

pub async fn shift_command(repo: &(impl Repository + Sync), command: ShiftCommand, config: &ShiftConfig) -> Result<()> {
    let month = parse_month(command.month.as_deref())?;
    if config.staff.is_empty() {
        return Err(anyhow!(CoreError::InvalidInput(
            "The staff roster is empty. Set [shift] staff in carecal.toml".to_string()
        )));
    }

    match command.command {
        ShiftSubcommand::Show => show_month(repo, month, config, config.quota()).await,
        ShiftSubcommand::Cycle(cell) => {
            let key = cell_key(config, month, &cell.staff, cell.day)?;
            let mut shifts = load_or_default(repo, month).await?;
            let next = shifts.cycle_cell(key);
            repo.save_shift_month(month, shifts).await?;
            print_cell(config, key, next);
            Ok(())
        }
        ShiftSubcommand::Set(cell) => {
            let key = cell_key(config, month, &cell.staff, cell.day)?;
            let state = match cell.state.to_lowercase().as_str() {
                "unset" | "none" | "-" => None,
                other => Some(other.parse::<WorkState>().map_err(|e| anyhow!(CoreError::InvalidInput(e.to_string())))?),
            };
            let mut shifts = load_or_default(repo, month).await?;
            shifts.set_state(key, state);
            repo.save_shift_month(month, shifts).await?;
            print_cell(config, key, state);
            Ok(())
        }
        ShiftSubcommand::Telework(cell) => {
            let key = cell_key(config, month, &cell.staff, cell.day)?;
            let mut shifts = load_or_default(repo, month).await?;
            let on = shifts.toggle_telework(key);
            repo.save_shift_month(month, shifts).await?;
            println!(
                "{} works {} on day {}",
                config.staff[key.staff].bold(),
                if on { "remotely" } else { "on site" },
                key.day + 1
            );
            Ok(())
        }
        ShiftSubcommand::Oncall(command) => {
            let key = cell_key(config, month, &command.staff, command.day)?;
            let mut shifts = load_or_default(repo, month).await?;
            let holder = shifts.toggle_on_call(key.day, key.staff);
            repo.save_shift_month(month, shifts).await?;
            match holder {
                Some(staff) => println!("{} is on call on day {}", config.staff[staff].bold(), key.day + 1),
                None => println!("Nobody is on call on day {}", key.day + 1),
            }
            Ok(())
        }
        ShiftSubcommand::Auto(command) => auto_plan(repo, month, config, command).await,
        ShiftSubcommand::Clear(command) => {
            if !command.force {
                let confirmation = Confirm::new()
                    .with_prompt(format!("Are you sure you want to clear the shifts of {}?", month))
                    .default(false)
                    .interact()
                    .unwrap_or(false);

                if !confirmation {
                    println!("Clear cancelled.");
                    return Ok(());
                }
            }
            if repo.clear_shift_month(month).await? {
                println!("{} Cleared shifts of {}", "✓".style(Style::new().green().bold()), month);
            } else {
                println!("No shifts stored for {}.", month);
            }
            Ok(())
        }
    }
}

/// Cell of a staff member on a 1-based day of `month`
fn cell_key(config: &ShiftConfig, month: YearMonth, staff: &str, day: u32) -> Result<CellKey> {
    let staff = resolve_staff(&config.staff, staff)?;
    let day_count = month.day_count() as u32;
    if !(1..=day_count).contains(&day) {
        return Err(anyhow!(CoreError::InvalidInput(format!(
            "Day {} is outside {} (1-{})",
            day, month, day_count
        ))));
    }
    Ok(CellKey::new(staff, day - 1))
}

async fn load_or_default(repo: &(impl Repository + Sync), month: YearMonth) -> Result<ShiftMonth> {
    Ok(repo.load_shift_month(month).await?.unwrap_or_default())
}

fn print_cell(config: &ShiftConfig, key: CellKey, state: Option<WorkState>) {
    println!(
        "{} day {}: {}",
        config.staff[key.staff].bold(),
        key.day + 1,
        state.map_or("unset", WorkState::as_str).cyan()
    );
}

async fn show_month(
    repo: &(impl Repository + Sync),
    month: YearMonth,
    config: &ShiftConfig,
    quota: HolidayQuota,
) -> Result<()> {
    let shifts = load_or_default(repo, month).await?;
    let holidays: BTreeSet<_> = repo
        .find_holidays(Some(DateRange::month(month)))
        .await?
        .into_iter()
        .collect();

    display_shift_grid(month, &shifts, &config.staff, &holidays);
    display_shift_summary(
        &shifts.summary(config.staff.len(), month.day_count() as u32),
        &config.staff,
        quota.total(),
    );
    if let Some(updated_at) = shifts.updated_at {
        println!("{} {}", "Last saved:".dimmed(), updated_at.format("%Y-%m-%d %H:%M UTC"));
    }
    Ok(())
}

async fn auto_plan(
    repo: &(impl Repository + Sync),
    month: YearMonth,
    config: &ShiftConfig,
    command: AutoShiftCommand,
) -> Result<()> {
    let quota = HolidayQuota {
        legal: command.legal.unwrap_or(config.legal_holidays),
        legal_out: command.legal_out.unwrap_or(config.legal_out_holidays),
    };
    let mut rng = match command.seed {
        Some(seed) => fastrand::Rng::with_seed(seed),
        None => fastrand::Rng::new(),
    };
    debug!(month = %month, seed = ?command.seed, legal = quota.legal, legal_out = quota.legal_out, "Planning shifts");

    let current = load_or_default(repo, month).await?;
    let planned = auto_assign(&current, month, config.staff.len(), quota, &mut rng);
    repo.save_shift_month(month, planned).await?;

    println!(
        "{} Planned {} for {} staff ({} holidays each)",
        "✓".style(Style::new().green().bold()),
        month,
        config.staff.len(),
        quota.total()
    );
    show_month(repo, month, config, quota).await
}
