use anyhow::Result;
use carecal_core::recurrence::DateRange;
use carecal_core::repository::Repository;
use owo_colors::{OwoColorize, Style};

use crate::cli::HolidaySubcommand;
use crate::parser::{parse_date, parse_month};
use crate::views::table::display_holidays;

pub async fn holiday_command(repo: &(impl Repository + Sync), command: HolidaySubcommand) -> Result<()> {
    match command {
        HolidaySubcommand::Add(command) => {
            let date = parse_date(&command.date)?;
            if repo.add_holiday(date).await? {
                println!("{} Added holiday {}", "✓".style(Style::new().green().bold()), date);
            } else {
                println!("{} is already a holiday.", date);
            }
        }
        HolidaySubcommand::List(command) => {
            let range = match command.month.as_deref() {
                Some(month) => Some(DateRange::month(parse_month(Some(month))?)),
                None => None,
            };
            let holidays = repo.find_holidays(range).await?;
            display_holidays(&holidays);
        }
        HolidaySubcommand::Remove(command) => {
            let date = parse_date(&command.date)?;
            if repo.remove_holiday(date).await? {
                println!("{} Removed holiday {}", "✓".style(Style::new().green().bold()), date);
            } else {
                println!("{} is not a holiday.", date.yellow());
            }
        }
    }
    Ok(())
}
