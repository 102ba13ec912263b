use anyhow::Result;
use carecal_core::repository::Repository;
use owo_colors::{OwoColorize, Style};

use crate::cli::ManagerSubcommand;
use crate::views::table::display_managers;

pub async fn manager_command(repo: &(impl Repository + Sync), command: ManagerSubcommand) -> Result<()> {
    match command {
        ManagerSubcommand::Add(command) => {
            let manager = repo.add_care_manager(command.name).await?;
            println!("{} Added care manager '{}'", "✓".style(Style::new().green().bold()), manager.name.bold());
        }
        ManagerSubcommand::List => {
            let managers = repo.find_care_managers().await?;
            display_managers(&managers);
        }
    }
    Ok(())
}
