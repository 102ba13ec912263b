use anyhow::Result;
use carecal_core::models::NewCategoryData;
use carecal_core::repository::Repository;
use owo_colors::{OwoColorize, Style};

use crate::cli::{AddCategoryCommand, CategorySubcommand};
use crate::parser::parse_optional_time;
use crate::views::table::display_categories;

pub async fn category_command(repo: &(impl Repository + Sync), command: CategorySubcommand) -> Result<()> {
    match command {
        CategorySubcommand::Add(command) => add_category(repo, command).await,
        CategorySubcommand::List => {
            let categories = repo.find_categories().await?;
            display_categories(&categories);
            Ok(())
        }
        CategorySubcommand::Delete(command) => {
            let removed = repo.delete_category(&command.key).await?;
            println!(
                "{} Deleted category '{}'. Existing events keep their label and colour.",
                "✓".style(Style::new().green().bold()),
                removed.name.bold()
            );
            Ok(())
        }
    }
}

async fn add_category(repo: &(impl Repository + Sync), command: AddCategoryCommand) -> Result<()> {
    let category = repo
        .add_category(NewCategoryData {
            name: command.name,
            color: command.color,
            default_start_time: parse_optional_time(command.start.as_deref())?,
            default_end_time: parse_optional_time(command.end.as_deref())?,
        })
        .await?;

    println!(
        "{} Added category '{}' ({})",
        "✓".style(Style::new().green().bold()),
        category.name.bold(),
        category.color
    );
    Ok(())
}
