use anyhow::Result;
use carecal_core::models::{NewClientData, UpdateClientData};
use carecal_core::repository::Repository;
use dialoguer::Confirm;
use owo_colors::{OwoColorize, Style};

use crate::cli::{AddClientCommand, ClientSubcommand, DeleteClientCommand, EditClientCommand, ListClientsCommand};
use crate::util::{resolve_client_id, resolve_manager_id, resolve_optional_manager_id, short_id};
use crate::views::table::display_clients;

pub async fn client_command(repo: &(impl Repository + Sync), command: ClientSubcommand) -> Result<()> {
    match command {
        ClientSubcommand::Add(command) => add_client(repo, command).await,
        ClientSubcommand::List(command) => list_clients(repo, command).await,
        ClientSubcommand::Edit(command) => edit_client(repo, command).await,
        ClientSubcommand::Delete(command) => delete_client(repo, command).await,
    }
}

async fn add_client(repo: &(impl Repository + Sync), command: AddClientCommand) -> Result<()> {
    let care_manager_id = resolve_optional_manager_id(repo, command.manager.as_deref()).await?;
    let client = repo
        .add_client(NewClientData {
            name: command.name,
            address: command.address,
            care_level: command.care_level,
            care_manager_id,
            notes: command.notes,
        })
        .await?;

    println!(
        "{} Added client '{}' ({})",
        "✓".style(Style::new().green().bold()),
        client.name.bold(),
        short_id(&client.id).dimmed()
    );
    Ok(())
}

async fn list_clients(repo: &(impl Repository + Sync), command: ListClientsCommand) -> Result<()> {
    let clients = match resolve_optional_manager_id(repo, command.manager.as_deref()).await? {
        Some(manager_id) => repo.find_clients_for_manager(manager_id).await?,
        None => repo.find_clients().await?,
    };
    let managers = repo.find_care_managers().await?;
    display_clients(&clients, &managers);
    Ok(())
}

async fn edit_client(repo: &(impl Repository + Sync), command: EditClientCommand) -> Result<()> {
    let client_id = resolve_client_id(repo, &command.id).await?;

    let care_manager_id = if command.manager_clear {
        Some(None)
    } else if let Some(manager) = command.manager.as_deref() {
        Some(Some(resolve_manager_id(repo, manager).await?))
    } else {
        None
    };

    let notes = if command.notes_clear {
        Some(None)
    } else {
        command.notes.map(Some)
    };

    let client = repo
        .update_client(
            client_id,
            UpdateClientData {
                name: command.name,
                address: command.address,
                care_level: command.care_level,
                care_manager_id,
                notes,
            },
        )
        .await?;

    println!("{} Updated client '{}'", "✓".style(Style::new().green().bold()), client.name.bold());
    Ok(())
}

async fn delete_client(repo: &(impl Repository + Sync), command: DeleteClientCommand) -> Result<()> {
    let client_id = resolve_client_id(repo, &command.id).await?;
    let name = repo
        .find_client_by_id(client_id)
        .await?
        .map(|c| c.name)
        .unwrap_or_else(|| client_id.to_string());

    if !command.force {
        let confirmation = Confirm::new()
            .with_prompt(format!("Are you sure you want to delete client '{}'?", name))
            .default(false)
            .interact()
            .unwrap_or(false);

        if !confirmation {
            println!("Deletion cancelled.");
            return Ok(());
        }
    }

    repo.delete_client(client_id).await?;
    println!("{} Deleted client '{}'", "✓".style(Style::new().green().bold()), name.bold());
    Ok(())
}
