use clap::Parser;
use carecal_core::error::CoreError;
use carecal_core::repository::JsonRepository;
use owo_colors::{OwoColorize, Style};

mod cli;
mod commands;
mod config;
mod parser;
mod util;
mod views;

#[tokio::main]
async fn main() {
    // Diagnostics go to stderr so table output stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = config::Config::new().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Could not read configuration, using defaults");
        config::Config::default()
    });
    let repository = JsonRepository::new(&config.data_path);
    tracing::debug!(path = %repository.path().display(), "Using data file");

    let cli = cli::Cli::parse();

    let result = match cli.command {
        cli::Commands::Event(command) => commands::event::event_command(&repository, command.command).await,
        cli::Commands::Client(command) => commands::client::client_command(&repository, command.command).await,
        cli::Commands::Category(command) => {
            commands::category::category_command(&repository, command.command).await
        }
        cli::Commands::Manager(command) => {
            commands::manager::manager_command(&repository, command.command).await
        }
        cli::Commands::Holiday(command) => {
            commands::holiday::holiday_command(&repository, command.command).await
        }
        cli::Commands::Shift(command) => {
            commands::shift::shift_command(&repository, command, &config.shift).await
        }
    };

    if let Err(e) = result {
        handle_error(e);
        std::process::exit(1);
    }
}

fn handle_error(err: anyhow::Error) {
    let error_style = Style::new().red().bold();

    if let Some(core_error) = err.chain().find_map(|e| e.downcast_ref::<CoreError>()) {
        match core_error {
            CoreError::NotFound(s) => {
                eprintln!("{} {}", "Error:".style(error_style), s);
            }
            CoreError::AmbiguousId(candidates) => {
                eprintln!("{}", "Error: Ambiguous ID.".style(error_style));
                eprintln!("Did you mean one of these?");
                for (id, name) in candidates {
                    eprintln!("  {} ({})", id.yellow(), name);
                }
            }
            CoreError::InvalidInput(s) => {
                eprintln!("{} Invalid input: {}", "Error:".style(error_style), s);
            }
            CoreError::InvalidRecurrence(s) => {
                eprintln!("{} Invalid recurrence: {}", "Error:".style(error_style), s.yellow());
            }
            CoreError::Serialization(e) => {
                eprintln!(
                    "{} The data file could not be read: {}",
                    "Error:".style(error_style),
                    e
                );
            }
            CoreError::Io(e) => {
                eprintln!("{} Storage error: {}", "Error:".style(error_style), e);
            }
            _ => eprintln!("{} {}", "Error:".style(error_style), core_error),
        }
    } else {
        eprintln!("{} {}", "Error:".style(error_style), err);
    }
}
