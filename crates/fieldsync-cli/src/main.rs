//! fieldsync CLI - Command-line interface for the field-sales sync ledger
//!
//! Tracks queued records, session state, and field conflicts in a local
//! state file so a sync engine or a person can drive them step by step.

mod cli;
mod commands;
mod error;
mod state_file;

#[cfg(test)]
mod tests;

use clap::Parser;

use crate::cli::{Cli, Commands};
use crate::commands::add::run_add;
use crate::commands::common::CommandContext;
use crate::commands::completions::run_completions;
use crate::commands::config::run_config;
use crate::commands::conflict::run_conflict;
use crate::commands::export::run_export;
use crate::commands::list::run_list;
use crate::commands::progress::run_progress;
use crate::commands::remove::run_remove;
use crate::commands::retry::run_retry;
use crate::commands::session::run_session;
use crate::commands::update::run_update;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let directive = "fieldsync=info"
        .parse::<tracing_subscriber::filter::Directive>()
        .map_err(|error| CliError::Config(format!("invalid log directive: {error}")))?;
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(directive))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Commands::Completions { shell, output } = &cli.command {
        return run_completions(*shell, output.as_deref());
    }

    let context = CommandContext::load(cli.state_path, cli.config)?;

    match cli.command {
        Commands::Add {
            id,
            item_type,
            description,
            size,
        } => run_add(id.as_deref(), &item_type, &description, size, &context).await?,
        Commands::Update {
            id,
            status,
            progress,
            error,
        } => run_update(&id, &status, progress, error, &context).await?,
        Commands::List { status, json } => run_list(&status, json, &context).await?,
        Commands::Remove { id } => run_remove(&id, &context).await?,
        Commands::Progress { json } => run_progress(json, &context).await?,
        Commands::Session { command } => run_session(command, &context).await?,
        Commands::Conflict { command } => run_conflict(command, &context).await?,
        Commands::Retry { all } => run_retry(all, &context).await?,
        Commands::Export { format, output } => {
            run_export(format, output.as_deref(), &context).await?;
        }
        Commands::Config { command } => run_config(command, &context)?,
        Commands::Completions { .. } => {}
    }

    Ok(())
}
