use fieldsync_core::config::LedgerConfig;
use serde::Serialize;

use crate::cli::ConfigCommands;
use crate::commands::common::{display_path, CommandContext};
use crate::error::CliError;

#[derive(Debug, Serialize)]
struct ConfigReport<'a> {
    config_path: String,
    config_file_exists: bool,
    state_path: String,
    #[serde(flatten)]
    config: &'a LedgerConfig,
}

pub fn run_config(command: ConfigCommands, context: &CommandContext) -> Result<(), CliError> {
    match command {
        ConfigCommands::Show { json } => run_config_show(json, context),
    }
}

fn run_config_show(as_json: bool, context: &CommandContext) -> Result<(), CliError> {
    let report = ConfigReport {
        config_path: display_path(&context.config_path),
        config_file_exists: context.config_path.exists(),
        state_path: display_path(&context.state_path),
        config: &context.config,
    };

    if as_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let source = if report.config_file_exists {
        "file"
    } else {
        "defaults"
    };
    println!("config: {} ({source})", report.config_path);
    println!("state: {}", report.state_path);
    println!("history_limit: {}", context.config.history_limit);
    println!(
        "resolved_conflict_limit: {}",
        context.config.resolved_conflict_limit
    );
    println!("reflag_policy: {:?}", context.config.reflag_policy);
    Ok(())
}
