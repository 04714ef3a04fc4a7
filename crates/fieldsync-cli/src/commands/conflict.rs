use chrono::Utc;
use fieldsync_core::util::normalize_text_option;
use fieldsync_core::{ConflictRecord, Resolution};

use crate::cli::{ConflictCommands, ResolutionChoice};
use crate::commands::common::{
    conflict_to_row, format_conflict_lines, format_resolved_lines, normalize_item_id,
    resolved_to_row, CommandContext, ConflictRow, ResolvedConflictRow,
};
use crate::error::CliError;

pub async fn run_conflict(
    command: ConflictCommands,
    context: &CommandContext,
) -> Result<(), CliError> {
    match command {
        ConflictCommands::Flag {
            id,
            entity,
            field,
            local,
            server,
            local_author,
            server_author,
        } => {
            let now_ms = Utc::now().timestamp_millis();
            let record = ConflictRecord::new(entity.trim(), field.trim(), local, server)
                .with_local_provenance(
                    normalize_text_option(local_author).unwrap_or_default(),
                    now_ms,
                )
                .with_server_provenance(
                    normalize_text_option(server_author).unwrap_or_default(),
                    now_ms,
                );
            run_conflict_flag(&id, record, context).await
        }
        ConflictCommands::Resolve { id, choice, value } => {
            let resolution = resolution_from_choice(choice, value)?;
            run_conflict_resolve(&id, resolution, context).await
        }
        ConflictCommands::List { json } => run_conflict_list(json, context).await,
        ConflictCommands::History { limit, json } => {
            run_conflict_history(limit, json, context).await
        }
    }
}

pub fn resolution_from_choice(
    choice: ResolutionChoice,
    value: Option<String>,
) -> Result<Resolution, CliError> {
    match (choice, value) {
        (ResolutionChoice::Merge, Some(value)) => Ok(Resolution::Merge(value)),
        (ResolutionChoice::Merge, None) => Err(CliError::MissingMergeValue),
        (_, Some(_)) => Err(CliError::UnexpectedMergeValue),
        (ResolutionChoice::KeepLocal, None) => Ok(Resolution::KeepLocal),
        (ResolutionChoice::KeepServer, None) => Ok(Resolution::KeepServer),
    }
}

pub async fn run_conflict_flag(
    id: &str,
    record: ConflictRecord,
    context: &CommandContext,
) -> Result<(), CliError> {
    let id = normalize_item_id(id)?;

    let service = context.open_service()?;
    service.flag_conflict(&id, record).await?;
    context.save_service(&service).await?;

    println!("{id}");
    Ok(())
}

pub async fn run_conflict_resolve(
    id: &str,
    resolution: Resolution,
    context: &CommandContext,
) -> Result<(), CliError> {
    let id = normalize_item_id(id)?;

    let service = context.open_service()?;
    let resolved = service.resolve(&id, resolution).await?;
    context.save_service(&service).await?;

    println!(
        "{}  {}  {}.{}={:?}",
        resolved.item_id,
        resolved.resolution.label(),
        resolved.record.entity_name,
        resolved.record.field_name,
        resolved.chosen_value
    );
    Ok(())
}

async fn run_conflict_list(as_json: bool, context: &CommandContext) -> Result<(), CliError> {
    let service = context.open_service()?;
    let conflicts = service.conflicts().await;

    if as_json {
        let rows = conflicts.iter().map(conflict_to_row).collect::<Vec<ConflictRow>>();
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else if conflicts.is_empty() {
        println!("No open conflicts");
    } else {
        for line in format_conflict_lines(&conflicts) {
            println!("{line}");
        }
    }

    Ok(())
}

async fn run_conflict_history(
    limit: usize,
    as_json: bool,
    context: &CommandContext,
) -> Result<(), CliError> {
    let service = context.open_service()?;
    let resolved = service.resolved_conflicts(limit).await;

    if as_json {
        let rows = resolved
            .iter()
            .map(resolved_to_row)
            .collect::<Vec<ResolvedConflictRow>>();
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else if resolved.is_empty() {
        println!("No resolved conflicts");
    } else {
        for line in format_resolved_lines(&resolved) {
            println!("{line}");
        }
    }

    Ok(())
}
