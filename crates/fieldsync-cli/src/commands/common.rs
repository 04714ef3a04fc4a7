use std::env;
use std::path::{Path, PathBuf};

use chrono::Utc;
use fieldsync_core::config::LedgerConfig;
use fieldsync_core::services::SyncService;
use fieldsync_core::snapshot::PendingConflict;
use fieldsync_core::util::{format_relative_time, format_timestamp, truncate_label};
use fieldsync_core::{ItemId, ResolvedConflict, SyncItem};
use serde::Serialize;

use crate::error::CliError;
use crate::state_file::{corrupt_state, load_snapshot, save_snapshot};

const STATE_FILE_NAME: &str = "state.json";
const CONFIG_FILE_NAME: &str = "config.json";

/// Resolved file locations and config shared by every command
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub state_path: PathBuf,
    pub config_path: PathBuf,
    pub config: LedgerConfig,
}

impl CommandContext {
    pub fn load(
        cli_state_path: Option<PathBuf>,
        cli_config_path: Option<PathBuf>,
    ) -> Result<Self, CliError> {
        let state_path = resolve_state_path(cli_state_path)?;
        let config_path = resolve_config_path(cli_config_path)?;
        let config = LedgerConfig::load_from_path(&config_path)
            .map_err(|error| CliError::Config(format!("{}: {error}", config_path.display())))?;

        Ok(Self {
            state_path,
            config_path,
            config,
        })
    }

    /// Context over explicit paths with default config
    #[cfg(test)]
    pub fn with_paths(state_path: PathBuf, config_path: PathBuf) -> Self {
        Self {
            state_path,
            config_path,
            config: LedgerConfig::default(),
        }
    }

    /// Restore the service from the state file
    pub fn open_service(&self) -> Result<SyncService, CliError> {
        let snapshot = load_snapshot(&self.state_path)?;
        SyncService::from_snapshot(snapshot, &self.config)
            .map_err(|error| corrupt_state(&self.state_path, &error))
    }

    /// Persist the service state back to the state file
    pub async fn save_service(&self, service: &SyncService) -> Result<(), CliError> {
        let snapshot = service.snapshot().await;
        save_snapshot(&self.state_path, &snapshot)
    }
}

pub fn resolve_state_path(cli_state_path: Option<PathBuf>) -> Result<PathBuf, CliError> {
    match cli_state_path.or_else(|| env::var_os("FIELDSYNC_STATE_PATH").map(PathBuf::from)) {
        Some(path) => Ok(path),
        None => default_state_path(),
    }
}

pub fn default_state_path() -> Result<PathBuf, CliError> {
    dirs::data_dir()
        .map(|dir| dir.join("fieldsync").join(STATE_FILE_NAME))
        .ok_or_else(|| CliError::Config("Failed to resolve CLI data directory".to_string()))
}

pub fn resolve_config_path(cli_config_path: Option<PathBuf>) -> Result<PathBuf, CliError> {
    match cli_config_path.or_else(|| env::var_os("FIELDSYNC_CONFIG").map(PathBuf::from)) {
        Some(path) => Ok(path),
        None => default_config_path(),
    }
}

pub fn default_config_path() -> Result<PathBuf, CliError> {
    dirs::config_dir()
        .map(|dir| dir.join("fieldsync").join(CONFIG_FILE_NAME))
        .ok_or_else(|| CliError::Config("Failed to resolve CLI config directory".to_string()))
}

pub fn normalize_item_id(id: &str) -> Result<ItemId, CliError> {
    let id = ItemId::new(id);
    if id.is_blank() {
        Err(CliError::EmptyItemId)
    } else {
        Ok(id)
    }
}

pub fn display_path(path: &Path) -> String {
    path.display().to_string()
}

#[derive(Debug, Serialize)]
pub struct SyncItemRow {
    pub id: String,
    pub item_type: String,
    pub description: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
    pub timestamp: i64,
    pub relative_time: String,
}

pub fn item_to_row(item: &SyncItem) -> SyncItemRow {
    let now_ms = Utc::now().timestamp_millis();
    SyncItemRow {
        id: item.id.to_string(),
        item_type: item.item_type.clone(),
        description: item.description.clone(),
        status: item.kind().to_string(),
        progress: item.status.progress(),
        error: item.status.error().map(str::to_string),
        size_bytes: item.size_bytes,
        timestamp: item.timestamp,
        relative_time: format_relative_time(item.timestamp, now_ms),
    }
}

pub fn format_item_lines(items: &[SyncItem]) -> Vec<String> {
    let now_ms = Utc::now().timestamp_millis();
    items
        .iter()
        .map(|item| {
            let id = truncate_label(item.id.as_str(), 24);
            let description = truncate_label(&item.description, 32);
            let status = item.status.describe();
            let relative_time = format_relative_time(item.timestamp, now_ms);
            format!(
                "{id:<24}  {:<10}  {description:<32}  {status:<20}  {relative_time}",
                item.item_type
            )
        })
        .collect()
}

#[derive(Debug, Serialize)]
pub struct ConflictRow {
    pub item_id: String,
    pub entity: String,
    pub field: String,
    pub local_value: String,
    pub server_value: String,
    pub local_author: String,
    pub server_author: String,
    pub local_at: String,
    pub server_at: String,
}

pub fn conflict_to_row(conflict: &PendingConflict) -> ConflictRow {
    let record = &conflict.record;
    ConflictRow {
        item_id: conflict.item_id.to_string(),
        entity: record.entity_name.clone(),
        field: record.field_name.clone(),
        local_value: record.local_value.clone(),
        server_value: record.server_value.clone(),
        local_author: record.local_author.clone(),
        server_author: record.server_author.clone(),
        local_at: format_timestamp(record.local_timestamp),
        server_at: format_timestamp(record.server_timestamp),
    }
}

pub fn format_conflict_lines(conflicts: &[PendingConflict]) -> Vec<String> {
    conflicts
        .iter()
        .map(|conflict| {
            let record = &conflict.record;
            format!(
                "{}  {}.{}  local={:?} server={:?}",
                conflict.item_id,
                record.entity_name,
                record.field_name,
                record.local_value,
                record.server_value
            )
        })
        .collect()
}

#[derive(Debug, Serialize)]
pub struct ResolvedConflictRow {
    pub item_id: String,
    pub entity: String,
    pub field: String,
    pub decision: String,
    pub chosen_value: String,
    pub resolved_at: i64,
    pub resolved_at_iso: String,
}

pub fn resolved_to_row(resolved: &ResolvedConflict) -> ResolvedConflictRow {
    ResolvedConflictRow {
        item_id: resolved.item_id.to_string(),
        entity: resolved.record.entity_name.clone(),
        field: resolved.record.field_name.clone(),
        decision: resolved.resolution.label().to_string(),
        chosen_value: resolved.chosen_value.clone(),
        resolved_at: resolved.resolved_at,
        resolved_at_iso: format_timestamp(resolved.resolved_at),
    }
}

pub fn format_resolved_lines(resolved: &[ResolvedConflict]) -> Vec<String> {
    resolved
        .iter()
        .map(|entry| {
            format!(
                "{}  {:<11}  item={}  {}.{}={:?}",
                format_timestamp(entry.resolved_at),
                entry.resolution.label(),
                entry.item_id,
                entry.record.entity_name,
                entry.record.field_name,
                entry.chosen_value
            )
        })
        .collect()
}
