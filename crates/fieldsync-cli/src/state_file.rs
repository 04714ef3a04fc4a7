//! Persistent ledger state between CLI invocations.

use std::fs;
use std::path::Path;

use fieldsync_core::snapshot::{parse_json_snapshot, render_json_snapshot, LedgerSnapshot};

use crate::error::CliError;

/// Read the snapshot at `path`; a missing file is an empty ledger
pub fn load_snapshot(path: &Path) -> Result<LedgerSnapshot, CliError> {
    if !path.exists() {
        tracing::debug!("No state file at {}, starting empty", path.display());
        return Ok(LedgerSnapshot::default());
    }

    let payload = fs::read_to_string(path)?;
    parse_json_snapshot(&payload).map_err(|error| corrupt_state(path, &error))
}

/// Write the snapshot, replacing the previous file in one rename
pub fn save_snapshot(path: &Path, snapshot: &LedgerSnapshot) -> Result<(), CliError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let payload = render_json_snapshot(snapshot)?;
    let staging_path = path.with_extension("json.tmp");
    fs::write(&staging_path, payload)?;
    fs::rename(&staging_path, path)?;
    Ok(())
}

pub fn corrupt_state(path: &Path, error: &fieldsync_core::Error) -> CliError {
    CliError::CorruptState {
        path: path.display().to_string(),
        reason: error.to_string(),
    }
}
