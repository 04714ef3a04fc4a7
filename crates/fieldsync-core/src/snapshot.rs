//! Snapshot encoding of ledger, conflict and session state.
//!
//! JSON snapshots let clients persist the ledger between runs; the Markdown
//! report is a read-only export for humans.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::config::LedgerConfig;
use crate::error::{Error, Result};
use crate::ledger::Ledger;
use crate::models::{ConflictRecord, ItemId, ResolvedConflict, SyncItem};
use crate::sync::{compute, ConflictResolver, SessionState, SyncSession};
use crate::util::{format_bytes, format_timestamp};

pub const SNAPSHOT_VERSION: u32 = 1;

/// Conflict record paired with the item it belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingConflict {
    pub item_id: ItemId,
    pub record: ConflictRecord,
}

/// Serializable state of a ledger, its resolver log, and the session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LedgerSnapshot {
    pub version: u32,
    #[serde(default)]
    pub session: SessionState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<i64>,
    #[serde(default)]
    pub items: Vec<SyncItem>,
    #[serde(default)]
    pub conflicts: Vec<PendingConflict>,
    /// Completed item ids, oldest completion first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub completed: Vec<ItemId>,
    /// Resolution log, newest first
    #[serde(default)]
    pub resolved: Vec<ResolvedConflict>,
}

impl Default for LedgerSnapshot {
    fn default() -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            session: SessionState::Idle,
            session_error: None,
            started_at: None,
            items: Vec::new(),
            conflicts: Vec::new(),
            completed: Vec::new(),
            resolved: Vec::new(),
        }
    }
}

impl LedgerSnapshot {
    /// Capture the current state
    #[must_use]
    pub fn capture(ledger: &Ledger, resolver: &ConflictResolver, session: &SyncSession) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            session: session.state(),
            session_error: session.error().map(str::to_string),
            started_at: session.started_at(),
            items: ledger.items().to_vec(),
            conflicts: ledger
                .conflicts()
                .map(|(item_id, record)| PendingConflict {
                    item_id: item_id.clone(),
                    record: record.clone(),
                })
                .collect(),
            completed: ledger.completed_order().cloned().collect(),
            resolved: resolver.log(),
        }
    }

    /// Rebuild runtime state, validating item/conflict consistency
    pub fn into_parts(self, config: &LedgerConfig) -> Result<(Ledger, ConflictResolver, SyncSession)> {
        let conflicts = self
            .conflicts
            .into_iter()
            .map(|pending| (pending.item_id, pending.record))
            .collect();
        let ledger = Ledger::from_parts(
            self.items,
            conflicts,
            self.completed,
            config.history_limit,
        )?;
        let resolver = config.new_resolver().with_log(self.resolved);
        let session = SyncSession::restore(self.session, self.session_error, self.started_at);
        Ok((ledger, resolver, session))
    }
}

/// Render a snapshot as pretty-printed JSON
pub fn render_json_snapshot(snapshot: &LedgerSnapshot) -> serde_json::Result<String> {
    serde_json::to_string_pretty(snapshot)
}

/// Parse a snapshot, rejecting unsupported versions
pub fn parse_json_snapshot(payload: &str) -> Result<LedgerSnapshot> {
    let snapshot: LedgerSnapshot = serde_json::from_str(payload)?;
    if snapshot.version != SNAPSHOT_VERSION {
        return Err(Error::Validation(format!(
            "unsupported snapshot version {} (expected {})",
            snapshot.version, SNAPSHOT_VERSION
        )));
    }
    Ok(snapshot)
}

/// Render a human-readable Markdown report of a snapshot
#[must_use]
pub fn render_markdown_report(snapshot: &LedgerSnapshot) -> String {
    let mut output = String::new();
    let progress = compute(&snapshot.items);

    let _ = writeln!(output, "# Sync report");
    let _ = writeln!(output);
    let _ = writeln!(output, "- session: {}", snapshot.session);
    if let Some(error) = &snapshot.session_error {
        let _ = writeln!(output, "- session error: {error}");
    }
    let _ = writeln!(
        output,
        "- items: {} total, {} completed, {} failed, {} syncing, {} pending, {} conflicts",
        progress.total,
        progress.completed,
        progress.failed,
        progress.in_progress,
        progress.pending,
        progress.conflicts
    );
    let _ = writeln!(
        output,
        "- transferred: {} of {}",
        format_bytes(progress.bytes_transferred),
        format_bytes(progress.total_bytes)
    );

    if !snapshot.items.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "## Items");
        let _ = writeln!(output);
        let _ = writeln!(output, "| id | type | description | status | detail |");
        let _ = writeln!(output, "|----|------|-------------|--------|--------|");
        for item in &snapshot.items {
            let detail = match (item.status.progress(), item.status.error()) {
                (Some(progress), _) => format!("{progress}%"),
                (_, Some(error)) => error.to_string(),
                _ => String::new(),
            };
            let _ = writeln!(
                output,
                "| {} | {} | {} | {} | {} |",
                item.id,
                item.item_type,
                item.description,
                item.kind(),
                detail
            );
        }
    }

    if !snapshot.conflicts.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "## Open conflicts");
        for pending in &snapshot.conflicts {
            let record = &pending.record;
            let _ = writeln!(output);
            let _ = writeln!(
                output,
                "### {} ({}.{})",
                pending.item_id, record.entity_name, record.field_name
            );
            let _ = writeln!(
                output,
                "- local: {} ({}, {})",
                record.local_value,
                record.local_author,
                format_timestamp(record.local_timestamp)
            );
            let _ = writeln!(
                output,
                "- server: {} ({}, {})",
                record.server_value,
                record.server_author,
                format_timestamp(record.server_timestamp)
            );
        }
    }

    output
}
