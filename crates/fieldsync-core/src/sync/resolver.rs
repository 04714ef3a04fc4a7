//! Manual conflict resolution

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::ledger::Ledger;
use crate::models::{ConflictRecord, ItemId, ItemStatus, ResolvedConflict, Resolution};

/// Resolved conflicts retained for display
pub const DEFAULT_RESOLVED_LIMIT: usize = 50;

/// What `flag_conflict` does when the item is already in conflict
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReflagPolicy {
    /// Fail with `InvalidState`; the first record stands
    #[default]
    Reject,
    /// Replace the pending record with the newer one
    Overwrite,
}

/// Flags items as conflicting and applies resolution decisions.
///
/// Both operations change the item status and its conflict record in a
/// single ledger mutation.
#[derive(Debug, Clone)]
pub struct ConflictResolver {
    reflag: ReflagPolicy,
    resolved: VecDeque<ResolvedConflict>,
    log_limit: usize,
}

impl Default for ConflictResolver {
    fn default() -> Self {
        Self::new(ReflagPolicy::default(), DEFAULT_RESOLVED_LIMIT)
    }
}

impl ConflictResolver {
    #[must_use]
    pub fn new(reflag: ReflagPolicy, log_limit: usize) -> Self {
        Self {
            reflag,
            resolved: VecDeque::new(),
            log_limit,
        }
    }

    /// Restore a persisted resolution log (newest first)
    #[must_use]
    pub fn with_log(mut self, resolved: Vec<ResolvedConflict>) -> Self {
        self.resolved = resolved.into_iter().take(self.log_limit).collect();
        self
    }

    #[must_use]
    pub const fn reflag_policy(&self) -> ReflagPolicy {
        self.reflag
    }

    /// Move an item into `Conflict` and store its record.
    ///
    /// Fails with `NotFound` for unknown ids and `InvalidState` for completed
    /// items. Items already in conflict follow the [`ReflagPolicy`].
    pub fn flag_conflict(
        &self,
        ledger: &mut Ledger,
        id: &ItemId,
        record: ConflictRecord,
    ) -> Result<()> {
        let item = ledger
            .get(id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;

        match item.status {
            ItemStatus::Completed => {
                return Err(Error::InvalidState(format!(
                    "item {id} is already completed"
                )));
            }
            ItemStatus::Conflict if self.reflag == ReflagPolicy::Reject => {
                return Err(Error::InvalidState(format!(
                    "item {id} already has a pending conflict"
                )));
            }
            _ => {}
        }

        tracing::info!(
            "Conflict flagged on {} ({}.{})",
            id,
            record.entity_name,
            record.field_name
        );
        ledger.enter_conflict(id, record)
    }

    /// Apply a decision, clear the record and complete the item.
    ///
    /// Fails with `NotFound` when no conflict is pending for `id`.
    pub fn resolve(
        &mut self,
        ledger: &mut Ledger,
        id: &ItemId,
        resolution: Resolution,
    ) -> Result<ResolvedConflict> {
        if ledger.conflict(id).is_none() {
            return Err(Error::NotFound(format!("no pending conflict for {id}")));
        }

        let record = ledger.leave_conflict(id)?;
        let resolved = ResolvedConflict {
            item_id: id.clone(),
            chosen_value: resolution.chosen_value(&record),
            record,
            resolution,
            resolved_at: chrono::Utc::now().timestamp_millis(),
        };
        tracing::info!("Conflict on {} resolved with {}", id, resolved.resolution);

        self.resolved.push_front(resolved.clone());
        self.resolved.truncate(self.log_limit);
        Ok(resolved)
    }

    /// Most recent resolutions, newest first
    pub fn recent(&self, limit: usize) -> impl Iterator<Item = &ResolvedConflict> + '_ {
        self.resolved.iter().take(limit)
    }

    /// Full resolution log, newest first
    #[must_use]
    pub fn log(&self) -> Vec<ResolvedConflict> {
        self.resolved.iter().cloned().collect()
    }
}
