//! In-memory sync ledger
//!
//! The ledger is the single mutable store of sync items. Conflict records
//! are held beside the items they belong to, so flagging or resolving a
//! conflict changes the item status and the record in one mutation.

mod filter;

use std::collections::{HashMap, HashSet, VecDeque};

use crate::error::{Error, Result};
use crate::models::{ConflictRecord, ItemId, ItemStatus, StatusKind, StatusUpdate, SyncItem};

pub use filter::StatusFilter;

/// Completed items retained before the oldest are evicted
pub const DEFAULT_HISTORY_LIMIT: usize = 200;

/// Ordered collection of sync items and their pending conflicts
#[derive(Debug, Clone)]
pub struct Ledger {
    items: Vec<SyncItem>,
    index: HashMap<ItemId, usize>,
    conflicts: HashMap<ItemId, ConflictRecord>,
    completed_order: VecDeque<ItemId>,
    history_limit: usize,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    /// Create an empty ledger with the default history window
    #[must_use]
    pub fn new() -> Self {
        Self::with_history_limit(DEFAULT_HISTORY_LIMIT)
    }

    /// Create an empty ledger retaining at most `history_limit` completed items.
    ///
    /// A limit of zero is raised to one.
    #[must_use]
    pub fn with_history_limit(history_limit: usize) -> Self {
        Self {
            items: Vec::new(),
            index: HashMap::new(),
            conflicts: HashMap::new(),
            completed_order: VecDeque::new(),
            history_limit: history_limit.max(1),
        }
    }

    /// Rebuild a ledger from persisted parts.
    ///
    /// Every conflict record must belong to an item in `Conflict` status and
    /// every such item must have a record. `completed_order` lists completed
    /// ids oldest first; completed items missing from it are ordered by
    /// timestamp ahead of the listed ones.
    pub fn from_parts(
        items: Vec<SyncItem>,
        conflicts: Vec<(ItemId, ConflictRecord)>,
        completed_order: Vec<ItemId>,
        history_limit: usize,
    ) -> Result<Self> {
        let mut ledger = Self::with_history_limit(history_limit);

        for item in items {
            if ledger.index.contains_key(&item.id) {
                return Err(Error::Validation(format!("duplicate item id {}", item.id)));
            }
            if item.status != ItemStatus::Conflict {
                StatusUpdate::from(item.status.clone()).validate()?;
            }
            ledger.push(item);
        }

        for (id, record) in conflicts {
            match ledger.get(&id) {
                Some(item) if item.status == ItemStatus::Conflict => {
                    ledger.conflicts.insert(id, record);
                }
                Some(item) => {
                    return Err(Error::Validation(format!(
                        "conflict record for {id} but item is {}",
                        item.kind()
                    )));
                }
                None => return Err(Error::NotFound(id.to_string())),
            }
        }

        if let Some(orphan) = ledger
            .list_by_status(StatusFilter::Only(StatusKind::Conflict))
            .find(|item| !ledger.conflicts.contains_key(&item.id))
        {
            return Err(Error::Validation(format!(
                "item {} is in conflict without a conflict record",
                orphan.id
            )));
        }

        ledger.restore_completion_order(completed_order);
        ledger.enforce_history();
        Ok(ledger)
    }

    /// Insert or replace an item by id.
    ///
    /// Replacement keeps the item's original position. Items in conflict
    /// cannot be inserted or replaced here; use the conflict resolver.
    pub fn upsert(&mut self, mut item: SyncItem) -> Result<()> {
        if item.id.is_blank() {
            return Err(Error::Validation("item id must not be empty".to_string()));
        }
        item.status = StatusUpdate::from(item.status).validate()?;

        if let Some(&position) = self.index.get(&item.id) {
            if self.items[position].status == ItemStatus::Conflict {
                return Err(Error::InvalidState(format!(
                    "item {} has an unresolved conflict",
                    item.id
                )));
            }
            tracing::debug!("Replacing sync item {} ({})", item.id, item.kind());
            let was_completed = self.items[position].status == ItemStatus::Completed;
            let now_completed = item.status == ItemStatus::Completed;
            let id = item.id.clone();
            self.items[position] = item;
            self.track_completion(&id, was_completed, now_completed);
        } else {
            tracing::debug!("Inserting sync item {} ({})", item.id, item.kind());
            self.push(item);
        }

        self.enforce_history();
        Ok(())
    }

    /// Change an item's status.
    ///
    /// Nothing is modified when the update is rejected.
    pub fn update_status(&mut self, id: &ItemId, update: StatusUpdate) -> Result<()> {
        let position = self.position(id)?;
        if self.items[position].status == ItemStatus::Conflict {
            return Err(Error::InvalidState(format!(
                "item {id} has an unresolved conflict"
            )));
        }

        let status = update.validate()?;
        tracing::debug!(
            "Sync item {} {} -> {}",
            id,
            self.items[position].kind(),
            status.kind()
        );
        self.set_status_at(position, status);
        self.enforce_history();
        Ok(())
    }

    /// Items matching `filter`, in ledger order
    pub fn list_by_status(&self, filter: StatusFilter) -> impl Iterator<Item = &SyncItem> + '_ {
        self.items.iter().filter(move |item| filter.matches(item))
    }

    /// Delete an entry and any conflict record attached to it
    pub fn remove(&mut self, id: &ItemId) -> Result<SyncItem> {
        let position = self.position(id)?;
        tracing::debug!("Removing sync item {}", id);
        Ok(self.remove_at(position))
    }

    #[must_use]
    pub fn get(&self, id: &ItemId) -> Option<&SyncItem> {
        self.index.get(id).map(|&position| &self.items[position])
    }

    #[must_use]
    pub fn contains(&self, id: &ItemId) -> bool {
        self.index.contains_key(id)
    }

    #[must_use]
    pub fn items(&self) -> &[SyncItem] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub const fn history_limit(&self) -> usize {
        self.history_limit
    }

    /// Pending conflict record for an item
    #[must_use]
    pub fn conflict(&self, id: &ItemId) -> Option<&ConflictRecord> {
        self.conflicts.get(id)
    }

    /// Pending conflicts in ledger order
    pub fn conflicts(&self) -> impl Iterator<Item = (&ItemId, &ConflictRecord)> + '_ {
        self.items
            .iter()
            .filter_map(|item| self.conflicts.get_key_value(&item.id))
    }

    /// Completed ids, oldest completion first
    pub fn completed_order(&self) -> impl Iterator<Item = &ItemId> + '_ {
        self.completed_order.iter()
    }

    pub(crate) fn enter_conflict(&mut self, id: &ItemId, record: ConflictRecord) -> Result<()> {
        let position = self.position(id)?;
        self.set_status_at(position, ItemStatus::Conflict);
        self.conflicts.insert(id.clone(), record);
        Ok(())
    }

    pub(crate) fn leave_conflict(&mut self, id: &ItemId) -> Result<ConflictRecord> {
        let position = self.position(id)?;
        let record = self
            .conflicts
            .remove(id)
            .ok_or_else(|| Error::NotFound(format!("no pending conflict for {id}")))?;
        self.set_status_at(position, ItemStatus::Completed);
        self.enforce_history();
        Ok(record)
    }

    fn position(&self, id: &ItemId) -> Result<usize> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    fn push(&mut self, item: SyncItem) {
        let id = item.id.clone();
        let completed = item.status == ItemStatus::Completed;
        self.index.insert(id.clone(), self.items.len());
        self.items.push(item);
        self.track_completion(&id, false, completed);
    }

    fn set_status_at(&mut self, position: usize, status: ItemStatus) {
        let item = &mut self.items[position];
        let was_completed = item.status == ItemStatus::Completed;
        let now_completed = status == ItemStatus::Completed;
        item.status = status;
        item.timestamp = chrono::Utc::now().timestamp_millis();
        let id = item.id.clone();
        self.track_completion(&id, was_completed, now_completed);
    }

    fn track_completion(&mut self, id: &ItemId, was_completed: bool, now_completed: bool) {
        match (was_completed, now_completed) {
            (false, true) => self.completed_order.push_back(id.clone()),
            (true, false) => self.completed_order.retain(|completed| completed != id),
            _ => {}
        }
    }

    fn remove_at(&mut self, position: usize) -> SyncItem {
        let item = self.items.remove(position);
        self.index.remove(&item.id);
        self.conflicts.remove(&item.id);
        if item.status == ItemStatus::Completed {
            self.completed_order.retain(|completed| completed != &item.id);
        }
        for (offset, later) in self.items[position..].iter().enumerate() {
            self.index.insert(later.id.clone(), position + offset);
        }
        item
    }

    fn restore_completion_order(&mut self, persisted: Vec<ItemId>) {
        let completed = self.completed_order.iter().cloned().collect::<HashSet<_>>();
        let mut seen = HashSet::with_capacity(completed.len());
        let listed = persisted
            .into_iter()
            .filter(|id| completed.contains(id) && seen.insert(id.clone()))
            .collect::<Vec<_>>();

        let mut unlisted = self
            .items
            .iter()
            .filter(|item| completed.contains(&item.id) && !seen.contains(&item.id))
            .map(|item| (item.timestamp, item.id.clone()))
            .collect::<Vec<_>>();
        unlisted.sort_by_key(|(timestamp, _)| *timestamp);

        self.completed_order = unlisted
            .into_iter()
            .map(|(_, id)| id)
            .chain(listed)
            .collect();
    }

    fn enforce_history(&mut self) {
        while self.completed_order.len() > self.history_limit {
            let Some(oldest) = self.completed_order.pop_front() else {
                break;
            };
            if let Some(&position) = self.index.get(&oldest) {
                tracing::debug!("Evicting completed sync item {} from history", oldest);
                self.remove_at(position);
            }
        }
    }
}
