//! Shared sync service wrapper used across clients.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex};

use crate::config::LedgerConfig;
use crate::error::{Error, Result};
use crate::ledger::{Ledger, StatusFilter};
use crate::models::{
    ConflictRecord, ItemId, ResolvedConflict, Resolution, StatusKind, StatusUpdate, SyncItem,
};
use crate::snapshot::{LedgerSnapshot, PendingConflict};
use crate::sync::{compute, ConflictResolver, SessionState, SyncProgress, SyncSession};

/// Ledger, resolver and session guarded together so every operation sees
/// and leaves a consistent state.
#[derive(Debug)]
struct Workspace {
    ledger: Ledger,
    resolver: ConflictResolver,
    session: SyncSession,
}

impl Workspace {
    /// Reject transfers that would begin while the session is paused.
    ///
    /// Progress updates for items already syncing are still accepted.
    fn check_transfer_allowed(&self, id: &ItemId, next: StatusKind) -> Result<()> {
        if next != StatusKind::Syncing || self.session.state() != SessionState::Paused {
            return Ok(());
        }
        let already_syncing = self
            .ledger
            .get(id)
            .is_some_and(|item| item.kind() == StatusKind::Syncing);
        if already_syncing {
            return Ok(());
        }
        tracing::warn!("Rejected transfer start for {} while session is paused", id);
        Err(Error::InvalidState(format!(
            "cannot start transferring {id} while the session is paused"
        )))
    }

    fn revert_to_pending(&mut self, kinds: &[StatusKind]) -> Result<usize> {
        let ids = self
            .ledger
            .list_by_status(StatusFilter::All)
            .filter(|item| kinds.contains(&item.kind()))
            .map(|item| item.id.clone())
            .collect::<Vec<_>>();
        for id in &ids {
            self.ledger.update_status(id, StatusUpdate::pending())?;
        }
        Ok(ids.len())
    }

    fn progress(&self) -> SyncProgress {
        compute(self.ledger.items())
    }
}

/// Thread-safe service serializing every ledger mutation.
///
/// Each call takes the lock once, so updates to the same item apply in call
/// order and readers never observe a ledger mid-mutation. Progress is
/// recomputed after every mutation and published to subscribers.
#[derive(Clone)]
pub struct SyncService {
    state: Arc<Mutex<Workspace>>,
    progress_tx: Arc<watch::Sender<SyncProgress>>,
}

impl SyncService {
    /// Create a service with an empty ledger
    #[must_use]
    pub fn new(config: &LedgerConfig) -> Self {
        Self::from_workspace(Workspace {
            ledger: config.new_ledger(),
            resolver: config.new_resolver(),
            session: SyncSession::new(),
        })
    }

    /// Restore a service from a persisted snapshot
    pub fn from_snapshot(snapshot: LedgerSnapshot, config: &LedgerConfig) -> Result<Self> {
        let (ledger, resolver, session) = snapshot.into_parts(config)?;
        Ok(Self::from_workspace(Workspace {
            ledger,
            resolver,
            session,
        }))
    }

    fn from_workspace(workspace: Workspace) -> Self {
        let (progress_tx, _) = watch::channel(workspace.progress());
        Self {
            state: Arc::new(Mutex::new(workspace)),
            progress_tx: Arc::new(progress_tx),
        }
    }

    /// Capture the current state for persistence
    pub async fn snapshot(&self) -> LedgerSnapshot {
        let workspace = self.state.lock().await;
        LedgerSnapshot::capture(&workspace.ledger, &workspace.resolver, &workspace.session)
    }

    /// Receive a fresh progress value after every mutation
    pub fn subscribe_progress(&self) -> watch::Receiver<SyncProgress> {
        self.progress_tx.subscribe()
    }

    /// Insert or replace an item.
    pub async fn upsert(&self, item: SyncItem) -> Result<()> {
        let mut workspace = self.state.lock().await;
        workspace.check_transfer_allowed(&item.id, item.kind())?;
        workspace.ledger.upsert(item)?;
        self.publish(&mut workspace);
        Ok(())
    }

    /// Change an item's status.
    pub async fn update_status(&self, id: &ItemId, update: StatusUpdate) -> Result<()> {
        let mut workspace = self.state.lock().await;
        if !workspace.ledger.contains(id) {
            return Err(Error::NotFound(id.to_string()));
        }
        workspace.check_transfer_allowed(id, update.kind)?;
        workspace.ledger.update_status(id, update)?;
        self.publish(&mut workspace);
        Ok(())
    }

    /// Delete an item and any pending conflict.
    pub async fn remove(&self, id: &ItemId) -> Result<SyncItem> {
        let mut workspace = self.state.lock().await;
        let removed = workspace.ledger.remove(id)?;
        self.publish(&mut workspace);
        Ok(removed)
    }

    /// Flag a field-level conflict on an item.
    pub async fn flag_conflict(&self, id: &ItemId, record: ConflictRecord) -> Result<()> {
        let mut guard = self.state.lock().await;
        let workspace = &mut *guard;
        workspace
            .resolver
            .flag_conflict(&mut workspace.ledger, id, record)?;
        self.publish(workspace);
        Ok(())
    }

    /// Apply a resolution decision to a pending conflict.
    pub async fn resolve(&self, id: &ItemId, resolution: Resolution) -> Result<ResolvedConflict> {
        let mut guard = self.state.lock().await;
        let workspace = &mut *guard;
        let resolved = workspace
            .resolver
            .resolve(&mut workspace.ledger, id, resolution)?;
        self.publish(workspace);
        Ok(resolved)
    }

    /// Start a new session. An already settled ledger completes immediately.
    pub async fn start(&self) -> Result<()> {
        let mut workspace = self.state.lock().await;
        workspace.session.start()?;
        self.publish(&mut workspace);
        Ok(())
    }

    pub async fn pause(&self) -> Result<()> {
        let mut workspace = self.state.lock().await;
        workspace.session.pause()
    }

    pub async fn resume(&self) -> Result<()> {
        let mut workspace = self.state.lock().await;
        workspace.session.resume()?;
        self.publish(&mut workspace);
        Ok(())
    }

    /// Cancel the session; returns the number of reverted in-flight items.
    pub async fn cancel(&self) -> Result<usize> {
        let mut guard = self.state.lock().await;
        let workspace = &mut *guard;
        let reverted = workspace.session.cancel(&mut workspace.ledger)?;
        self.publish(workspace);
        Ok(reverted)
    }

    /// External signal that the engine cannot continue.
    pub async fn fail(&self, reason: &str) -> Result<()> {
        let mut workspace = self.state.lock().await;
        workspace.session.fail(reason)
    }

    /// Move failed items back to pending; returns how many moved.
    pub async fn retry_failed(&self) -> Result<usize> {
        let mut workspace = self.state.lock().await;
        let retried = workspace.revert_to_pending(&[StatusKind::Failed])?;
        tracing::info!("Retrying {} failed items", retried);
        self.publish(&mut workspace);
        Ok(retried)
    }

    /// Move failed and in-flight items back to pending; returns how many moved.
    pub async fn retry_all(&self) -> Result<usize> {
        let mut workspace = self.state.lock().await;
        let retried = workspace.revert_to_pending(&[StatusKind::Failed, StatusKind::Syncing])?;
        tracing::info!("Retrying {} items", retried);
        self.publish(&mut workspace);
        Ok(retried)
    }

    /// Items matching `filter`, in ledger order.
    pub async fn items(&self, filter: StatusFilter) -> Vec<SyncItem> {
        let workspace = self.state.lock().await;
        workspace.ledger.list_by_status(filter).cloned().collect()
    }

    pub async fn get(&self, id: &ItemId) -> Option<SyncItem> {
        let workspace = self.state.lock().await;
        workspace.ledger.get(id).cloned()
    }

    /// Progress of the current ledger snapshot.
    pub async fn progress(&self) -> SyncProgress {
        self.state.lock().await.progress()
    }

    /// Estimated time left in the active session.
    pub async fn estimate_remaining(&self) -> Option<Duration> {
        let workspace = self.state.lock().await;
        if !workspace.session.state().is_active() {
            return None;
        }
        let elapsed = workspace
            .session
            .elapsed(chrono::Utc::now().timestamp_millis())?;
        workspace.progress().estimate_remaining(elapsed)
    }

    pub async fn session_state(&self) -> SessionState {
        self.state.lock().await.session.state()
    }

    pub async fn session_error(&self) -> Option<String> {
        let workspace = self.state.lock().await;
        workspace.session.error().map(str::to_string)
    }

    /// Pending conflicts in ledger order.
    pub async fn conflicts(&self) -> Vec<PendingConflict> {
        let workspace = self.state.lock().await;
        workspace
            .ledger
            .conflicts()
            .map(|(item_id, record)| PendingConflict {
                item_id: item_id.clone(),
                record: record.clone(),
            })
            .collect()
    }

    pub async fn conflict(&self, id: &ItemId) -> Option<ConflictRecord> {
        let workspace = self.state.lock().await;
        workspace.ledger.conflict(id).cloned()
    }

    /// Recently resolved conflicts, newest first.
    pub async fn resolved_conflicts(&self, limit: usize) -> Vec<ResolvedConflict> {
        let workspace = self.state.lock().await;
        workspace.resolver.recent(limit).cloned().collect()
    }

    fn publish(&self, workspace: &mut Workspace) {
        let progress = workspace.progress();
        workspace.session.observe(&progress);
        self.progress_tx.send_replace(progress);
    }
}
