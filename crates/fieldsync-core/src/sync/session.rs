//! Session-level sync state machine

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::ledger::{Ledger, StatusFilter};
use crate::models::{ItemId, StatusKind, StatusUpdate};
use crate::sync::SyncProgress;

/// Overall state of a sync session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    Idle,
    Syncing,
    Paused,
    Completed,
    Error,
}

impl SessionState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Syncing => "syncing",
            Self::Paused => "paused",
            Self::Completed => "completed",
            Self::Error => "error",
        }
    }

    /// Syncing or paused
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Syncing | Self::Paused)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Governs start/pause/resume/cancel for one session, independent of
/// per-item status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncSession {
    state: SessionState,
    error: Option<String>,
    started_at: Option<i64>,
}

impl SyncSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore a persisted session. Only `Error` keeps its reason.
    #[must_use]
    pub fn restore(state: SessionState, error: Option<String>, started_at: Option<i64>) -> Self {
        let error = if state == SessionState::Error {
            error.or_else(|| Some("unknown error".to_string()))
        } else {
            None
        };
        Self {
            state,
            error,
            started_at,
        }
    }

    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Reason reported with the last `fail()`, while in `Error`
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Session start (Unix ms)
    #[must_use]
    pub const fn started_at(&self) -> Option<i64> {
        self.started_at
    }

    /// Time since the session started
    #[must_use]
    pub fn elapsed(&self, now_ms: i64) -> Option<Duration> {
        let started_at = self.started_at?;
        let millis = u64::try_from(now_ms.saturating_sub(started_at)).unwrap_or(0);
        Some(Duration::from_millis(millis))
    }

    /// Begin a new session from `Idle`, `Completed` or `Error`
    pub fn start(&mut self) -> Result<()> {
        self.require(
            &[SessionState::Idle, SessionState::Completed, SessionState::Error],
            "start",
        )?;
        self.error = None;
        self.started_at = Some(chrono::Utc::now().timestamp_millis());
        self.transition(SessionState::Syncing);
        Ok(())
    }

    /// Stop new transfers from starting. In-flight transfers are not rolled back.
    pub fn pause(&mut self) -> Result<()> {
        self.require(&[SessionState::Syncing], "pause")?;
        self.transition(SessionState::Paused);
        Ok(())
    }

    pub fn resume(&mut self) -> Result<()> {
        self.require(&[SessionState::Paused], "resume")?;
        self.transition(SessionState::Syncing);
        Ok(())
    }

    /// Return to `Idle`, reverting every syncing item to pending.
    ///
    /// Completed and failed items are untouched. Returns the number of
    /// reverted items.
    pub fn cancel(&mut self, ledger: &mut Ledger) -> Result<usize> {
        self.require(&[SessionState::Syncing, SessionState::Paused], "cancel")?;

        let in_flight = ledger
            .list_by_status(StatusFilter::Only(StatusKind::Syncing))
            .map(|item| item.id.clone())
            .collect::<Vec<ItemId>>();
        for id in &in_flight {
            ledger.update_status(id, StatusUpdate::pending())?;
        }

        tracing::info!("Sync cancelled; {} in-flight items reverted", in_flight.len());
        self.transition(SessionState::Idle);
        Ok(in_flight.len())
    }

    /// Engine signal that the session cannot continue
    pub fn fail(&mut self, reason: impl Into<String>) -> Result<()> {
        let reason = reason.into().trim().to_string();
        if reason.is_empty() {
            return Err(Error::Validation(
                "session failure requires a reason".to_string(),
            ));
        }
        self.require(&[SessionState::Syncing, SessionState::Paused], "fail")?;
        tracing::warn!("Sync session failed: {}", reason);
        self.error = Some(reason);
        self.transition(SessionState::Error);
        Ok(())
    }

    /// Complete the session once every item has settled.
    ///
    /// Only acts while `Syncing`. Returns true when the state changed.
    pub fn observe(&mut self, progress: &SyncProgress) -> bool {
        if self.state == SessionState::Syncing && progress.is_settled() {
            tracing::info!(
                "Sync completed: {} completed, {} failed",
                progress.completed,
                progress.failed
            );
            self.transition(SessionState::Completed);
            return true;
        }
        false
    }

    fn require(&self, allowed: &[SessionState], operation: &str) -> Result<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(Error::InvalidState(format!(
                "cannot {operation} while session is {}",
                self.state
            )))
        }
    }

    fn transition(&mut self, next: SessionState) {
        tracing::info!("Sync session {} -> {}", self.state, next);
        self.state = next;
    }
}
