//! Sync item model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{Error, Result};

/// Stable identifier of a sync item.
///
/// Ids are supplied by the sync engine; [`ItemId::generate`] produces a
/// UUID v7 (time-sortable) when the caller has none.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Wrap an engine-supplied identifier, trimming surrounding whitespace
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        Self(value.trim().to_string())
    }

    /// Create a new unique id using UUID v7
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Status tag without payload, used for filtering and user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    Pending,
    Syncing,
    Completed,
    Failed,
    Conflict,
}

impl StatusKind {
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::Syncing,
        Self::Completed,
        Self::Failed,
        Self::Conflict,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Syncing => "syncing",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Conflict => "conflict",
        }
    }
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let value = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value)
            .ok_or_else(|| Error::Validation(format!("unknown status '{}'", s.trim())))
    }
}

/// Per-item status. Each variant carries only the fields valid for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ItemStatus {
    Pending,
    Syncing { progress: u8 },
    Completed,
    Failed { error: String },
    Conflict,
}

impl ItemStatus {
    #[must_use]
    pub const fn kind(&self) -> StatusKind {
        match self {
            Self::Pending => StatusKind::Pending,
            Self::Syncing { .. } => StatusKind::Syncing,
            Self::Completed => StatusKind::Completed,
            Self::Failed { .. } => StatusKind::Failed,
            Self::Conflict => StatusKind::Conflict,
        }
    }

    /// Transfer progress, only present while syncing
    #[must_use]
    pub const fn progress(&self) -> Option<u8> {
        match self {
            Self::Syncing { progress } => Some(*progress),
            _ => None,
        }
    }

    /// Failure message, only present when failed
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed { error } => Some(error),
            _ => None,
        }
    }

    /// Completed or failed; the item needs no further work this session
    #[must_use]
    pub const fn is_settled(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed { .. })
    }

    /// Status label with the variant's payload, for display
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Syncing { progress } => format!("syncing ({progress}%)"),
            Self::Failed { error } => format!("failed: {error}"),
            other => other.kind().to_string(),
        }
    }
}

/// Requested status change, validated into an [`ItemStatus`].
///
/// Mirrors the loosely-typed `(status, progress?, error?)` triple that sync
/// engines report, so malformed combinations surface as
/// [`Error::Validation`] instead of being silently dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub kind: StatusKind,
    pub progress: Option<u8>,
    pub error: Option<String>,
}

impl StatusUpdate {
    #[must_use]
    pub const fn new(kind: StatusKind) -> Self {
        Self {
            kind,
            progress: None,
            error: None,
        }
    }

    #[must_use]
    pub const fn pending() -> Self {
        Self::new(StatusKind::Pending)
    }

    #[must_use]
    pub fn syncing(progress: u8) -> Self {
        Self::new(StatusKind::Syncing).with_progress(progress)
    }

    #[must_use]
    pub const fn completed() -> Self {
        Self::new(StatusKind::Completed)
    }

    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self::new(StatusKind::Failed).with_error(error)
    }

    #[must_use]
    pub fn with_progress(mut self, progress: u8) -> Self {
        self.progress = Some(progress);
        self
    }

    #[must_use]
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Validate the update into a concrete status.
    ///
    /// `Conflict` is rejected with [`Error::InvalidState`]: conflicts are
    /// only entered through the conflict resolver.
    pub fn validate(self) -> Result<ItemStatus> {
        if self.kind != StatusKind::Syncing && self.progress.is_some() {
            return Err(Error::Validation(format!(
                "progress is only valid for syncing items, not {}",
                self.kind
            )));
        }
        if self.kind != StatusKind::Failed && self.error.is_some() {
            return Err(Error::Validation(format!(
                "error message is only valid for failed items, not {}",
                self.kind
            )));
        }

        match self.kind {
            StatusKind::Pending => Ok(ItemStatus::Pending),
            StatusKind::Completed => Ok(ItemStatus::Completed),
            StatusKind::Syncing => {
                let progress = self.progress.unwrap_or(0);
                if progress > 100 {
                    return Err(Error::Validation(format!(
                        "progress must be within 0..=100, got {progress}"
                    )));
                }
                Ok(ItemStatus::Syncing { progress })
            }
            StatusKind::Failed => {
                let error = self
                    .error
                    .map(|error| error.trim().to_string())
                    .filter(|error| !error.is_empty())
                    .ok_or_else(|| {
                        Error::Validation("failed status requires an error message".to_string())
                    })?;
                Ok(ItemStatus::Failed { error })
            }
            StatusKind::Conflict => Err(Error::InvalidState(
                "conflicts must be flagged through the conflict resolver".to_string(),
            )),
        }
    }
}

impl From<ItemStatus> for StatusUpdate {
    fn from(status: ItemStatus) -> Self {
        match status {
            ItemStatus::Pending => Self::pending(),
            ItemStatus::Syncing { progress } => Self::syncing(progress),
            ItemStatus::Completed => Self::completed(),
            ItemStatus::Failed { error } => Self::failed(error),
            ItemStatus::Conflict => Self::new(StatusKind::Conflict),
        }
    }
}

/// One unit of synchronizable data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncItem {
    /// Unique identifier
    pub id: ItemId,
    /// Domain-entity tag ("customer", "project", ...); opaque to the ledger
    pub item_type: String,
    /// Human-readable label, display only
    pub description: String,
    /// Current status
    pub status: ItemStatus,
    /// Transfer volume, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
    /// Creation / last update timestamp (Unix ms); display only
    pub timestamp: i64,
}

impl SyncItem {
    /// Create a pending item
    #[must_use]
    pub fn new(id: ItemId, item_type: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id,
            item_type: item_type.into(),
            description: description.into(),
            status: ItemStatus::Pending,
            size_bytes: None,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    #[must_use]
    pub fn with_size(mut self, size_bytes: u64) -> Self {
        self.size_bytes = Some(size_bytes);
        self
    }

    #[must_use]
    pub fn with_status(mut self, status: ItemStatus) -> Self {
        self.status = status;
        self
    }

    #[must_use]
    pub const fn kind(&self) -> StatusKind {
        self.status.kind()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_id_trims_whitespace() {
        assert_eq!(ItemId::new("  42 ").as_str(), "42");
        assert!(ItemId::new("   ").is_blank());
    }

    #[test]
    fn test_item_id_generate_unique() {
        assert_ne!(ItemId::generate(), ItemId::generate());
    }

    #[test]
    fn test_status_kind_parse() {
        assert_eq!("Failed".parse::<StatusKind>().unwrap(), StatusKind::Failed);
        assert_eq!(
            " syncing ".parse::<StatusKind>().unwrap(),
            StatusKind::Syncing
        );
        assert!("done".parse::<StatusKind>().is_err());
    }

    #[test]
    fn test_syncing_defaults_progress_to_zero() {
        let status = StatusUpdate::new(StatusKind::Syncing).validate().unwrap();
        assert_eq!(status, ItemStatus::Syncing { progress: 0 });
    }

    #[test]
    fn test_syncing_rejects_progress_over_hundred() {
        let error = StatusUpdate::syncing(101).validate().unwrap_err();
        assert!(matches!(error, Error::Validation(_)));
    }

    #[test]
    fn test_failed_requires_error() {
        assert!(matches!(
            StatusUpdate::new(StatusKind::Failed).validate(),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            StatusUpdate::failed("   ").validate(),
            Err(Error::Validation(_))
        ));
        assert_eq!(
            StatusUpdate::failed(" timeout ").validate().unwrap(),
            ItemStatus::Failed {
                error: "timeout".to_string()
            }
        );
    }

    #[test]
    fn test_extra_fields_rejected() {
        assert!(StatusUpdate::completed().with_progress(10).validate().is_err());
        assert!(StatusUpdate::pending().with_error("boom").validate().is_err());
    }

    #[test]
    fn test_conflict_update_is_invalid_state() {
        let error = StatusUpdate::new(StatusKind::Conflict).validate().unwrap_err();
        assert!(matches!(error, Error::InvalidState(_)));
    }

    #[test]
    fn test_status_accessors() {
        let syncing = ItemStatus::Syncing { progress: 40 };
        assert_eq!(syncing.progress(), Some(40));
        assert_eq!(syncing.error(), None);

        let failed = ItemStatus::Failed {
            error: "offline".to_string(),
        };
        assert_eq!(failed.progress(), None);
        assert_eq!(failed.error(), Some("offline"));
        assert!(failed.is_settled());
        assert!(!ItemStatus::Conflict.is_settled());
    }

    #[test]
    fn test_status_serializes_with_kind_tag() {
        let json = serde_json::to_string(&ItemStatus::Syncing { progress: 5 }).unwrap();
        assert_eq!(json, r#"{"kind":"syncing","progress":5}"#);
        let parsed: ItemStatus = serde_json::from_str(r#"{"kind":"pending"}"#).unwrap();
        assert_eq!(parsed, ItemStatus::Pending);
    }

    #[test]
    fn describe_includes_payload() {
        assert_eq!(
            ItemStatus::Syncing { progress: 30 }.describe(),
            "syncing (30%)"
        );
        assert_eq!(
            ItemStatus::Failed {
                error: "HTTP 500".to_string()
            }
            .describe(),
            "failed: HTTP 500"
        );
        assert_eq!(ItemStatus::Pending.describe(), "pending");
    }
}
