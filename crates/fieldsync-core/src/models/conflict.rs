//! Sync conflict models

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ItemId;

/// Outstanding disagreement on a single field of a single entity.
///
/// Values are opaque rendered strings; no merge semantics are assumed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictRecord {
    /// Entity the field belongs to (e.g. a customer name)
    pub entity_name: String,
    /// Field under disagreement
    pub field_name: String,
    /// Locally edited value
    pub local_value: String,
    /// Value currently held by the server
    pub server_value: String,
    /// Local edit timestamp (Unix ms), display only
    pub local_timestamp: i64,
    /// Server edit timestamp (Unix ms), display only
    pub server_timestamp: i64,
    pub local_author: String,
    pub server_author: String,
}

impl ConflictRecord {
    #[must_use]
    pub fn new(
        entity_name: impl Into<String>,
        field_name: impl Into<String>,
        local_value: impl Into<String>,
        server_value: impl Into<String>,
    ) -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        Self {
            entity_name: entity_name.into(),
            field_name: field_name.into(),
            local_value: local_value.into(),
            server_value: server_value.into(),
            local_timestamp: now,
            server_timestamp: now,
            local_author: String::new(),
            server_author: String::new(),
        }
    }

    #[must_use]
    pub fn with_local_provenance(mut self, author: impl Into<String>, timestamp: i64) -> Self {
        self.local_author = author.into();
        self.local_timestamp = timestamp;
        self
    }

    #[must_use]
    pub fn with_server_provenance(mut self, author: impl Into<String>, timestamp: i64) -> Self {
        self.server_author = author.into();
        self.server_timestamp = timestamp;
        self
    }
}

/// Decision applied to a pending conflict
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", content = "value", rename_all = "snake_case")]
pub enum Resolution {
    KeepLocal,
    KeepServer,
    /// Caller-supplied merged value, stored verbatim
    Merge(String),
}

impl Resolution {
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::KeepLocal => "keep-local",
            Self::KeepServer => "keep-server",
            Self::Merge(_) => "merge",
        }
    }

    /// Value that wins under this decision
    #[must_use]
    pub fn chosen_value(&self, record: &ConflictRecord) -> String {
        match self {
            Self::KeepLocal => record.local_value.clone(),
            Self::KeepServer => record.server_value.clone(),
            Self::Merge(value) => value.clone(),
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Record of an applied resolution, kept in a bounded log for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedConflict {
    /// Item whose conflict was resolved
    pub item_id: ItemId,
    /// The record as it stood when resolved
    pub record: ConflictRecord,
    pub resolution: Resolution,
    /// Winning value
    pub chosen_value: String,
    /// Resolution timestamp (Unix ms)
    pub resolved_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ConflictRecord {
        ConflictRecord::new("Müller GmbH", "phone", "+49 1", "+49 2")
            .with_local_provenance("anna", 100)
            .with_server_provenance("backoffice", 200)
    }

    #[test]
    fn test_chosen_value_follows_decision() {
        let record = record();
        assert_eq!(Resolution::KeepLocal.chosen_value(&record), "+49 1");
        assert_eq!(Resolution::KeepServer.chosen_value(&record), "+49 2");
        assert_eq!(
            Resolution::Merge("+49 1 / +49 2".to_string()).chosen_value(&record),
            "+49 1 / +49 2"
        );
    }

    #[test]
    fn test_provenance_builders() {
        let record = record();
        assert_eq!(record.local_author, "anna");
        assert_eq!(record.local_timestamp, 100);
        assert_eq!(record.server_author, "backoffice");
        assert_eq!(record.server_timestamp, 200);
    }

    #[test]
    fn test_resolution_serialization() {
        let json = serde_json::to_string(&Resolution::Merge("x".to_string())).unwrap();
        assert_eq!(json, r#"{"decision":"merge","value":"x"}"#);
        let parsed: Resolution = serde_json::from_str(r#"{"decision":"keep_local"}"#).unwrap();
        assert_eq!(parsed, Resolution::KeepLocal);
    }
}
