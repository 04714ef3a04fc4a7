//! Ledger configuration.
//!
//! Provides `LedgerConfig`, read from a JSON file by clients. A missing file
//! yields the defaults; unknown fields and unsupported versions are rejected.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::ledger::{Ledger, DEFAULT_HISTORY_LIMIT};
use crate::sync::{ConflictResolver, ReflagPolicy, DEFAULT_RESOLVED_LIMIT};

const CONFIG_SCHEMA_VERSION: u32 = 1;

/// Tunables for the ledger and conflict resolver
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LedgerConfig {
    #[serde(default = "default_config_version")]
    pub version: u32,
    /// Completed items kept before the oldest are evicted
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    /// Resolved conflicts kept for display
    #[serde(default = "default_resolved_limit")]
    pub resolved_conflict_limit: usize,
    /// Behavior when a conflict is flagged on an item already in conflict
    #[serde(default)]
    pub reflag_policy: ReflagPolicy,
}

const fn default_config_version() -> u32 {
    CONFIG_SCHEMA_VERSION
}

const fn default_history_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}

const fn default_resolved_limit() -> usize {
    DEFAULT_RESOLVED_LIMIT
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_SCHEMA_VERSION,
            history_limit: DEFAULT_HISTORY_LIMIT,
            resolved_conflict_limit: DEFAULT_RESOLVED_LIMIT,
            reflag_policy: ReflagPolicy::default(),
        }
    }
}

impl LedgerConfig {
    /// Load config from `path`, falling back to defaults when the file is absent
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)?;
        parse_ledger_config(&raw).map_err(|error| match error {
            Error::Config(message) => {
                Error::Config(format!("{} ({})", message, path.display()))
            }
            other => other,
        })
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        self.validate()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let serialized = serde_json::to_string_pretty(self)?;
        std::fs::write(path, serialized)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.version != CONFIG_SCHEMA_VERSION {
            return Err(Error::Config(format!(
                "unsupported config version {} (expected {})",
                self.version, CONFIG_SCHEMA_VERSION
            )));
        }
        if self.history_limit == 0 {
            return Err(Error::Config(
                "history_limit must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Empty ledger sized by this config
    #[must_use]
    pub fn new_ledger(&self) -> Ledger {
        Ledger::with_history_limit(self.history_limit)
    }

    #[must_use]
    pub fn new_resolver(&self) -> ConflictResolver {
        ConflictResolver::new(self.reflag_policy, self.resolved_conflict_limit)
    }
}

/// Parse and validate a config from a raw JSON payload
pub fn parse_ledger_config(payload: &str) -> Result<LedgerConfig> {
    let config: LedgerConfig = serde_json::from_str(payload)
        .map_err(|error| Error::Config(format!("invalid config JSON: {error}")))?;
    config.validate()?;
    Ok(config)
}
