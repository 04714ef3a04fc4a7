//! fieldsync-core - Core library for fieldsync
//!
//! This crate contains the sync ledger, progress aggregation, conflict
//! resolution, and session state machine shared by every fieldsync client.
//! The network sync engine itself lives outside this crate and drives it
//! through [`services::SyncService`].

pub mod collaborators;
pub mod config;
pub mod error;
pub mod ledger;
pub mod models;
pub mod services;
pub mod snapshot;
pub mod sync;
pub mod util;

pub use error::{Error, Result};
pub use ledger::{Ledger, StatusFilter};
pub use models::{
    ConflictRecord, ItemId, ItemStatus, ResolvedConflict, Resolution, StatusKind, StatusUpdate,
    SyncItem,
};
pub use sync::{ConflictResolver, ReflagPolicy, SessionState, SyncProgress, SyncSession};
