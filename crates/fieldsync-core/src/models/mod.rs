//! Data models for fieldsync

mod conflict;
mod item;

pub use conflict::{ConflictRecord, ResolvedConflict, Resolution};
pub use item::{ItemId, ItemStatus, StatusKind, StatusUpdate, SyncItem};
