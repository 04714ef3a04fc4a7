//! Sync workflow components: progress aggregation, conflict resolution and
//! the session state machine. All of them operate on a [`Ledger`] passed in
//! by reference.
//!
//! [`Ledger`]: crate::ledger::Ledger

mod progress;
mod resolver;
mod session;

pub use progress::{compute, SyncProgress};
pub use resolver::{ConflictResolver, ReflagPolicy, DEFAULT_RESOLVED_LIMIT};
pub use session::{SessionState, SyncSession};
