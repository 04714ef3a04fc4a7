//! Shared services used by fieldsync clients.

mod sync;

pub use sync::SyncService;
