pub mod add;
pub mod common;
pub mod completions;
pub mod config;
pub mod conflict;
pub mod export;
pub mod list;
pub mod progress;
pub mod remove;
pub mod retry;
pub mod session;
pub mod update;
