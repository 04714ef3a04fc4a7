use fieldsync_core::util::{format_bytes, format_duration};
use fieldsync_core::{SessionState, SyncProgress};
use serde::Serialize;

use crate::commands::common::CommandContext;
use crate::error::CliError;

#[derive(Debug, Serialize)]
pub struct ProgressReport {
    pub session: SessionState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_error: Option<String>,
    pub percent: u8,
    #[serde(flatten)]
    pub progress: SyncProgress,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eta_seconds: Option<u64>,
}

pub async fn run_progress(as_json: bool, context: &CommandContext) -> Result<(), CliError> {
    let service = context.open_service()?;
    let progress = service.progress().await;
    let report = ProgressReport {
        session: service.session_state().await,
        session_error: service.session_error().await,
        percent: progress.percent(),
        progress,
        eta_seconds: service
            .estimate_remaining()
            .await
            .map(|remaining| remaining.as_secs()),
    };

    if as_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for line in format_progress_lines(&report) {
            println!("{line}");
        }
    }

    Ok(())
}

pub fn format_progress_lines(report: &ProgressReport) -> Vec<String> {
    let progress = &report.progress;
    let mut lines = Vec::with_capacity(5);

    match &report.session_error {
        Some(error) => lines.push(format!("session: {} ({error})", report.session)),
        None => lines.push(format!("session: {}", report.session)),
    }
    lines.push(format!(
        "items: {}/{} completed ({}%)",
        progress.completed, progress.total, report.percent
    ));
    lines.push(format!(
        "failed: {}  syncing: {}  pending: {}  conflicts: {}",
        progress.failed, progress.in_progress, progress.pending, progress.conflicts
    ));
    lines.push(format!(
        "bytes: {} / {}",
        format_bytes(progress.bytes_transferred),
        format_bytes(progress.total_bytes)
    ));
    if let Some(seconds) = report.eta_seconds {
        lines.push(format!(
            "eta: {}",
            format_duration(std::time::Duration::from_secs(seconds))
        ));
    }

    lines
}
