use std::path::PathBuf;

use fieldsync_core::snapshot::PendingConflict;
use fieldsync_core::{
    ConflictRecord, ItemId, ItemStatus, Resolution, SessionState, StatusFilter, SyncItem,
    SyncProgress,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

use crate::cli::{CompletionShell, ExportFormat, ResolutionChoice, SessionCommands};
use crate::commands::add::run_add;
use crate::commands::common::{
    conflict_to_row, format_item_lines, item_to_row, normalize_item_id, resolve_config_path,
    resolve_state_path, CommandContext,
};
use crate::commands::completions::render_completions;
use crate::commands::conflict::{resolution_from_choice, run_conflict_flag, run_conflict_resolve};
use crate::commands::export::run_export;
use crate::commands::progress::{format_progress_lines, ProgressReport};
use crate::commands::remove::run_remove;
use crate::commands::retry::run_retry;
use crate::commands::session::run_session;
use crate::commands::update::run_update;
use crate::error::CliError;
use crate::state_file::{load_snapshot, save_snapshot};

fn test_context() -> (TempDir, CommandContext) {
    let dir = tempfile::tempdir().unwrap();
    let context =
        CommandContext::with_paths(dir.path().join("state.json"), dir.path().join("config.json"));
    (dir, context)
}

async fn add(context: &CommandContext, id: &str) {
    run_add(Some(id), "customer", &format!("Kunde {id}"), Some(512), context)
        .await
        .unwrap();
}

#[test]
fn normalize_item_id_rejects_blank() {
    assert!(matches!(normalize_item_id("  \t"), Err(CliError::EmptyItemId)));
    assert_eq!(normalize_item_id("  c-17 ").unwrap(), ItemId::new("c-17"));
}

#[test]
fn explicit_paths_win_over_environment_and_defaults() {
    let state = resolve_state_path(Some(PathBuf::from("/tmp/custom-state.json"))).unwrap();
    let config = resolve_config_path(Some(PathBuf::from("/tmp/custom-config.json"))).unwrap();
    assert_eq!(state, PathBuf::from("/tmp/custom-state.json"));
    assert_eq!(config, PathBuf::from("/tmp/custom-config.json"));
}

#[test]
fn resolution_choice_requires_value_only_for_merge() {
    assert_eq!(
        resolution_from_choice(ResolutionChoice::KeepServer, None).unwrap(),
        Resolution::KeepServer
    );
    assert_eq!(
        resolution_from_choice(ResolutionChoice::Merge, Some("both".to_string())).unwrap(),
        Resolution::Merge("both".to_string())
    );
    assert!(matches!(
        resolution_from_choice(ResolutionChoice::Merge, None),
        Err(CliError::MissingMergeValue)
    ));
    assert!(matches!(
        resolution_from_choice(ResolutionChoice::KeepLocal, Some("x".to_string())),
        Err(CliError::UnexpectedMergeValue)
    ));
}

#[test]
fn item_rows_carry_status_fields() {
    let item = SyncItem::new(ItemId::new("r-1"), "receipt", "Tankbeleg")
        .with_status(ItemStatus::Failed {
            error: "timeout".to_string(),
        })
        .with_size(2048);

    let row = item_to_row(&item);
    assert_eq!(row.status, "failed");
    assert_eq!(row.error.as_deref(), Some("timeout"));
    assert_eq!(row.progress, None);
    assert_eq!(row.size_bytes, Some(2048));

    let lines = format_item_lines(&[item]);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("r-1"));
    assert!(lines[0].contains("failed: timeout"));
}

#[test]
fn conflict_rows_use_utc_labels() {
    let conflict = PendingConflict {
        item_id: ItemId::new("c-1"),
        record: ConflictRecord::new("Müller GmbH", "phone", "+49 1", "+49 2")
            .with_local_provenance("anna", 0)
            .with_server_provenance("backoffice", 0),
    };

    let row = conflict_to_row(&conflict);
    assert_eq!(row.entity, "Müller GmbH");
    assert_eq!(row.local_author, "anna");
    assert_eq!(row.local_at, "1970-01-01 00:00:00 UTC");
}

#[test]
fn progress_lines_include_eta_when_known() {
    let report = ProgressReport {
        session: SessionState::Syncing,
        session_error: None,
        percent: 50,
        progress: SyncProgress {
            total: 2,
            completed: 1,
            pending: 1,
            bytes_transferred: 1536,
            total_bytes: 3072,
            ..SyncProgress::default()
        },
        eta_seconds: Some(125),
    };

    let lines = format_progress_lines(&report);
    assert_eq!(lines[0], "session: syncing");
    assert_eq!(lines[1], "items: 1/2 completed (50%)");
    assert_eq!(lines[3], "bytes: 1.5 KB / 3.0 KB");
    assert_eq!(lines[4], "eta: 2m 05s");
}

#[test]
fn completions_cover_every_shell() {
    for shell in [
        CompletionShell::Bash,
        CompletionShell::Zsh,
        CompletionShell::Fish,
        CompletionShell::PowerShell,
    ] {
        let script = String::from_utf8(render_completions(shell)).unwrap();
        assert!(script.contains("fieldsync"), "{shell:?} script lacks binary name");
        assert!(script.contains("conflict"), "{shell:?} script lacks subcommands");
    }
}

#[test]
fn missing_state_file_is_an_empty_ledger() {
    let dir = tempfile::tempdir().unwrap();
    let snapshot = load_snapshot(&dir.path().join("absent.json")).unwrap();
    assert!(snapshot.items.is_empty());
    assert_eq!(snapshot.session, SessionState::Idle);
}

#[test]
fn unreadable_state_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    std::fs::write(&path, "{ not json").unwrap();

    assert!(matches!(
        load_snapshot(&path),
        Err(CliError::CorruptState { .. })
    ));
}

#[test]
fn save_snapshot_creates_parent_directories() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("state.json");
    let snapshot = load_snapshot(&path).unwrap();

    save_snapshot(&path, &snapshot).unwrap();

    assert!(path.exists());
    assert_eq!(load_snapshot(&path).unwrap(), snapshot);
}

#[tokio::test(flavor = "current_thread")]
async fn item_commands_persist_between_invocations() {
    let (_dir, context) = test_context();
    add(&context, "c-1").await;
    add(&context, "c-2").await;

    run_update("c-1", "syncing", Some(40), None, &context)
        .await
        .unwrap();
    run_update("c-2", "failed", None, Some("HTTP 503".to_string()), &context)
        .await
        .unwrap();

    let service = context.open_service().unwrap();
    assert_eq!(
        service.get(&ItemId::new("c-1")).await.unwrap().status,
        ItemStatus::Syncing { progress: 40 }
    );
    assert_eq!(service.progress().await.failed, 1);

    run_remove("c-1", &context).await.unwrap();
    let remaining = context
        .open_service()
        .unwrap()
        .items(StatusFilter::All)
        .await;
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, ItemId::new("c-2"));
}

#[tokio::test(flavor = "current_thread")]
async fn rejected_update_leaves_state_file_unchanged() {
    let (_dir, context) = test_context();
    add(&context, "c-3").await;
    let before = std::fs::read_to_string(&context.state_path).unwrap();

    let error = run_update("c-3", "failed", None, None, &context)
        .await
        .unwrap_err();

    assert!(matches!(
        error,
        CliError::Core(fieldsync_core::Error::Validation(_))
    ));
    assert_eq!(std::fs::read_to_string(&context.state_path).unwrap(), before);
}

#[tokio::test(flavor = "current_thread")]
async fn retry_returns_failed_items_to_pending() {
    let (_dir, context) = test_context();
    add(&context, "c-4").await;
    run_update("c-4", "failed", None, Some("timeout".to_string()), &context)
        .await
        .unwrap();

    run_retry(false, &context).await.unwrap();

    let item = context
        .open_service()
        .unwrap()
        .get(&ItemId::new("c-4"))
        .await
        .unwrap();
    assert_eq!(item.status, ItemStatus::Pending);
}

#[tokio::test(flavor = "current_thread")]
async fn conflict_commands_flag_and_resolve() {
    let (_dir, context) = test_context();
    add(&context, "c-5").await;

    run_conflict_flag(
        "c-5",
        ConflictRecord::new("Kunde 5", "contact", "Frau Weber", "Herr Weber"),
        &context,
    )
    .await
    .unwrap();
    assert_eq!(context.open_service().unwrap().conflicts().await.len(), 1);

    run_conflict_resolve("c-5", Resolution::KeepLocal, &context)
        .await
        .unwrap();

    let service = context.open_service().unwrap();
    assert!(service.conflicts().await.is_empty());
    assert_eq!(
        service.get(&ItemId::new("c-5")).await.unwrap().status,
        ItemStatus::Completed
    );
    let history = service.resolved_conflicts(10).await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].chosen_value, "Frau Weber");
}

#[tokio::test(flavor = "current_thread")]
async fn session_state_survives_between_invocations() {
    let (_dir, context) = test_context();
    add(&context, "c-6").await;

    run_session(SessionCommands::Start, &context).await.unwrap();
    run_session(SessionCommands::Pause, &context).await.unwrap();
    assert_eq!(
        context.open_service().unwrap().session_state().await,
        SessionState::Paused
    );

    let error = run_update("c-6", "syncing", Some(5), None, &context)
        .await
        .unwrap_err();
    assert!(matches!(
        error,
        CliError::Core(fieldsync_core::Error::InvalidState(_))
    ));

    run_session(SessionCommands::Resume, &context).await.unwrap();
    run_update("c-6", "completed", None, None, &context)
        .await
        .unwrap();
    assert_eq!(
        context.open_service().unwrap().session_state().await,
        SessionState::Completed
    );
}

#[tokio::test(flavor = "current_thread")]
async fn export_writes_markdown_report() {
    let (dir, context) = test_context();
    add(&context, "c-7").await;
    let output = dir.path().join("report.md");

    run_export(ExportFormat::Markdown, Some(&output), &context)
        .await
        .unwrap();

    let report = std::fs::read_to_string(&output).unwrap();
    assert!(report.starts_with("# Sync report"));
    assert!(report.contains("c-7"));
}
