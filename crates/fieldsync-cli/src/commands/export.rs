use std::path::Path;

use fieldsync_core::snapshot::{render_json_snapshot, render_markdown_report};

use crate::cli::ExportFormat;
use crate::commands::common::CommandContext;
use crate::error::CliError;

pub async fn run_export(
    format: ExportFormat,
    output_path: Option<&Path>,
    context: &CommandContext,
) -> Result<(), CliError> {
    let snapshot = context.open_service()?.snapshot().await;
    let rendered = match format {
        ExportFormat::Json => render_json_snapshot(&snapshot)?,
        ExportFormat::Markdown => render_markdown_report(&snapshot),
    };

    if let Some(path) = output_path {
        std::fs::write(path, rendered)?;
        println!("{}", path.display());
    } else {
        println!("{rendered}");
    }

    Ok(())
}
