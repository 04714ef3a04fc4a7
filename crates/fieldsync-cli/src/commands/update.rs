use fieldsync_core::{StatusKind, StatusUpdate};

use crate::commands::common::{normalize_item_id, CommandContext};
use crate::error::CliError;

pub async fn run_update(
    id: &str,
    status: &str,
    progress: Option<u8>,
    error: Option<String>,
    context: &CommandContext,
) -> Result<(), CliError> {
    let id = normalize_item_id(id)?;
    let kind = status.parse::<StatusKind>()?;
    let update = StatusUpdate {
        kind,
        progress,
        error,
    };

    let service = context.open_service()?;
    service.update_status(&id, update).await?;
    context.save_service(&service).await?;

    if let Some(item) = service.get(&id).await {
        println!("{}  {}", item.id, item.status.describe());
    }
    Ok(())
}
