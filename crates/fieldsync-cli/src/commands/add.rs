use fieldsync_core::{ItemId, SyncItem};

use crate::commands::common::{normalize_item_id, CommandContext};
use crate::error::CliError;

pub async fn run_add(
    id: Option<&str>,
    item_type: &str,
    description: &str,
    size: Option<u64>,
    context: &CommandContext,
) -> Result<(), CliError> {
    let id = match id {
        Some(id) => normalize_item_id(id)?,
        None => ItemId::generate(),
    };

    let mut item = SyncItem::new(id, item_type.trim(), description.trim());
    if let Some(size) = size {
        item = item.with_size(size);
    }

    let service = context.open_service()?;
    service.upsert(item.clone()).await?;
    context.save_service(&service).await?;

    println!("{}", item.id);
    Ok(())
}
