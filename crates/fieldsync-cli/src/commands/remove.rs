use crate::commands::common::{normalize_item_id, CommandContext};
use crate::error::CliError;

pub async fn run_remove(id: &str, context: &CommandContext) -> Result<(), CliError> {
    let id = normalize_item_id(id)?;

    let service = context.open_service()?;
    let removed = service.remove(&id).await?;
    context.save_service(&service).await?;

    println!("{}", removed.id);
    Ok(())
}
