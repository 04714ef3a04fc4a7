use fieldsync_core::StatusFilter;

use crate::commands::common::{format_item_lines, item_to_row, CommandContext, SyncItemRow};
use crate::error::CliError;

pub async fn run_list(status: &str, as_json: bool, context: &CommandContext) -> Result<(), CliError> {
    let filter = status.parse::<StatusFilter>()?;
    let service = context.open_service()?;
    let items = service.items(filter).await;

    if as_json {
        let rows = items.iter().map(item_to_row).collect::<Vec<SyncItemRow>>();
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        for line in format_item_lines(&items) {
            println!("{line}");
        }
    }

    Ok(())
}
