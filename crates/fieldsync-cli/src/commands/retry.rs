use crate::commands::common::CommandContext;
use crate::error::CliError;

pub async fn run_retry(all: bool, context: &CommandContext) -> Result<(), CliError> {
    let service = context.open_service()?;
    let retried = if all {
        service.retry_all().await?
    } else {
        service.retry_failed().await?
    };
    context.save_service(&service).await?;

    println!("{retried} item(s) returned to pending");
    Ok(())
}
