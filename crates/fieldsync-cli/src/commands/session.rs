use crate::cli::SessionCommands;
use crate::commands::common::CommandContext;
use crate::error::CliError;

pub async fn run_session(command: SessionCommands, context: &CommandContext) -> Result<(), CliError> {
    let service = context.open_service()?;

    match command {
        SessionCommands::Start => service.start().await?,
        SessionCommands::Pause => service.pause().await?,
        SessionCommands::Resume => service.resume().await?,
        SessionCommands::Cancel => {
            let reverted = service.cancel().await?;
            println!("{reverted} in-flight item(s) returned to pending");
        }
        SessionCommands::Fail { reason } => service.fail(&reason).await?,
    }

    context.save_service(&service).await?;
    println!("session: {}", service.session_state().await);
    Ok(())
}
