use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::cli::subcommands::AuthCommands;
use crate::commands;
use crate::context::AppContext;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(
    command: Commands,
    ctx: &mut AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match command {
        Commands::Run(args) => commands::run::handle(&args, ctx, flags).await,
        Commands::Single(args) => commands::single::handle(&args, ctx, flags).await,
        Commands::Retry(args) => commands::retry::handle(&args, ctx, flags).await,
        Commands::History { action } => commands::history::handle(&action, ctx, flags).await,
        Commands::Export(args) => commands::export::handle(&args, ctx, flags).await,
        Commands::Sync(args) => commands::sync::handle(&args, ctx, flags).await,
        Commands::ApiResults(args) => commands::api_results::handle(&args, ctx, flags).await,
        Commands::Handoff(args) => commands::handoff::handle(&args, ctx, flags).await,
        Commands::Auth {
            action: AuthCommands::Logout,
        } => commands::auth::handle_logout(ctx, flags).await,
        Commands::Auth { .. } => {
            unreachable!("auth signup/login/status are pre-dispatched in main")
        }
    }
}
