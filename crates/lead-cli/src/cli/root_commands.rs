use clap::Subcommand;

use crate::cli::subcommands::{
    ApiResultsArgs, AuthCommands, ExportArgs, HandoffArgs, HistoryCommands, RetryArgs, RunArgs,
    SingleArgs, SyncArgs,
};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Sign up, sign in, sign out, or show the current session.
    Auth {
        #[command(subcommand)]
        action: AuthCommands,
    },
    /// Process a CSV/TSV file row by row.
    Run(RunArgs),
    /// Look up one person or one email.
    Single(SingleArgs),
    /// Retry the failed rows of a stored session.
    Retry(RetryArgs),
    /// Browse past runs.
    History {
        #[command(subcommand)]
        action: HistoryCommands,
    },
    /// Write a session's results to a CSV or JSON file.
    Export(ExportArgs),
    /// Send a session's results to the configured webhook.
    Sync(SyncArgs),
    /// Show stored webhook results for a session.
    ApiResults(ApiResultsArgs),
    /// Verify the emails found by an enrich session.
    Handoff(HandoffArgs),
}
