use clap::Subcommand;

use crate::cli::ModeArg;

/// History commands.
#[derive(Clone, Debug, Subcommand)]
pub enum HistoryCommands {
    /// List past runs, most recent first.
    List {
        /// Only this mode.
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,
        /// Show inputs and results unmasked.
        #[arg(long)]
        full: bool,
    },
    /// Open a past run with its rows and status breakdown.
    Show {
        /// History entry id.
        id: String,
    },
}
