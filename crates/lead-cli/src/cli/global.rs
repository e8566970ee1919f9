use clap::ValueEnum;

use lead_core::enums::Mode;

/// Shared output mode across all commands.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Raw,
}

/// Feature mode as written on the command line.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum ModeArg {
    /// Find business emails for name + company.
    Enrich,
    /// Check email deliverability.
    Verify,
    /// Find LinkedIn profile URLs for name + company.
    Linkedin,
}

impl From<ModeArg> for Mode {
    fn from(value: ModeArg) -> Self {
        match value {
            ModeArg::Enrich => Self::Enrich,
            ModeArg::Verify => Self::Verify,
            ModeArg::Linkedin => Self::Linkedin,
        }
    }
}

/// Global flags available before or after subcommands.
#[derive(Clone, Debug)]
pub struct GlobalFlags {
    pub format: OutputFormat,
    pub limit: Option<u32>,
    pub quiet: bool,
    pub verbose: bool,
    pub project: Option<String>,
}
