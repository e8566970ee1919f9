//! Commands that act on a stored session.

use std::path::PathBuf;

use clap::{Args, ValueEnum};

use lead_engine::ExportFormat;

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum FileFormat {
    Xlsx,
    Csv,
    Json,
}

impl From<FileFormat> for ExportFormat {
    fn from(value: FileFormat) -> Self {
        match value {
            FileFormat::Xlsx => Self::Xlsx,
            FileFormat::Csv => Self::Csv,
            FileFormat::Json => Self::Json,
        }
    }
}

#[derive(Clone, Debug, Args)]
pub struct RetryArgs {
    /// History entry id.
    pub id: String,
}

#[derive(Clone, Debug, Args)]
pub struct ExportArgs {
    /// History entry id.
    pub id: String,
    #[arg(long, value_enum, default_value = "xlsx")]
    pub format_file: FileFormat,
    /// Destination file.
    #[arg(long)]
    pub out: PathBuf,
}

#[derive(Clone, Debug, Args)]
pub struct SyncArgs {
    /// History entry id.
    pub id: String,
    /// Directory for the raw webhook response (defaults to the current one).
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Clone, Debug, Args)]
pub struct ApiResultsArgs {
    /// History entry id.
    pub id: String,
}

#[derive(Clone, Debug, Args)]
pub struct HandoffArgs {
    /// Id of an enrich session.
    pub id: String,
}
