use std::path::PathBuf;

use clap::Args;

use crate::cli::ModeArg;
use crate::cli::subcommands::FileFormat;

#[derive(Clone, Debug, Args)]
pub struct RunArgs {
    #[arg(value_enum)]
    pub mode: ModeArg,
    /// XLSX, CSV or TSV file; the first row holds the headers.
    #[arg(long)]
    pub file: PathBuf,
    /// Column holding the person's name (guessed when omitted).
    #[arg(long)]
    pub name_col: Option<String>,
    /// Column holding the company or domain (guessed when omitted).
    #[arg(long)]
    pub company_col: Option<String>,
    /// Column holding the email (guessed when omitted).
    #[arg(long)]
    pub email_col: Option<String>,
    /// Also write the results to this file.
    #[arg(long)]
    pub out: Option<PathBuf>,
    /// Format of --out.
    #[arg(long, value_enum, default_value = "xlsx")]
    pub out_format: FileFormat,
}
