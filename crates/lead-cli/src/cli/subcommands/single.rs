use clap::Args;

use crate::cli::ModeArg;

#[derive(Clone, Debug, Args)]
pub struct SingleArgs {
    #[arg(value_enum)]
    pub mode: ModeArg,
    /// Person's name (enrich, linkedin).
    #[arg(long, default_value = "")]
    pub name: String,
    /// Company or domain (enrich, linkedin).
    #[arg(long, default_value = "")]
    pub company: String,
    /// Address to check (verify).
    #[arg(long, default_value = "")]
    pub email: String,
    /// Skip the cache and ask the service again.
    #[arg(long)]
    pub retry: bool,
}
