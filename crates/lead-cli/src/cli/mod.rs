use clap::Parser;

pub mod global;
pub mod root_commands;
pub mod subcommands;

pub use global::{GlobalFlags, ModeArg, OutputFormat};
pub use root_commands::Commands;

/// Top-level CLI parser for the `leads` binary.
#[derive(Debug, Parser)]
#[command(
    name = "leads",
    version,
    about = "Lead enrichment console: find emails, verify them, and find LinkedIn profiles"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: json, table, raw
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Max results to return
    #[arg(short, long, global = true)]
    pub limit: Option<u32>,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Project root path (defaults to auto-detect via .leads)
    #[arg(short, long, global = true)]
    pub project: Option<String>,
}

impl Cli {
    /// Extract ergonomic global flags struct for command handlers.
    #[must_use]
    pub fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
            limit: self.limit,
            quiet: self.quiet,
            verbose: self.verbose,
            project: self.project.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use clap::{CommandFactory, Parser};

    use super::subcommands::{AuthCommands, FileFormat, HistoryCommands};
    use super::{Cli, Commands, GlobalFlags, ModeArg, OutputFormat};

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_before_subcommand() {
        let cli = Cli::try_parse_from([
            "leads",
            "--format",
            "table",
            "--limit",
            "10",
            "--verbose",
            "history",
            "list",
        ])
        .expect("cli should parse");

        assert_eq!(cli.format, OutputFormat::Table);
        assert_eq!(cli.limit, Some(10));
        assert!(cli.verbose);
        assert!(matches!(
            cli.command,
            Commands::History {
                action: HistoryCommands::List { mode: None, .. }
            }
        ));
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from(["leads", "auth", "status", "--format", "raw", "--quiet"])
            .expect("cli should parse");

        assert_eq!(cli.format, OutputFormat::Raw);
        assert!(cli.quiet);
        assert!(matches!(
            cli.command,
            Commands::Auth {
                action: AuthCommands::Status
            }
        ));
    }

    #[test]
    fn output_format_rejects_invalid_value() {
        let parsed = Cli::try_parse_from(["leads", "--format", "xml", "auth", "status"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn run_parses_mode_file_and_columns() {
        let cli = Cli::try_parse_from([
            "leads",
            "run",
            "verify",
            "--file",
            "leads.csv",
            "--email-col",
            "Work Email",
        ])
        .expect("cli should parse");

        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.mode, ModeArg::Verify);
        assert_eq!(args.file, PathBuf::from("leads.csv"));
        assert_eq!(args.email_col.as_deref(), Some("Work Email"));
        assert!(args.name_col.is_none());
    }

    #[test]
    fn mode_rejects_unknown_value() {
        let parsed = Cli::try_parse_from(["leads", "single", "phone", "--name", "Ada"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn export_requires_out_path() {
        let parsed = Cli::try_parse_from(["leads", "export", "his-1"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn export_defaults_to_xlsx() {
        let cli = Cli::try_parse_from(["leads", "export", "his-1", "--out", "results.xlsx"])
            .expect("cli should parse");
        let Commands::Export(args) = cli.command else {
            panic!("expected export");
        };
        assert_eq!(args.format_file, FileFormat::Xlsx);

        let cli = Cli::try_parse_from(["leads", "export", "his-1", "--out", "r.json", "--format-file", "json"])
            .expect("cli should parse");
        let Commands::Export(args) = cli.command else {
            panic!("expected export");
        };
        assert_eq!(args.format_file, FileFormat::Json);
    }

    #[test]
    fn global_flags_extraction_copies_values() {
        let cli = Cli::try_parse_from(["leads", "--project", "/tmp/demo", "auth", "status"])
            .expect("cli should parse");
        let flags: GlobalFlags = cli.global_flags();
        assert_eq!(flags.project.as_deref(), Some("/tmp/demo"));
    }
}
