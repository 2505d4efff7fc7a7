//! CLI argument structures

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Send a personalized outreach batch and keep a record of who was contacted
#[derive(Parser, Debug)]
#[command(name = "outreach")]
#[command(about = "outreach - Personalized email batches with a durable sent log", long_about = None)]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Flags for the default `run` command
    #[command(flatten)]
    pub run: RunArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Enable verbose output (-v for debug, -vv for trace, -vvv for all)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Debug logging; same as at least -v
    #[arg(long, global = true)]
    pub debug: bool,

    /// Path to a TOML configuration file
    #[arg(short = 'c', long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Path to the .env file (defaults to ./.env)
    #[arg(long, global = true, value_name = "FILE")]
    pub env_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Process one batch of unsent contacts (default command)
    Run(RunArgs),

    /// Summarize the sent log
    Report {
        /// Sent log to read
        #[arg(long, value_name = "FILE")]
        log_file: Option<PathBuf>,
    },

    /// Trash or delete bounce notifications in the sending mailbox
    Cleanup {
        /// Only messages newer than this many days
        #[arg(long, default_value = "30")]
        days: u32,

        /// Only messages after this date (YYYY-MM-DD); overrides --days
        #[arg(long, value_name = "DATE")]
        since: Option<String>,

        /// Delete permanently instead of moving to trash
        #[arg(long)]
        hard_delete: bool,

        /// List matches without removing anything
        #[arg(long)]
        dry_run: bool,

        /// Maximum number of messages to inspect
        #[arg(long, default_value = "5000")]
        max: usize,
    },

    /// Create the sent log with only its header row
    #[command(name = "init-log")]
    InitLog {
        /// Sent log to create
        #[arg(long, value_name = "FILE")]
        log_file: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct RunArgs {
    /// Generate and print messages without sending or logging
    #[arg(long)]
    pub dry_run: bool,

    /// Send only the first unsent contact to the test address, without logging
    #[arg(long)]
    pub test: bool,

    /// Print the sent-log report instead of sending
    #[arg(long, conflicts_with_all = ["dry_run", "test"])]
    pub report: bool,

    /// Test address (defaults to TEST_EMAIL)
    #[arg(long, value_name = "EMAIL", requires = "test")]
    pub test_email: Option<String>,

    /// Sent log to read and append to
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Contact CSV file; repeat for several files
    #[arg(long = "contacts", value_name = "FILE")]
    pub contacts: Vec<PathBuf>,

    /// Override the daily limit
    #[arg(long, value_name = "N")]
    pub limit: Option<usize>,

    /// Override the seconds to wait between contacts
    #[arg(long, value_name = "SECONDS")]
    pub delay: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_top_level_run_flags() {
        let cli = Cli::try_parse_from(["outreach", "--dry-run", "--contacts", "a.csv", "--contacts", "b.csv"])
            .unwrap();
        assert!(cli.command.is_none());
        assert!(cli.run.dry_run);
        assert_eq!(cli.run.contacts, vec![PathBuf::from("a.csv"), PathBuf::from("b.csv")]);
    }

    #[test]
    fn test_run_subcommand() {
        let cli = Cli::try_parse_from(["outreach", "-v", "run", "--test", "--limit", "5"]).unwrap();
        assert_eq!(cli.global.verbose, 1);
        match cli.command {
            Some(Commands::Run(args)) => {
                assert!(args.test);
                assert_eq!(args.limit, Some(5));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cleanup_defaults() {
        let cli = Cli::try_parse_from(["outreach", "cleanup"]).unwrap();
        match cli.command {
            Some(Commands::Cleanup {
                days,
                since,
                hard_delete,
                dry_run,
                max,
            }) => {
                assert_eq!(days, 30);
                assert!(since.is_none());
                assert!(!hard_delete);
                assert!(!dry_run);
                assert_eq!(max, 5000);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_report_flag() {
        let cli = Cli::try_parse_from(["outreach", "--report", "--log-file", "sent.csv"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.run.report);
        assert_eq!(cli.run.log_file, Some(PathBuf::from("sent.csv")));

        assert!(Cli::try_parse_from(["outreach", "--report", "--dry-run"]).is_err());
        assert!(Cli::try_parse_from(["outreach", "--report", "--test"]).is_err());
    }

    #[test]
    fn test_test_email_requires_test() {
        assert!(Cli::try_parse_from(["outreach", "--test-email", "me@x.com"]).is_err());
    }
}
