//! Command routing and execution

use crate::cli::args::{Commands, GlobalArgs, RunArgs};
use crate::cli::commands;
use crate::config::{CliOverrides, ConfigLoader, OutreachConfig};
use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Execute a CLI command based on the parsed arguments
///
/// With no subcommand the top-level run flags drive a `run`. `--report`
/// on either form prints the sent-log report instead.
pub async fn execute_command(
    command: Option<Commands>,
    run: RunArgs,
    global: &GlobalArgs,
    working_dir: &Path,
) -> Result<()> {
    match command {
        Some(Commands::Run(args)) => execute_run(global, working_dir, &args).await,
        None => execute_run(global, working_dir, &run).await,
        Some(Commands::Report { log_file }) => {
            let config = load_config(global, working_dir, &log_override(log_file))?;
            commands::report::execute(&config)
        }
        Some(Commands::InitLog { log_file }) => {
            let config = load_config(global, working_dir, &log_override(log_file))?;
            commands::init_log::execute(&config)
        }
        Some(Commands::Cleanup {
            days,
            since,
            hard_delete,
            dry_run,
            max,
        }) => {
            let config = load_config(global, working_dir, &CliOverrides::default())?;
            let params = commands::cleanup::CleanupParams {
                days,
                since,
                hard_delete,
                dry_run,
                max,
            };
            commands::cleanup::execute(&config, &params).await
        }
    }
}

/// A run, or the sent-log report when `--report` was given
async fn execute_run(global: &GlobalArgs, working_dir: &Path, args: &RunArgs) -> Result<()> {
    let config = load_config(global, working_dir, &run_overrides(args))?;
    if args.report {
        return commands::report::execute(&config);
    }
    commands::run::execute(&config, args).await
}

fn run_overrides(args: &RunArgs) -> CliOverrides {
    CliOverrides {
        contacts: args.contacts.clone(),
        sent_log: args.log_file.clone(),
        daily_limit: args.limit,
        seconds_between_emails: args.delay,
        test_email: args.test_email.clone(),
    }
}

fn log_override(log_file: Option<PathBuf>) -> CliOverrides {
    CliOverrides {
        sent_log: log_file,
        ..CliOverrides::default()
    }
}

fn load_config(
    global: &GlobalArgs,
    working_dir: &Path,
    overrides: &CliOverrides,
) -> Result<OutreachConfig> {
    let mut loader = ConfigLoader::new(working_dir);
    if let Some(path) = &global.config {
        loader = loader.with_config_file(path);
    }
    if let Some(path) = &global.env_file {
        loader = loader.with_env_file(path);
    }
    let config = loader.load(overrides)?;
    debug!(
        "Contacts: {:?}, sent log: {}",
        config.paths.contacts,
        config.paths.sent_log.display()
    );
    Ok(config)
}
