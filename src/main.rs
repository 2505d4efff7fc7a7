use clap::Parser;
use outreach::app::{handle_fatal_error, init_logging, AppConfig};
use outreach::cli::{execute_command, Cli};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let verbose = cli.global.verbose;

    let app_config = match AppConfig::new(verbose) {
        Ok(config) => config.with_debug(cli.global.debug),
        Err(e) => handle_fatal_error(e, verbose),
    };
    init_logging(&app_config);

    let result = execute_command(
        cli.command,
        cli.run,
        &cli.global,
        &app_config.working_dir,
    )
    .await;

    if let Err(e) = result {
        handle_fatal_error(e, app_config.verbose);
    }
}
