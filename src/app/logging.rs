//! Tracing subscriber setup
//!
//! Log lines go to stderr so the run summary and report on stdout stay
//! clean. `RUST_LOG` overrides the verbosity flags when set.

use crate::app::config::AppConfig;
use tracing::{debug, trace};
use tracing_subscriber::EnvFilter;

/// Filter directives for a verbosity level
///
/// Below `-vvv` only this crate is raised; HTTP client internals stay at
/// `warn` so request retries and scraping stay readable.
pub fn filter_directives(config: &AppConfig) -> String {
    match config.verbose {
        0..=2 => format!("warn,outreach={}", config.log_level()),
        _ => config.log_level().to_string(),
    }
}

/// Install the global subscriber
pub fn init_logging(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(config)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(config.verbose >= 2)
        .with_line_number(config.verbose >= 3)
        .init();

    debug!(
        "Logging at verbosity {} from {}",
        config.verbose,
        config.working_dir.display()
    );
    trace!("Arguments: {:?}", std::env::args().skip(1).collect::<Vec<_>>());
}
