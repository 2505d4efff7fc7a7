//! Reporting of errors that end the process

use crate::error::{describe_error_code, OutreachError};
use tracing::error;

/// Text printed to stderr for a fatal error, and the exit status to use
///
/// Errors that are not an `OutreachError` are reported as a generic error
/// with exit status 1. With `-v` the numeric code description and the full
/// cause chain are appended.
pub fn fatal_report(error: &anyhow::Error, verbose: u8) -> (String, i32) {
    let Some(err) = error.downcast_ref::<OutreachError>() else {
        let fallback = OutreachError::other(format!("{:#}", error));
        let mut text = format!("❌ {}", fallback.user_message());
        if verbose >= 1 {
            for (depth, cause) in error.chain().enumerate().skip(1) {
                text.push_str(&format!("\n  {}. {}", depth, cause));
            }
        }
        return (text, fallback.exit_code());
    };

    let mut text = format!("❌ {}", err.user_message());
    if verbose >= 1 {
        text.push_str(&format!(
            "\n\nE{:04}: {}\n{}",
            err.code(),
            describe_error_code(err.code()),
            err.developer_message()
        ));
    }
    (text, err.exit_code())
}

/// Print the error and exit with its category's status code
pub fn handle_fatal_error(error: anyhow::Error, verbose: u8) -> ! {
    error!("Run aborted: {:#}", error);
    let (text, exit_code) = fatal_report(&error, verbose);
    eprintln!("{}", text);
    std::process::exit(exit_code)
}
