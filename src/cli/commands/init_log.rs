//! Init-log command: create an empty sent log

use crate::config::OutreachConfig;
use crate::sentlog::CsvSentLog;
use anyhow::Result;

/// Execute the init-log command
pub fn execute(config: &OutreachConfig) -> Result<()> {
    let log = CsvSentLog::new(&config.paths.sent_log);
    if log.ensure_header()? {
        println!("✅ Created sent log {}", log.path().display());
    } else {
        println!("Sent log {} already exists", log.path().display());
    }
    Ok(())
}
