//! Report command: summarize the sent log

use crate::config::OutreachConfig;
use crate::sentlog::{CsvSentLog, LogReport, SentLog};
use anyhow::Result;

/// Execute the report command
pub fn execute(config: &OutreachConfig) -> Result<()> {
    let log = CsvSentLog::new(&config.paths.sent_log);
    if !log.exists() {
        println!("No sent log found at {}", log.path().display());
        return Ok(());
    }

    let records = log.records()?;
    println!("{}", LogReport::from_records(&records));
    Ok(())
}
