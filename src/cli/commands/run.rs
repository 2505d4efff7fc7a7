//! Run command: one outreach batch

use crate::cli::args::RunArgs;
use crate::config::{OutreachConfig, Requirements};
use crate::contacts::{is_valid_email, load_contacts, LoadStats};
use crate::enrich::WebEnricher;
use crate::error::common;
use crate::generate::AzureOpenAiClient;
use crate::mail::GmailClient;
use crate::runner::{BatchRunner, RunOptions};
use crate::sentlog::CsvSentLog;
use anyhow::Result;
use tracing::{info, warn};

/// Execute the run command
pub async fn execute(config: &OutreachConfig, args: &RunArgs) -> Result<()> {
    config.validate(Requirements::for_run(args.dry_run))?;

    let options = RunOptions {
        dry_run: args.dry_run,
        test_recipient: test_recipient(config, args)?,
    };

    let (contacts, stats) = load_contacts(&config.paths.contacts)?;
    print_load_stats(contacts.len(), &stats);

    let log = CsvSentLog::new(&config.paths.sent_log);
    if !args.dry_run {
        match log.ensure_header() {
            Ok(true) => info!("Created sent log {}", log.path().display()),
            Ok(false) => {}
            Err(e) => warn!("Could not create sent log {}: {}", log.path().display(), e),
        }
    }

    if args.dry_run {
        println!("🔍 DRY RUN: messages are generated but not sent or logged");
    }

    let enricher = WebEnricher::new()?;
    let generator = AzureOpenAiClient::new(&config.generation)?;
    let gmail = if args.dry_run {
        None
    } else {
        Some(GmailClient::new(&config.paths.gmail_token)?)
    };

    let mut runner = BatchRunner::new(config, &enricher, &generator, &log)?;
    if let Some(gmail) = &gmail {
        runner = runner.with_sender(gmail);
    }

    let summary = runner.run(&contacts, &options).await?;

    println!();
    println!("==== RUN SUMMARY ====");
    println!("{}", summary);
    if summary.failed > 0 {
        println!("⚠️  {} contact(s) failed; they stay unsent for the next run", summary.failed);
    } else {
        println!("✅ Complete!");
    }
    Ok(())
}

fn test_recipient(config: &OutreachConfig, args: &RunArgs) -> Result<Option<String>> {
    if !args.test {
        return Ok(None);
    }
    let address = config.sending.test_email.trim();
    if address.is_empty() {
        return Err(common::missing_config_keys(&["TEST_EMAIL"]).into());
    }
    if !is_valid_email(address) {
        return Err(common::invalid_email(address).into());
    }
    Ok(Some(address.to_string()))
}

fn print_load_stats(kept: usize, stats: &LoadStats) {
    println!("📇 Loaded {} contacts ({} rows read)", kept, stats.rows);
    let dropped = [
        ("missing email", stats.missing_email),
        ("invalid email", stats.invalid_email),
        ("disposable", stats.disposable),
        ("undeliverable", stats.undeliverable),
        ("duplicate", stats.duplicates),
    ];
    for (reason, count) in dropped.iter().filter(|(_, n)| *n > 0) {
        println!("   skipped {} {}", count, reason);
    }
}
