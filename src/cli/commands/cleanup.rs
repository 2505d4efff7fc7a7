//! Cleanup command: remove bounce notifications from the mailbox

use crate::bounce::{build_since_query, cleanup_bounces, CleanupOptions};
use crate::config::{OutreachConfig, Requirements};
use crate::mail::GmailClient;
use anyhow::Result;

/// Parsed cleanup flags
#[derive(Debug, Clone)]
pub struct CleanupParams {
    pub days: u32,
    pub since: Option<String>,
    pub hard_delete: bool,
    pub dry_run: bool,
    pub max: usize,
}

/// Execute the cleanup command
pub async fn execute(config: &OutreachConfig, params: &CleanupParams) -> Result<()> {
    config.validate(Requirements::mail_only())?;
    let since = build_since_query(Some(params.days), params.since.as_deref())?;

    let gmail = GmailClient::new(&config.paths.gmail_token)?;
    let options = CleanupOptions {
        dry_run: params.dry_run,
        hard_delete: params.hard_delete,
        max_messages: params.max,
    };

    println!("🔄 Searching for bounce notifications...");
    let summary = cleanup_bounces(&gmail, since.as_deref(), &options).await?;

    if params.dry_run {
        for message in &summary.candidates {
            println!("  [DRY] {} | {} | {}", message.id, message.from, message.subject);
        }
        println!(
            "Inspected {}, would remove {} bounce(s)",
            summary.inspected, summary.matched
        );
    } else {
        let verb = if params.hard_delete { "deleted" } else { "trashed" };
        println!(
            "✅ Inspected {}, matched {}, {} {}",
            summary.inspected, summary.matched, verb, summary.acted
        );
    }
    Ok(())
}
