//! Failed-delivery cleanup
//!
//! Classification is a pure string match over the `From` and `Subject`
//! headers. The mailbox itself sits behind [`Mailbox`] so cleanup can run
//! against a fake in tests.

use crate::error::{ErrorCode, OutreachError, Result};
use async_trait::async_trait;
use tracing::{debug, warn};

const BOUNCE_FROM_PATTERNS: &[&str] = &["mail delivery subsystem", "mailer-daemon", "postmaster"];

const BOUNCE_SUBJECT_PATTERNS: &[&str] = &[
    "delivery status notification",
    "undelivered mail returned to sender",
    "delivery incomplete",
    "message blocked",
    "failure notice",
];

/// Search terms that cast a wide net; [`is_bounce`] makes the final call
const SEARCH_TERMS: &[&str] = &[
    "from:\"Mail Delivery Subsystem\"",
    "from:mailer-daemon",
    "from:postmaster",
    "subject:\"Delivery Status Notification\"",
    "subject:\"Undelivered Mail Returned to Sender\"",
    "subject:\"Delivery incomplete\"",
    "subject:\"Message blocked\"",
    "subject:\"failure notice\"",
];

/// Headers of one mailbox message
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageSummary {
    pub id: String,
    pub from: String,
    pub subject: String,
}

/// Mailbox operations cleanup needs
#[async_trait]
pub trait Mailbox: Send + Sync {
    /// Ids of messages matching a search query, at most `max_results`
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<String>>;
    async fn summary(&self, id: &str) -> Result<MessageSummary>;
    /// Move to trash
    async fn trash(&self, id: &str) -> Result<()>;
    /// Delete permanently
    async fn delete(&self, id: &str) -> Result<()>;
}

/// Whether a message looks like a failed-delivery notification
pub fn is_bounce(from: &str, subject: &str) -> bool {
    let from = from.to_lowercase();
    let subject = subject.to_lowercase();
    BOUNCE_FROM_PATTERNS.iter().any(|p| from.contains(p))
        || BOUNCE_SUBJECT_PATTERNS.iter().any(|p| subject.contains(p))
}

/// Date restriction for the search, from `--since` (wins) or `--days`
pub fn build_since_query(days: Option<u32>, since: Option<&str>) -> Result<Option<String>> {
    if let Some(since) = since {
        let date = chrono::NaiveDate::parse_from_str(since.trim(), "%Y-%m-%d").map_err(|e| {
            OutreachError::validation_with_code(
                ErrorCode::VALIDATION_INVALID_DATE,
                format!("--since must be YYYY-MM-DD, got {:?}", since),
                Some("since".to_string()),
            )
            .with_source(e)
        })?;
        return Ok(Some(format!("after:{}", date.format("%Y/%m/%d"))));
    }

    Ok(days.filter(|d| *d > 0).map(|d| format!("newer_than:{}d", d)))
}

/// Full search query for bounce candidates anywhere in the mailbox
pub fn bounce_search_query(since: Option<&str>) -> String {
    let query = format!("in:anywhere ({})", SEARCH_TERMS.join(" OR "));
    match since {
        Some(since) => format!("{} {}", query, since),
        None => query,
    }
}

#[derive(Debug, Clone)]
pub struct CleanupOptions {
    pub dry_run: bool,
    pub hard_delete: bool,
    pub max_messages: usize,
}

impl Default for CleanupOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            hard_delete: false,
            max_messages: 5_000,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupSummary {
    pub inspected: usize,
    pub matched: usize,
    /// Messages trashed or deleted
    pub acted: usize,
    /// Matched messages, for dry-run output
    pub candidates: Vec<MessageSummary>,
}

/// Find bounce notifications and trash or delete them
///
/// A message that cannot be read or removed is a warning, not a failure.
pub async fn cleanup_bounces(
    mailbox: &dyn Mailbox,
    since: Option<&str>,
    options: &CleanupOptions,
) -> Result<CleanupSummary> {
    let query = bounce_search_query(since);
    debug!("Bounce search query: {}", query);
    let ids = mailbox.search(&query, options.max_messages).await?;

    let mut summary = CleanupSummary::default();
    for id in ids {
        let message = match mailbox.summary(&id).await {
            Ok(message) => message,
            Err(e) => {
                warn!("Failed reading {}: {}", id, e);
                continue;
            }
        };
        summary.inspected += 1;

        if !is_bounce(&message.from, &message.subject) {
            continue;
        }
        summary.matched += 1;

        if !options.dry_run {
            let removed = if options.hard_delete {
                mailbox.delete(&id).await
            } else {
                mailbox.trash(&id).await
            };
            match removed {
                Ok(()) => summary.acted += 1,
                Err(e) => warn!("Failed removing {}: {}", id, e),
            }
        }
        summary.candidates.push(message);
    }

    Ok(summary)
}
