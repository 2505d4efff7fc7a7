//! Sequential outreach batch
//!
//! One run reads the already-contacted set once, keeps the unsent contacts
//! in input order, truncates them to the daily limit and then handles each
//! contact in turn: enrich, generate, assemble, send, log, pause. Nothing
//! runs concurrently and no contact is retried within a run.

use crate::compose::MessageComposer;
use crate::config::OutreachConfig;
use crate::contacts::{normalize_email, Contact};
use crate::enrich::{enrich_or_fallback, Enricher};
use crate::error::{OutreachError, Result};
use crate::generate::{parse_generated, PromptEngine, TextGenerator};
use crate::mail::MailSender;
use crate::sentlog::{SentLog, SentLogRecord};
use std::collections::HashSet;
use std::fmt;
use std::time::Duration;
use tracing::{debug, error, info, warn};

const PREVIEW_CHARS: usize = 400;

/// Per-run switches from the command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Generate and assemble only; never send or log
    pub dry_run: bool,
    /// Send only the first unsent contact to this address, without logging
    pub test_recipient: Option<String>,
}

impl RunOptions {
    pub fn is_test(&self) -> bool {
        self.test_recipient.is_some()
    }
}

/// Counts reported at the end of a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Contacts the loop started on
    pub attempted: usize,
    pub sent: usize,
    pub failed: usize,
    /// Dry-run messages assembled but not sent
    pub previewed: usize,
    /// Contacts found in the log between selection and send
    pub skipped: usize,
    /// Unsent contacts left for a later run
    pub remaining: usize,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Attempted: {}", self.attempted)?;
        writeln!(f, "Sent: {}", self.sent)?;
        writeln!(f, "Failed: {}", self.failed)?;
        if self.previewed > 0 {
            writeln!(f, "Previewed (dry run): {}", self.previewed)?;
        }
        if self.skipped > 0 {
            writeln!(f, "Skipped (already logged): {}", self.skipped)?;
        }
        write!(f, "Remaining contacts: {}", self.remaining)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Outcome {
    Sent(String),
    Previewed,
    AlreadySent,
}

/// Contacts whose normalized email is not in `already_sent`, in input order
pub fn select_unsent(contacts: &[Contact], already_sent: &HashSet<String>) -> Vec<Contact> {
    contacts
        .iter()
        .filter(|c| !already_sent.contains(&normalize_email(&c.email)))
        .cloned()
        .collect()
}

/// The first `limit` contacts
pub fn select_batch(unsent: &[Contact], limit: usize) -> &[Contact] {
    &unsent[..unsent.len().min(limit)]
}

fn preview(text: &str) -> String {
    if text.chars().count() <= PREVIEW_CHARS {
        return text.to_string();
    }
    let head: String = text.chars().take(PREVIEW_CHARS).collect();
    format!("{}...", head)
}

/// Drives one batch against injected services
pub struct BatchRunner<'a> {
    config: &'a OutreachConfig,
    enricher: &'a dyn Enricher,
    generator: &'a dyn TextGenerator,
    sender: Option<&'a dyn MailSender>,
    log: &'a dyn SentLog,
    prompts: PromptEngine,
    composer: MessageComposer,
    delay: Duration,
}

impl<'a> BatchRunner<'a> {
    pub fn new(
        config: &'a OutreachConfig,
        enricher: &'a dyn Enricher,
        generator: &'a dyn TextGenerator,
        log: &'a dyn SentLog,
    ) -> Result<Self> {
        Ok(Self {
            config,
            enricher,
            generator,
            sender: None,
            log,
            prompts: PromptEngine::new(&config.sender, &config.company)?,
            composer: MessageComposer::new(config)?,
            delay: Duration::from_secs(config.sending.seconds_between_emails),
        })
    }

    /// Mail transport; required unless every run is a dry run
    pub fn with_sender(mut self, sender: &'a dyn MailSender) -> Self {
        self.sender = Some(sender);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Process one batch and report the counts
    ///
    /// Only a missing mail transport for a sending run is an error; every
    /// per-contact failure is counted and the loop moves on.
    pub async fn run(&self, contacts: &[Contact], options: &RunOptions) -> Result<RunSummary> {
        if !options.dry_run && self.sender.is_none() {
            return Err(OutreachError::config("No mail transport configured for a sending run"));
        }

        let already_sent = match self.log.emails() {
            Ok(emails) => emails,
            Err(e) => {
                warn!("Could not read sent log, duplicate protection is off for this run: {}", e);
                HashSet::new()
            }
        };

        let unsent = select_unsent(contacts, &already_sent);
        let limit = if options.is_test() {
            1
        } else {
            self.config.sending.daily_limit
        };
        let batch = select_batch(&unsent, limit);

        info!(
            "{} contacts, {} already contacted, {} unsent, {} selected",
            contacts.len(),
            contacts.len() - unsent.len(),
            unsent.len(),
            batch.len()
        );

        let mut summary = RunSummary {
            remaining: unsent.len() - batch.len(),
            ..RunSummary::default()
        };

        for (idx, contact) in batch.iter().enumerate() {
            summary.attempted += 1;
            println!(
                "[{}/{}] Processing: {} ({})",
                idx + 1,
                batch.len(),
                contact.display_name(),
                contact.email
            );

            match self.process(contact, options).await {
                Ok(Outcome::Sent(id)) => {
                    summary.sent += 1;
                    println!("  ✅ Sent (message id {})", id);
                }
                Ok(Outcome::Previewed) => summary.previewed += 1,
                Ok(Outcome::AlreadySent) => {
                    summary.skipped += 1;
                    println!("  ⏭️  Already in the sent log, skipping");
                }
                Err(e) => {
                    summary.failed += 1;
                    println!("  ❌ {}", e.user_message());
                    error!("{}", e.developer_message());
                }
            }

            let is_last = idx + 1 == batch.len();
            if !is_last && !options.dry_run && !options.is_test() && !self.delay.is_zero() {
                println!("  ⏳ Waiting {}s before the next contact...", self.delay.as_secs());
                tokio::time::sleep(self.delay).await;
            }
        }

        Ok(summary)
    }

    async fn process(&self, contact: &Contact, options: &RunOptions) -> Result<Outcome> {
        let company_info = enrich_or_fallback(self.enricher, contact).await;
        debug!("Organization info for {}: {}", contact.email, company_info);

        let prompt = self.prompts.render(contact, &company_info)?;
        let raw = self.generator.generate(&prompt).await?;
        let email = parse_generated(&raw, &self.config.sender.name)?;
        let message = self.composer.compose(contact, &email)?;
        println!("  Subject: {}", message.subject);

        if options.dry_run {
            println!("  🔍 DRY RUN: not sending or logging. Body preview:");
            println!("{}", preview(&email.body));
            return Ok(Outcome::Previewed);
        }

        if !options.is_test() {
            match self.log.contains(&contact.email) {
                Ok(true) => return Ok(Outcome::AlreadySent),
                Ok(false) => {}
                Err(e) => warn!("Could not re-check sent log for {}: {}", contact.email, e),
            }
        }

        let sender = self
            .sender
            .ok_or_else(|| OutreachError::config("No mail transport configured"))?;
        let recipient = options.test_recipient.as_deref().unwrap_or(&contact.email);
        if options.is_test() {
            println!("  🧪 TEST MODE: sending to {} instead of {}", recipient, contact.email);
        }

        let message_id = sender.send(recipient, &message).await?;

        if options.is_test() {
            debug!("Test send is not logged");
        } else if let Err(e) = self.log.append(&SentLogRecord::sent(contact, &message_id)) {
            warn!(
                "Sent to {} but could not log it; the next run may contact them again: {}",
                contact.email, e
            );
        }

        Ok(Outcome::Sent(message_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contacts(emails: &[&str]) -> Vec<Contact> {
        emails.iter().map(|e| Contact::with_email(e)).collect()
    }

    #[test]
    fn test_select_unsent_normalizes() {
        let mut list = contacts(&["a@x.com", "b@x.com", "c@x.com"]);
        list[0].email = "A@X.com ".to_string();
        let sent = HashSet::from(["a@x.com".to_string(), "c@x.com".to_string()]);

        let unsent = select_unsent(&list, &sent);
        assert_eq!(unsent.len(), 1);
        assert_eq!(unsent[0].email, "b@x.com");
        assert_eq!(select_unsent(&list, &sent), unsent);
    }

    #[test]
    fn test_select_batch_keeps_order() {
        let list = contacts(&["a@x.com", "b@x.com", "c@x.com"]);
        let batch = select_batch(&list, 2);
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].email, "a@x.com");
        assert_eq!(batch[1].email, "b@x.com");
        assert_eq!(select_batch(&list, 10).len(), 3);
        assert!(select_batch(&list, 0).is_empty());
    }

    #[test]
    fn test_preview_truncates() {
        assert_eq!(preview("short"), "short");
        let long = "é".repeat(500);
        let p = preview(&long);
        assert_eq!(p.chars().count(), PREVIEW_CHARS + 3);
        assert!(p.ends_with("..."));
    }

    #[test]
    fn test_summary_display() {
        let summary = RunSummary {
            attempted: 3,
            sent: 2,
            failed: 1,
            remaining: 4,
            ..RunSummary::default()
        };
        let text = summary.to_string();
        assert!(text.contains("Sent: 2"));
        assert!(text.contains("Remaining contacts: 4"));
        assert!(!text.contains("Previewed"));
    }
}
