//! Mock enricher

use super::{bump, lock};
use crate::contacts::Contact;
use crate::enrich::Enricher;
use crate::error::{OutreachError, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
enum Behavior {
    Describe(String),
    Nothing,
    Fail,
}

/// Enricher returning a fixed answer
#[derive(Debug, Clone)]
pub struct MockEnricher {
    behavior: Behavior,
    call_count: Arc<Mutex<usize>>,
}

impl MockEnricher {
    /// Always describes the organization with `text`
    pub fn describing(text: &str) -> Self {
        Self::with_behavior(Behavior::Describe(text.to_string()))
    }

    /// Never finds anything
    pub fn empty() -> Self {
        Self::with_behavior(Behavior::Nothing)
    }

    /// Fails every lookup
    pub fn failing() -> Self {
        Self::with_behavior(Behavior::Fail)
    }

    fn with_behavior(behavior: Behavior) -> Self {
        Self {
            behavior,
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    pub fn get_call_count(&self) -> usize {
        *lock(&self.call_count)
    }
}

#[async_trait]
impl Enricher for MockEnricher {
    async fn describe(&self, _contact: &Contact) -> Result<Option<String>> {
        bump(&self.call_count);
        match &self.behavior {
            Behavior::Describe(text) => Ok(Some(text.clone())),
            Behavior::Nothing => Ok(None),
            Behavior::Fail => Err(OutreachError::enrichment("Simulated lookup failure")),
        }
    }
}
