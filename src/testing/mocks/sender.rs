//! Mock mail transport

use super::{bump, lock};
use crate::compose::ComposedMessage;
use crate::error::{ErrorCode, OutreachError, Result};
use crate::mail::MailSender;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// One delivered message as seen by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub message_id: String,
}

/// Builder for creating configured mock senders
#[derive(Default)]
pub struct MockMailSenderBuilder {
    fail_calls: HashSet<usize>,
    fail_all: bool,
}

impl MockMailSenderBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject the n-th call (1-based)
    pub fn fail_on_call(mut self, call: usize) -> Self {
        self.fail_calls.insert(call);
        self
    }

    pub fn always_fail(mut self) -> Self {
        self.fail_all = true;
        self
    }

    pub fn build(self) -> MockMailSender {
        MockMailSender {
            fail_calls: self.fail_calls,
            fail_all: self.fail_all,
            call_count: Arc::new(Mutex::new(0)),
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

/// Records every accepted message and hands out `mock-<n>` ids
pub struct MockMailSender {
    fail_calls: HashSet<usize>,
    fail_all: bool,
    call_count: Arc<Mutex<usize>>,
    sent: Arc<Mutex<Vec<SentMessage>>>,
}

impl Default for MockMailSender {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl MockMailSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> MockMailSenderBuilder {
        MockMailSenderBuilder::new()
    }

    pub fn get_call_count(&self) -> usize {
        *lock(&self.call_count)
    }

    /// Accepted messages in send order
    pub fn sent(&self) -> Vec<SentMessage> {
        lock(&self.sent).clone()
    }

    pub fn recipients(&self) -> Vec<String> {
        lock(&self.sent).iter().map(|m| m.to.clone()).collect()
    }
}

#[async_trait]
impl MailSender for MockMailSender {
    async fn send(&self, to: &str, message: &ComposedMessage) -> Result<String> {
        let call = bump(&self.call_count);
        if self.fail_all || self.fail_calls.contains(&call) {
            return Err(OutreachError::send_with_code(
                ErrorCode::SEND_REJECTED,
                format!("Simulated rejection on call {}", call),
                Some(to.to_string()),
            ));
        }

        let message_id = format!("mock-{}", call);
        lock(&self.sent).push(SentMessage {
            to: to.to_string(),
            subject: message.subject.clone(),
            html: message.html.clone(),
            message_id: message_id.clone(),
        });
        Ok(message_id)
    }
}
