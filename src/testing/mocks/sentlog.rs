//! Sent log whose appends always fail

use crate::error::{ErrorCode, OutreachError, Result};
use crate::sentlog::{MemorySentLog, SentLog, SentLogRecord};
use std::collections::HashSet;

/// Reads like a [`MemorySentLog`] but rejects every append
#[derive(Debug, Default)]
pub struct UnwritableSentLog {
    inner: MemorySentLog,
}

impl UnwritableSentLog {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SentLog for UnwritableSentLog {
    fn contains(&self, email: &str) -> Result<bool> {
        self.inner.contains(email)
    }

    fn append(&self, _record: &SentLogRecord) -> Result<()> {
        Err(OutreachError::sent_log_with_code(
            ErrorCode::SENTLOG_PERMISSION_DENIED,
            "Simulated read-only log",
            None,
        ))
    }

    fn emails(&self) -> Result<HashSet<String>> {
        self.inner.emails()
    }

    fn records(&self) -> Result<Vec<SentLogRecord>> {
        self.inner.records()
    }
}
