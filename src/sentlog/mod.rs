//! Append-only record of completed sends
//!
//! The log doubles as the dedup source of truth: every distinct email in it
//! counts as already contacted. Records are appended one at a time, right
//! after the send they describe, and the file is never rewritten.

use crate::contacts::{normalize_email, Contact};
use crate::error::{ErrorCode, OutreachError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

pub mod report;

pub use report::LogReport;

/// Column order of the log file
pub const LOG_HEADER: [&str; 6] = ["email", "name", "firm", "timestamp", "status", "message_id"];

/// Status written for a delivered message
pub const STATUS_SENT: &str = "sent";

/// One row of the sent log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentLogRecord {
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub firm: String,
    /// ISO-8601 local time of the send
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message_id: String,
}

impl SentLogRecord {
    /// Record a successful send to `contact` happening now
    pub fn sent(contact: &Contact, message_id: &str) -> Self {
        Self {
            email: normalize_email(&contact.email),
            name: contact.name.clone(),
            firm: contact.firm.clone(),
            timestamp: chrono::Local::now()
                .format("%Y-%m-%dT%H:%M:%S%.6f")
                .to_string(),
            status: STATUS_SENT.to_string(),
            message_id: message_id.to_string(),
        }
    }
}

/// Durable store of already-contacted addresses
///
/// Implementations must normalize emails on both lookup and read so that
/// `"A@X.com "` and `"a@x.com"` are the same recipient.
pub trait SentLog: Send + Sync {
    /// Whether the address has a record
    fn contains(&self, email: &str) -> Result<bool>;

    /// Append one record and make it durable before returning
    fn append(&self, record: &SentLogRecord) -> Result<()>;

    /// Every distinct normalized email with a record
    fn emails(&self) -> Result<HashSet<String>>;

    /// All records in append order
    fn records(&self) -> Result<Vec<SentLogRecord>>;
}

/// Sent log stored as a CSV file
///
/// The file is opened, appended and closed for each record. There is no
/// locking; two processes sharing one file can both send to the same contact.
#[derive(Debug, Clone)]
pub struct CsvSentLog {
    path: PathBuf,
}

impl CsvSentLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Create the file with only the header row if it is absent
    ///
    /// Returns `true` when a new file was written.
    pub fn ensure_header(&self) -> Result<bool> {
        if self.path.exists() {
            return Ok(false);
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error("create directory", e))?;
        }

        let mut writer =
            csv::Writer::from_path(&self.path).map_err(|e| self.csv_error("create", e))?;
        writer
            .write_record(LOG_HEADER)
            .map_err(|e| self.csv_error("write header", e))?;
        writer.flush().map_err(|e| self.io_error("flush", e))?;

        debug!("Created sent log {}", self.path.display());
        Ok(true)
    }

    fn io_error(&self, operation: &str, err: std::io::Error) -> OutreachError {
        OutreachError::from(err)
            .with_context(format!("{} {}", operation, self.path.display()))
            .with_path(&self.path)
    }

    fn csv_error(&self, operation: &str, err: csv::Error) -> OutreachError {
        OutreachError::sent_log_with_code(
            ErrorCode::SENTLOG_IO_ERROR,
            format!("Could not {} log", operation),
            Some(self.path.clone()),
        )
        .with_source(err)
    }

    /// Every row with an email, in file order
    ///
    /// Rows are read as bytes and decoded per field, so a cell with invalid
    /// UTF-8 is replaced rather than losing the row's email.
    fn read_all(&self) -> Result<Vec<SentLogRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(&self.path)
            .map_err(|e| self.csv_error("open", e))?;

        let headers = reader
            .byte_headers()
            .map_err(|e| self.csv_error("read header", e))?
            .clone();
        let column = |name: &str| headers.iter().position(|h| h == name.as_bytes());
        let Some(email_idx) = column("email") else {
            return Err(OutreachError::sent_log_with_code(
                ErrorCode::SENTLOG_BAD_HEADER,
                format!("Expected header {}", LOG_HEADER.join(",")),
                Some(self.path.clone()),
            ));
        };
        let columns = [
            column("name"),
            column("firm"),
            column("timestamp"),
            column("status"),
            column("message_id"),
        ];

        let mut records = Vec::new();
        for (line, row) in reader.byte_records().enumerate() {
            let row = match row {
                Ok(row) => row,
                Err(e) => {
                    warn!(
                        "Skipping unreadable log row {} in {}: {}",
                        line + 2,
                        self.path.display(),
                        e
                    );
                    continue;
                }
            };

            let field = |idx: Option<usize>| {
                idx.and_then(|i| row.get(i))
                    .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
                    .unwrap_or_default()
            };
            let email = field(Some(email_idx));
            if email.is_empty() {
                debug!("Log row {} has no email", line + 2);
                continue;
            }
            let [name, firm, timestamp, status, message_id] = columns.map(field);
            records.push(SentLogRecord {
                email,
                name,
                firm,
                timestamp,
                status,
                message_id,
            });
        }
        Ok(records)
    }
}

impl SentLog for CsvSentLog {
    fn contains(&self, email: &str) -> Result<bool> {
        let wanted = normalize_email(email);
        Ok(self
            .read_all()?
            .iter()
            .any(|r| normalize_email(&r.email) == wanted))
    }

    fn append(&self, record: &SentLogRecord) -> Result<()> {
        self.ensure_header()?;

        let file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_error("open", e))?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer
            .serialize(record)
            .map_err(|e| self.csv_error("append to", e))?;
        writer.flush().map_err(|e| self.io_error("flush", e))?;
        Ok(())
    }

    fn emails(&self) -> Result<HashSet<String>> {
        Ok(self
            .read_all()?
            .iter()
            .map(|r| normalize_email(&r.email))
            .filter(|e| !e.is_empty())
            .collect())
    }

    fn records(&self) -> Result<Vec<SentLogRecord>> {
        self.read_all()
    }
}

/// In-process log for tests and dry runs
#[derive(Debug, Default)]
pub struct MemorySentLog {
    records: Mutex<Vec<SentLogRecord>>,
}

impl MemorySentLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a set of already-contacted addresses
    pub fn with_emails<I, S>(emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let records = emails
            .into_iter()
            .map(|e| SentLogRecord {
                email: e.as_ref().to_string(),
                name: String::new(),
                firm: String::new(),
                timestamp: String::new(),
                status: STATUS_SENT.to_string(),
                message_id: String::new(),
            })
            .collect();
        Self {
            records: Mutex::new(records),
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<SentLogRecord>> {
        // A panic while holding the lock leaves the Vec intact.
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SentLog for MemorySentLog {
    fn contains(&self, email: &str) -> Result<bool> {
        let wanted = normalize_email(email);
        Ok(self
            .lock()
            .iter()
            .any(|r| normalize_email(&r.email) == wanted))
    }

    fn append(&self, record: &SentLogRecord) -> Result<()> {
        self.lock().push(record.clone());
        Ok(())
    }

    fn emails(&self) -> Result<HashSet<String>> {
        Ok(self
            .lock()
            .iter()
            .map(|r| normalize_email(&r.email))
            .collect())
    }

    fn records(&self) -> Result<Vec<SentLogRecord>> {
        Ok(self.lock().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(email: &str, message_id: &str) -> SentLogRecord {
        let mut contact = Contact::with_email(email);
        contact.name = "Alice".to_string();
        contact.firm = "Alpha, Capital".to_string();
        SentLogRecord::sent(&contact, message_id)
    }

    #[test]
    fn test_ensure_header_creates_parents() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("logs/nested/sent.csv");
        let log = CsvSentLog::new(&path);

        assert!(log.ensure_header().unwrap());
        assert!(!log.ensure_header().unwrap());

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "email,name,firm,timestamp,status,message_id\n");
        assert!(log.emails().unwrap().is_empty());
    }

    #[test]
    fn test_missing_file_reads_as_empty() {
        let temp = TempDir::new().unwrap();
        let log = CsvSentLog::new(temp.path().join("absent.csv"));

        assert!(log.emails().unwrap().is_empty());
        assert!(!log.contains("a@x.com").unwrap());
        assert!(!log.exists());
    }

    #[test]
    fn test_append_then_contains() {
        let temp = TempDir::new().unwrap();
        let log = CsvSentLog::new(temp.path().join("sent.csv"));

        log.append(&record("a@x.com", "msg-1")).unwrap();
        log.append(&record("b@x.com", "msg-2")).unwrap();

        assert!(log.contains("A@X.com ").unwrap());
        assert!(log.contains("b@x.com").unwrap());
        assert!(!log.contains("c@x.com").unwrap());

        let records = log.records().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].firm, "Alpha, Capital");
        assert_eq!(records[0].status, STATUS_SENT);
        assert_eq!(records[1].message_id, "msg-2");
    }

    #[test]
    fn test_emails_normalizes_existing_rows() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("sent.csv");
        std::fs::write(
            &path,
            "email,name,firm,timestamp,status,message_id\n A@X.com ,A,F,2025-01-02T10:00:00,sent,m1\n",
        )
        .unwrap();

        let emails = CsvSentLog::new(&path).emails().unwrap();
        assert_eq!(emails, HashSet::from(["a@x.com".to_string()]));
    }

    #[test]
    fn test_invalid_utf8_cell_keeps_email() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("sent.csv");
        let mut content = b"email,name,firm,timestamp,status,message_id\n".to_vec();
        content.extend_from_slice(b"a@x.com,Jos\xe9,F,2025-01-02T10:00:00,sent,m1\n");
        content.extend_from_slice(b"b@x.com,Bo,G,2025-01-02T10:05:00,sent,m2\n");
        std::fs::write(&path, content).unwrap();

        let log = CsvSentLog::new(&path);
        let emails = log.emails().unwrap();
        assert!(emails.contains("a@x.com"));
        assert!(emails.contains("b@x.com"));
        assert!(log.contains("a@x.com").unwrap());

        let records = log.records().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "Jos\u{fffd}");
        assert_eq!(records[0].message_id, "m1");
    }

    #[test]
    fn test_rows_without_email_are_skipped() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("sent.csv");
        std::fs::write(
            &path,
            "email,name,firm,timestamp,status,message_id\n,A,F,t,sent,m1\nc@x.com\n",
        )
        .unwrap();

        let records = CsvSentLog::new(&path).records().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].email, "c@x.com");
        assert_eq!(records[0].status, "");
    }

    #[test]
    fn test_rejects_foreign_header() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("sent.csv");
        std::fs::write(&path, "recipient,when\nx@y.com,today\n").unwrap();

        let err = CsvSentLog::new(&path).emails().unwrap_err();
        assert_eq!(err.code(), ErrorCode::SENTLOG_BAD_HEADER);
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn test_memory_log() {
        let log = MemorySentLog::with_emails(["A@x.com"]);
        assert!(log.contains("a@x.com ").unwrap());

        log.append(&record("b@x.com", "m")).unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log.emails().unwrap().len(), 2);
    }
}
