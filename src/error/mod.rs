use std::fmt::Display;
use std::path::PathBuf;
use thiserror::Error;

pub mod codes;
pub mod helpers;

pub use codes::{describe_error_code, ErrorCode};
pub use helpers::common;

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// The unified error type for the outreach runner
#[derive(Error, Debug)]
pub enum OutreachError {
    #[error("[E{code:04}] Configuration error: {message}")]
    Config {
        code: u16,
        message: String,
        key: Option<String>,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("[E{code:04}] Contact source error: {message}")]
    Contacts {
        code: u16,
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("[E{code:04}] Sent-log error: {message}")]
    SentLog {
        code: u16,
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("[E{code:04}] Enrichment error: {message}")]
    Enrichment {
        code: u16,
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("[E{code:04}] Generation error: {message}")]
    Generation {
        code: u16,
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("[E{code:04}] Send error: {message}")]
    Send {
        code: u16,
        message: String,
        recipient: Option<String>,
        status: Option<u16>,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("[E{code:04}] Validation error: {message}")]
    Validation {
        code: u16,
        message: String,
        field: Option<String>,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("[E{code:04}] {message}")]
    Other {
        code: u16,
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },
}

impl OutreachError {
    /// Create a configuration error with default code
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            code: ErrorCode::CONFIG_GENERIC,
            message: message.into(),
            key: None,
            source: None,
        }
    }

    /// Create a configuration error with specific code and offending key
    pub fn config_with_code(code: u16, message: impl Into<String>, key: Option<String>) -> Self {
        Self::Config {
            code,
            message: message.into(),
            key,
            source: None,
        }
    }

    /// Create a contact source error with default code
    pub fn contacts(message: impl Into<String>) -> Self {
        Self::Contacts {
            code: ErrorCode::CONTACTS_GENERIC,
            message: message.into(),
            path: None,
            source: None,
        }
    }

    /// Create a contact source error with specific code and path
    pub fn contacts_with_code(code: u16, message: impl Into<String>, path: Option<PathBuf>) -> Self {
        Self::Contacts {
            code,
            message: message.into(),
            path,
            source: None,
        }
    }

    /// Create a sent-log error with default code
    pub fn sent_log(message: impl Into<String>) -> Self {
        Self::SentLog {
            code: ErrorCode::SENTLOG_GENERIC,
            message: message.into(),
            path: None,
            source: None,
        }
    }

    /// Create a sent-log error with specific code and path
    pub fn sent_log_with_code(code: u16, message: impl Into<String>, path: Option<PathBuf>) -> Self {
        Self::SentLog {
            code,
            message: message.into(),
            path,
            source: None,
        }
    }

    pub fn enrichment(message: impl Into<String>) -> Self {
        Self::Enrichment {
            code: ErrorCode::ENRICH_GENERIC,
            message: message.into(),
            source: None,
        }
    }

    pub fn enrichment_with_code(code: u16, message: impl Into<String>) -> Self {
        Self::Enrichment {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Create a generation error with default code
    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation {
            code: ErrorCode::GENERATION_GENERIC,
            message: message.into(),
            source: None,
        }
    }

    /// Create a generation error with specific code
    pub fn generation_with_code(code: u16, message: impl Into<String>) -> Self {
        Self::Generation {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Create a send error with default code
    pub fn send(message: impl Into<String>) -> Self {
        Self::Send {
            code: ErrorCode::SEND_GENERIC,
            message: message.into(),
            recipient: None,
            status: None,
            source: None,
        }
    }

    /// Create a send error with specific code and recipient
    pub fn send_with_code(code: u16, message: impl Into<String>, recipient: Option<String>) -> Self {
        Self::Send {
            code,
            message: message.into(),
            recipient,
            status: None,
            source: None,
        }
    }

    /// Create a validation error with specific code and field
    pub fn validation_with_code(
        code: u16,
        message: impl Into<String>,
        field: Option<String>,
    ) -> Self {
        Self::Validation {
            code,
            message: message.into(),
            field,
            source: None,
        }
    }

    /// Create a generic other error
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            code: ErrorCode::OTHER_GENERIC,
            message: message.into(),
            source: None,
        }
    }

    /// Add a source error to this error
    pub fn with_source(mut self, source: impl Into<BoxedSource>) -> Self {
        match &mut self {
            Self::Config { source: src, .. }
            | Self::Contacts { source: src, .. }
            | Self::SentLog { source: src, .. }
            | Self::Enrichment { source: src, .. }
            | Self::Generation { source: src, .. }
            | Self::Send { source: src, .. }
            | Self::Validation { source: src, .. }
            | Self::Other { source: src, .. } => {
                *src = Some(source.into());
            }
        }
        self
    }

    /// Add context to the error message
    pub fn with_context(mut self, context: impl Display) -> Self {
        match &mut self {
            Self::Config { message, .. }
            | Self::Contacts { message, .. }
            | Self::SentLog { message, .. }
            | Self::Enrichment { message, .. }
            | Self::Generation { message, .. }
            | Self::Send { message, .. }
            | Self::Validation { message, .. }
            | Self::Other { message, .. } => {
                *message = format!("{}: {}", message, context);
            }
        }
        self
    }

    /// Attach the HTTP status a mail provider answered with
    pub fn with_status(mut self, http_status: u16) -> Self {
        if let Self::Send { status, .. } = &mut self {
            *status = Some(http_status);
        }
        self
    }

    /// Attach the path a sent-log or contact error refers to
    pub fn with_path(mut self, p: impl Into<PathBuf>) -> Self {
        match &mut self {
            Self::Contacts { path, .. } | Self::SentLog { path, .. } => {
                *path = Some(p.into());
            }
            _ => {}
        }
        self
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config { .. } => 2,
            Self::Contacts { .. } => 3,
            Self::SentLog { .. } => 4,
            Self::Enrichment { .. } => 5,
            Self::Generation { .. } => 6,
            Self::Send { .. } => 7,
            Self::Validation { .. } => 8,
            Self::Other { .. } => 1,
        }
    }

    /// Get the error code
    pub fn code(&self) -> u16 {
        match self {
            Self::Config { code, .. }
            | Self::Contacts { code, .. }
            | Self::SentLog { code, .. }
            | Self::Enrichment { code, .. }
            | Self::Generation { code, .. }
            | Self::Send { code, .. }
            | Self::Validation { code, .. }
            | Self::Other { code, .. } => *code,
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Config { message, key, .. } => match key {
                Some(k) => format!("Configuration problem with {}: {}", k, message),
                None => format!("Configuration problem: {}", message),
            },
            Self::Contacts { message, path, .. } => match path {
                Some(p) => format!("Contact file {}: {}", p.display(), message),
                None => format!("Contact source error: {}", message),
            },
            Self::SentLog { message, path, .. } => match path {
                Some(p) => format!("Sent log at {}: {}", p.display(), message),
                None => format!("Sent log error: {}", message),
            },
            Self::Enrichment { message, .. } => format!("Company lookup failed: {}", message),
            Self::Generation { message, .. } => format!("Email generation failed: {}", message),
            Self::Send {
                message,
                recipient,
                status,
                ..
            } => {
                let mut msg = String::from("Sending failed");
                if let Some(r) = recipient {
                    msg.push_str(&format!(" for {}", r));
                }
                if let Some(s) = status {
                    msg.push_str(&format!(" (HTTP {})", s));
                }
                format!("{}: {}", msg, message)
            }
            Self::Validation { message, field, .. } => match field {
                Some(f) => format!("Validation error for '{}': {}", f, message),
                None => format!("Validation error: {}", message),
            },
            Self::Other { message, .. } => message.clone(),
        }
    }

    /// Get a developer-friendly error message with full chain
    pub fn developer_message(&self) -> String {
        let mut msg = format!("{}", self);
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            msg.push_str(&format!("\n  caused by: {}", cause));
            source = cause.source();
        }
        msg
    }
}

/// Type alias for Results using OutreachError
pub type Result<T> = std::result::Result<T, OutreachError>;

/// Type alias for application Results (using anyhow for flexibility)
pub type AppResult<T> = anyhow::Result<T>;

// Conversion from common error types

impl From<std::io::Error> for OutreachError {
    fn from(err: std::io::Error) -> Self {
        use std::io::ErrorKind;

        let (code, message) = match err.kind() {
            ErrorKind::NotFound => (ErrorCode::SENTLOG_NOT_FOUND, "File or directory not found"),
            ErrorKind::PermissionDenied => {
                (ErrorCode::SENTLOG_PERMISSION_DENIED, "Permission denied")
            }
            ErrorKind::InvalidData => (ErrorCode::VALIDATION_INVALID_DATA, "Invalid data"),
            ErrorKind::TimedOut => (ErrorCode::OTHER_TIMEOUT, "Operation timed out"),
            ErrorKind::Interrupted => (ErrorCode::OTHER_INTERRUPTED, "Operation interrupted"),
            _ => (ErrorCode::SENTLOG_IO_ERROR, "IO operation failed"),
        };

        OutreachError::sent_log_with_code(code, message, None).with_source(err)
    }
}

impl From<toml::de::Error> for OutreachError {
    fn from(err: toml::de::Error) -> Self {
        OutreachError::config_with_code(ErrorCode::CONFIG_INVALID_TOML, "Invalid TOML syntax", None)
            .with_source(err)
    }
}

impl From<serde_json::Error> for OutreachError {
    fn from(err: serde_json::Error) -> Self {
        OutreachError::config_with_code(ErrorCode::CONFIG_INVALID_JSON, "Invalid JSON syntax", None)
            .with_source(err)
    }
}

impl From<csv::Error> for OutreachError {
    fn from(err: csv::Error) -> Self {
        OutreachError::sent_log_with_code(ErrorCode::SENTLOG_CORRUPTED, "Malformed CSV", None)
            .with_source(err)
    }
}

impl From<tera::Error> for OutreachError {
    fn from(err: tera::Error) -> Self {
        OutreachError::generation_with_code(
            ErrorCode::GENERATION_TEMPLATE,
            "Template failed to render",
        )
        .with_source(err)
    }
}
