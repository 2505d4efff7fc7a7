//! Constructors for errors raised from several places

use super::{ErrorCode, OutreachError};
use std::path::PathBuf;

/// Helper functions for common error scenarios
pub mod common {
    use super::*;

    /// Create a not found error for a configuration file
    pub fn config_not_found(path: impl AsRef<std::path::Path>) -> OutreachError {
        OutreachError::config_with_code(
            ErrorCode::CONFIG_NOT_FOUND,
            format!("Configuration file not found: {}", path.as_ref().display()),
            None,
        )
    }

    /// Create an error listing every missing required configuration key
    pub fn missing_config_keys(keys: &[&str]) -> OutreachError {
        OutreachError::config_with_code(
            ErrorCode::CONFIG_MISSING_REQUIRED,
            format!("Missing required settings: {}", keys.join(", ")),
            keys.first().map(|k| k.to_string()),
        )
    }

    /// Create a contact file not found error
    pub fn contacts_not_found(path: impl Into<PathBuf>) -> OutreachError {
        let path = path.into();
        OutreachError::contacts_with_code(
            ErrorCode::CONTACTS_NOT_FOUND,
            format!("Contact file not found: {}", path.display()),
            Some(path),
        )
    }

    /// Create an error for generated text that yielded no usable body
    pub fn unparseable_generation(preview: &str) -> OutreachError {
        let snippet: String = preview.chars().take(80).collect();
        OutreachError::generation_with_code(
            ErrorCode::GENERATION_UNPARSEABLE,
            format!("No usable subject/body in output starting with {:?}", snippet),
        )
    }

    /// Create a validation error for an address that does not look like email
    pub fn invalid_email(value: &str) -> OutreachError {
        OutreachError::validation_with_code(
            ErrorCode::VALIDATION_INVALID_EMAIL,
            format!("'{}' is not a valid email address", value),
            Some("email".to_string()),
        )
    }
}
