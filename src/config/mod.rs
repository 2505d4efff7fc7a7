//! Outreach configuration
//!
//! One [`OutreachConfig`] value is assembled at startup by [`ConfigLoader`]
//! and handed to the runner. Nothing mutates it afterwards.

use crate::error::{common, ErrorCode, OutreachError, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub mod env_file;
pub mod loader;

pub use loader::{CliOverrides, ConfigLoader};

/// Get the per-user configuration directory for the outreach tool
pub fn get_global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("com", "outreach", "outreach").map(|dirs| dirs.config_dir().to_path_buf())
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct OutreachConfig {
    pub generation: GenerationConfig,
    pub paths: PathsConfig,
    pub sending: SendingConfig,
    pub links: LinksConfig,
    pub company: CompanyConfig,
    pub sender: SenderConfig,
}

/// Chat-completions deployment used to write each message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GenerationConfig {
    pub endpoint: String,
    pub api_key: String,
    pub deployment: String,
    pub api_version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PathsConfig {
    pub contacts: Vec<PathBuf>,
    pub sent_log: PathBuf,
    pub gmail_token: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SendingConfig {
    /// Hard ceiling on messages per run
    pub daily_limit: usize,
    /// Fixed pause between two consecutive contacts
    pub seconds_between_emails: u64,
    /// Recipient for `--test` runs
    pub test_email: String,
}

/// Resource links rendered as buttons under the body; empty links are skipped
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct LinksConfig {
    pub product: String,
    pub calendar: String,
    pub investor_portal: String,
    pub data_room: String,
    pub tracking_pixel: String,
}

/// Postal identity printed in the legal footer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CompanyConfig {
    pub name: String,
    pub address: String,
    pub city_state_zip: String,
}

/// Persona the generated message is written as
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SenderConfig {
    pub name: String,
    pub title: String,
    pub city: String,
    pub state: String,
    pub product_name: String,
    /// Free-form product facts handed to the model as personalization context
    pub product_briefing: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: String::new(),
            deployment: String::new(),
            api_version: "2024-04-01-preview".to_string(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            contacts: vec![PathBuf::from("contacts.csv")],
            sent_log: PathBuf::from("sent_emails_log.csv"),
            gmail_token: PathBuf::from("gmail_token.json"),
        }
    }
}

impl Default for SendingConfig {
    fn default() -> Self {
        Self {
            daily_limit: 200,
            seconds_between_emails: 72,
            test_email: String::new(),
        }
    }
}

impl Default for CompanyConfig {
    fn default() -> Self {
        Self {
            name: "Your Company LLC".to_string(),
            address: "123 Main St".to_string(),
            city_state_zip: "City, ST 00000".to_string(),
        }
    }
}

impl Default for SenderConfig {
    fn default() -> Self {
        Self {
            name: "Krishna Patel".to_string(),
            title: "Founder".to_string(),
            city: "Santa Fe".to_string(),
            state: "New Mexico".to_string(),
            product_name: "PortalPay".to_string(),
            product_briefing: String::new(),
        }
    }
}

/// Which external services the current command will touch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requirements {
    pub generation: bool,
    pub mail: bool,
}

impl Requirements {
    pub fn for_run(dry_run: bool) -> Self {
        Self {
            generation: true,
            mail: !dry_run,
        }
    }

    pub fn mail_only() -> Self {
        Self {
            generation: false,
            mail: true,
        }
    }

    pub fn none() -> Self {
        Self {
            generation: false,
            mail: false,
        }
    }
}

impl OutreachConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge values from the process environment
    pub fn merge_env_vars(&mut self) {
        self.merge_vars(|key| std::env::var(key).ok());
    }

    /// Merge values from any key lookup; empty values are ignored
    pub fn merge_vars<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(v) = get("AZURE_OPENAI_ENDPOINT") {
            self.generation.endpoint = v;
        }
        if let Some(v) = get("AZURE_OPENAI_API_KEY") {
            self.generation.api_key = v;
        }
        if let Some(v) = get("AZURE_OPENAI_DEPLOYMENT") {
            self.generation.deployment = v;
        }
        if let Some(v) = get("AZURE_OPENAI_API_VERSION") {
            self.generation.api_version = v;
        }

        if let Some(v) = get("CONTACTS_FILE") {
            self.paths.contacts = v
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(PathBuf::from)
                .collect();
        }
        if let Some(v) = get("SENT_LOG_PATH") {
            self.paths.sent_log = PathBuf::from(v);
        }
        if let Some(v) = get("GMAIL_TOKEN_FILE") {
            self.paths.gmail_token = PathBuf::from(v);
        }

        if let Some(v) = get("DAILY_LIMIT") {
            match v.parse::<usize>() {
                Ok(limit) => self.sending.daily_limit = limit,
                Err(_) => tracing::warn!("Ignoring non-numeric DAILY_LIMIT={}", v),
            }
        }
        if let Some(v) = get("SECONDS_BETWEEN_EMAILS") {
            match v.parse::<u64>() {
                Ok(secs) => self.sending.seconds_between_emails = secs,
                Err(_) => tracing::warn!("Ignoring non-numeric SECONDS_BETWEEN_EMAILS={}", v),
            }
        }
        if let Some(v) = get("TEST_EMAIL") {
            self.sending.test_email = v;
        }

        if let Some(v) = get("PRODUCT_LINK").or_else(|| get("PORTALPAY_LINK")) {
            self.links.product = v;
        }
        if let Some(v) = get("CALENDAR_LINK") {
            self.links.calendar = v;
        }
        if let Some(v) = get("INVESTOR_PORTAL_LINK") {
            self.links.investor_portal = v;
        }
        if let Some(v) = get("DATA_ROOM_LINK") {
            self.links.data_room = v;
        }
        if let Some(v) = get("TRACKING_PIXEL_URL") {
            self.links.tracking_pixel = v;
        }

        if let Some(v) = get("COMPANY_NAME") {
            self.company.name = v;
        }
        if let Some(v) = get("COMPANY_ADDRESS") {
            self.company.address = v;
        }
        if let Some(v) = get("COMPANY_CITY_STATE_ZIP") {
            self.company.city_state_zip = v;
        }

        if let Some(v) = get("FOUNDER_NAME") {
            self.sender.name = v;
        }
        if let Some(v) = get("FOUNDER_TITLE") {
            self.sender.title = v;
        }
        if let Some(v) = get("FOUNDER_CITY") {
            self.sender.city = v;
        }
        if let Some(v) = get("FOUNDER_STATE") {
            self.sender.state = v;
        }
        if let Some(v) = get("PRODUCT_NAME") {
            self.sender.product_name = v;
        }
        if let Some(v) = get("PRODUCT_BRIEFING") {
            self.sender.product_briefing = v;
        }
    }

    /// Check that everything the requested services need is present
    ///
    /// All missing keys are reported together so one edit of `.env` fixes them.
    pub fn validate(&self, requirements: Requirements) -> Result<()> {
        let mut missing = Vec::new();

        if requirements.generation {
            if self.generation.endpoint.is_empty() {
                missing.push("AZURE_OPENAI_ENDPOINT");
            }
            if self.generation.api_key.is_empty() {
                missing.push("AZURE_OPENAI_API_KEY");
            }
            if self.generation.deployment.is_empty() {
                missing.push("AZURE_OPENAI_DEPLOYMENT");
            }
        }

        if requirements.mail && self.paths.gmail_token.as_os_str().is_empty() {
            missing.push("GMAIL_TOKEN_FILE");
        }

        if !missing.is_empty() {
            return Err(common::missing_config_keys(&missing));
        }

        if requirements.generation && self.sending.daily_limit == 0 {
            return Err(OutreachError::config_with_code(
                ErrorCode::CONFIG_INVALID_VALUE,
                "DAILY_LIMIT must be at least 1",
                Some("DAILY_LIMIT".to_string()),
            ));
        }

        if requirements.mail && !self.paths.gmail_token.exists() {
            return Err(OutreachError::config_with_code(
                ErrorCode::CONFIG_CREDENTIALS,
                format!(
                    "Gmail token file {} does not exist; authorize once and save the token there",
                    self.paths.gmail_token.display()
                ),
                Some("GMAIL_TOKEN_FILE".to_string()),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = OutreachConfig::new();
        assert_eq!(config.sending.daily_limit, 200);
        assert_eq!(config.sending.seconds_between_emails, 72);
        assert_eq!(config.paths.sent_log, PathBuf::from("sent_emails_log.csv"));
        assert_eq!(config.generation.api_version, "2024-04-01-preview");
    }

    #[test]
    fn test_merge_vars_overrides_and_ignores_blank() {
        let mut config = OutreachConfig::new();
        config.merge_vars(lookup(&[
            ("AZURE_OPENAI_ENDPOINT", " https://example.openai.azure.com/ "),
            ("AZURE_OPENAI_API_KEY", ""),
            ("DAILY_LIMIT", "25"),
            ("SECONDS_BETWEEN_EMAILS", "soon"),
            ("CONTACTS_FILE", "a.csv, b.csv"),
            ("PORTALPAY_LINK", "https://pay.example.com"),
        ]));

        assert_eq!(config.generation.endpoint, "https://example.openai.azure.com/");
        assert!(config.generation.api_key.is_empty());
        assert_eq!(config.sending.daily_limit, 25);
        assert_eq!(config.sending.seconds_between_emails, 72);
        assert_eq!(
            config.paths.contacts,
            vec![PathBuf::from("a.csv"), PathBuf::from("b.csv")]
        );
        assert_eq!(config.links.product, "https://pay.example.com");
    }

    #[test]
    fn test_validate_lists_all_missing_keys() {
        let config = OutreachConfig::new();
        let err = config.validate(Requirements::for_run(true)).unwrap_err();

        assert_eq!(err.code(), ErrorCode::CONFIG_MISSING_REQUIRED);
        let text = err.to_string();
        assert!(text.contains("AZURE_OPENAI_ENDPOINT"));
        assert!(text.contains("AZURE_OPENAI_API_KEY"));
        assert!(text.contains("AZURE_OPENAI_DEPLOYMENT"));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_validate_requires_existing_token_for_sends() {
        let mut config = OutreachConfig::new();
        config.merge_vars(lookup(&[
            ("AZURE_OPENAI_ENDPOINT", "https://example"),
            ("AZURE_OPENAI_API_KEY", "key"),
            ("AZURE_OPENAI_DEPLOYMENT", "gpt"),
            ("GMAIL_TOKEN_FILE", "/definitely/not/here/token.json"),
        ]));

        assert!(config.validate(Requirements::for_run(true)).is_ok());
        let err = config.validate(Requirements::for_run(false)).unwrap_err();
        assert_eq!(err.code(), ErrorCode::CONFIG_CREDENTIALS);
    }

    #[test]
    fn test_validate_rejects_zero_limit() {
        let mut config = OutreachConfig::new();
        config.merge_vars(lookup(&[
            ("AZURE_OPENAI_ENDPOINT", "https://example"),
            ("AZURE_OPENAI_API_KEY", "key"),
            ("AZURE_OPENAI_DEPLOYMENT", "gpt"),
            ("DAILY_LIMIT", "0"),
        ]));

        let err = config.validate(Requirements::for_run(true)).unwrap_err();
        assert_eq!(err.code(), ErrorCode::CONFIG_INVALID_VALUE);
    }

    #[test]
    fn test_report_needs_nothing() {
        assert!(OutreachConfig::new().validate(Requirements::none()).is_ok());
    }
}
