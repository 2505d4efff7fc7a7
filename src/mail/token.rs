//! Gmail OAuth token file handling
//!
//! The token file uses Google's authorized-user JSON layout, so a token
//! written by any Google client library can be reused. Only refresh is
//! supported here; the initial consent must happen elsewhere.

use crate::error::{ErrorCode, OutreachError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Seconds before expiry at which a token is treated as already expired
const EXPIRY_SKEW_SECS: i64 = 60;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoogleToken {
    /// Access token; older files call it `access_token`
    #[serde(alias = "access_token")]
    pub token: String,
    pub refresh_token: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    pub client_id: String,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub scopes: Vec<String>,
    /// RFC 3339 expiry
    #[serde(default)]
    pub expiry: Option<String>,
    #[serde(default, alias = "email")]
    pub account: Option<String>,
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

fn token_error(code: u16, message: impl Into<String>, path: &Path) -> OutreachError {
    OutreachError::send_with_code(code, message, None).with_context(path.display())
}

/// Read a token file
pub fn load_token(path: &Path) -> Result<GoogleToken> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        OutreachError::config_with_code(
            ErrorCode::CONFIG_CREDENTIALS,
            format!("Cannot read Gmail token {}", path.display()),
            Some("GMAIL_TOKEN_FILE".to_string()),
        )
        .with_source(e)
    })?;

    serde_json::from_str(&content).map_err(|e| {
        OutreachError::config_with_code(
            ErrorCode::CONFIG_CREDENTIALS,
            format!("Gmail token {} is not valid token JSON", path.display()),
            Some("GMAIL_TOKEN_FILE".to_string()),
        )
        .with_source(e)
    })
}

/// Write a token file, replacing the previous one in a single rename
pub fn save_token(path: &Path, token: &GoogleToken) -> Result<()> {
    let json = serde_json::to_string_pretty(token)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json)
        .and_then(|_| std::fs::rename(&tmp, path))
        .map_err(|e| {
            token_error(ErrorCode::SEND_TOKEN_REFRESH_FAILED, "Could not save token", path)
                .with_source(e)
        })
}

/// Whether the token is expired or within a minute of expiring
///
/// A missing or unparseable expiry counts as expired.
pub fn is_token_expired(token: &GoogleToken) -> bool {
    let Some(expiry) = token.expiry.as_deref() else {
        return true;
    };
    match chrono::DateTime::parse_from_rfc3339(expiry) {
        Ok(expiry) => expiry <= chrono::Utc::now() + chrono::Duration::seconds(EXPIRY_SKEW_SECS),
        Err(_) => true,
    }
}

fn map_refresh_error(status: u16, body: &str) -> OutreachError {
    let lowered = body.to_lowercase();
    if (status == 400 || status == 401)
        && (lowered.contains("invalid_grant") || lowered.contains("token has been expired"))
    {
        return OutreachError::send_with_code(
            ErrorCode::SEND_AUTH_EXPIRED,
            "Gmail authorization expired or was revoked; authorize again",
            None,
        )
        .with_status(status);
    }
    OutreachError::send_with_code(
        ErrorCode::SEND_TOKEN_REFRESH_FAILED,
        format!("Token refresh failed: HTTP {}: {}", status, body),
        None,
    )
    .with_status(status)
}

/// Exchange the refresh token for a new access token
pub async fn refresh_access_token(
    client: &reqwest::Client,
    token: &GoogleToken,
) -> Result<GoogleToken> {
    let refresh_token = token.refresh_token.as_deref().ok_or_else(|| {
        OutreachError::send_with_code(
            ErrorCode::SEND_AUTH_EXPIRED,
            "Token has no refresh_token; authorize again",
            None,
        )
    })?;

    let mut form = vec![
        ("client_id", token.client_id.as_str()),
        ("refresh_token", refresh_token),
        ("grant_type", "refresh_token"),
    ];
    if let Some(secret) = token.client_secret.as_deref() {
        form.push(("client_secret", secret));
    }

    let resp = client
        .post(&token.token_uri)
        .form(&form)
        .send()
        .await
        .map_err(|e| {
            OutreachError::send_with_code(
                ErrorCode::SEND_TOKEN_REFRESH_FAILED,
                "Token refresh request failed",
                None,
            )
            .with_source(e)
        })?;

    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    if !status.is_success() {
        return Err(map_refresh_error(status.as_u16(), &body));
    }

    let body: serde_json::Value = serde_json::from_str(&body).map_err(|e| {
        OutreachError::send_with_code(
            ErrorCode::SEND_TOKEN_REFRESH_FAILED,
            "Unreadable token response",
            None,
        )
        .with_source(e)
    })?;
    let access_token = body["access_token"].as_str().ok_or_else(|| {
        OutreachError::send_with_code(
            ErrorCode::SEND_TOKEN_REFRESH_FAILED,
            "No access_token in response",
            None,
        )
    })?;
    let expires_in = body["expires_in"].as_i64().unwrap_or(3600);

    let mut refreshed = token.clone();
    refreshed.token = access_token.to_string();
    refreshed.expiry = Some((chrono::Utc::now() + chrono::Duration::seconds(expires_in)).to_rfc3339());
    Ok(refreshed)
}

/// Token file plus the last token read from it
pub struct TokenStore {
    path: PathBuf,
    current: tokio::sync::Mutex<Option<GoogleToken>>,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            current: tokio::sync::Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A usable access token, refreshing and persisting when needed
    ///
    /// `force_refresh` is set after the API rejected the current token.
    pub async fn access_token(&self, client: &reqwest::Client, force_refresh: bool) -> Result<String> {
        let mut current = self.current.lock().await;
        let token = match current.take() {
            Some(token) => token,
            None => load_token(&self.path)?,
        };

        let token = if force_refresh || is_token_expired(&token) {
            debug!("Refreshing Gmail access token");
            let refreshed = refresh_access_token(client, &token).await?;
            save_token(&self.path, &refreshed)?;
            info!("Refreshed Gmail access token");
            refreshed
        } else {
            token
        };

        let access = token.token.clone();
        *current = Some(token);
        Ok(access)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn token(expiry: Option<String>) -> GoogleToken {
        GoogleToken {
            token: "ya29.test".to_string(),
            refresh_token: Some("1//refresh".to_string()),
            token_uri: default_token_uri(),
            client_id: "123.apps.googleusercontent.com".to_string(),
            client_secret: Some("secret".to_string()),
            scopes: vec!["https://www.googleapis.com/auth/gmail.send".to_string()],
            expiry,
            account: None,
        }
    }

    #[test]
    fn test_token_file_compat() {
        let json = r#"{
            "access_token": "ya29.legacy",
            "refresh_token": "1//r",
            "client_id": "abc",
            "scopes": ["https://www.googleapis.com/auth/gmail.send"],
            "expiry": "2030-01-01T00:00:00Z"
        }"#;
        let parsed: GoogleToken = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.token, "ya29.legacy");
        assert_eq!(parsed.token_uri, "https://oauth2.googleapis.com/token");
        assert!(!is_token_expired(&parsed));
    }

    #[test]
    fn test_expiry_checks() {
        assert!(is_token_expired(&token(None)));
        assert!(is_token_expired(&token(Some("garbage".to_string()))));

        let soon = chrono::Utc::now() + chrono::Duration::seconds(30);
        assert!(is_token_expired(&token(Some(soon.to_rfc3339()))));

        let later = chrono::Utc::now() + chrono::Duration::hours(1);
        assert!(!is_token_expired(&token(Some(later.to_rfc3339()))));
    }

    #[test]
    fn test_save_and_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("gmail_token.json");
        let original = token(Some("2030-01-01T00:00:00+00:00".to_string()));

        save_token(&path, &original).unwrap();
        assert_eq!(load_token(&path).unwrap(), original);
        assert!(!temp.path().join("gmail_token.json.tmp").exists());
    }

    #[test]
    fn test_load_missing_is_credentials_error() {
        let err = load_token(Path::new("/nope/token.json")).unwrap_err();
        assert_eq!(err.code(), ErrorCode::CONFIG_CREDENTIALS);
    }

    #[test]
    fn test_refresh_error_mapping() {
        let err = map_refresh_error(400, r#"{"error": "invalid_grant"}"#);
        assert_eq!(err.code(), ErrorCode::SEND_AUTH_EXPIRED);

        let err = map_refresh_error(500, "oops");
        assert_eq!(err.code(), ErrorCode::SEND_TOKEN_REFRESH_FAILED);
    }

    #[tokio::test]
    async fn test_store_uses_unexpired_token_without_network() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("gmail_token.json");
        let later = chrono::Utc::now() + chrono::Duration::hours(1);
        save_token(&path, &token(Some(later.to_rfc3339()))).unwrap();

        let store = TokenStore::new(&path);
        let client = reqwest::Client::new();
        assert_eq!(store.access_token(&client, false).await.unwrap(), "ya29.test");
    }
}
