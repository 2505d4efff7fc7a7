//! Minimal `.env` reader
//!
//! Lines are `KEY=value`; blank lines and `#` comments are skipped, and one
//! layer of matching single or double quotes around the value is removed.

use crate::error::{ErrorCode, OutreachError, Result};
use std::collections::HashMap;
use std::path::Path;

/// Parse `.env` content into a key/value map; later duplicates win
pub fn parse_env_file(content: &str) -> HashMap<String, String> {
    let mut vars = HashMap::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);

        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }

        vars.insert(key.to_string(), unquote(value.trim()).to_string());
    }

    vars
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

/// Read a `.env` file; a missing file yields an empty map
pub fn read_env_file(path: &Path) -> Result<HashMap<String, String>> {
    if !path.exists() {
        return Ok(HashMap::new());
    }

    let content = std::fs::read_to_string(path).map_err(|e| {
        OutreachError::config_with_code(
            ErrorCode::CONFIG_ENV_FILE,
            format!("Could not read {}", path.display()),
            None,
        )
        .with_source(e)
    })?;

    Ok(parse_env_file(&content))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_file() {
        let vars = parse_env_file(
            r#"
# Azure settings
AZURE_OPENAI_ENDPOINT="https://example.openai.azure.com/"
AZURE_OPENAI_API_KEY='secret'
export DAILY_LIMIT = 50
not a pair
=orphan
COMPANY_NAME=Acme "Labs"
"#,
        );

        assert_eq!(
            vars.get("AZURE_OPENAI_ENDPOINT").map(String::as_str),
            Some("https://example.openai.azure.com/")
        );
        assert_eq!(vars.get("AZURE_OPENAI_API_KEY").map(String::as_str), Some("secret"));
        assert_eq!(vars.get("DAILY_LIMIT").map(String::as_str), Some("50"));
        assert_eq!(vars.get("COMPANY_NAME").map(String::as_str), Some("Acme \"Labs\""));
        assert_eq!(vars.len(), 4);
    }

    #[test]
    fn test_missing_env_file_is_empty() {
        let vars = read_env_file(Path::new("/no/such/dir/.env")).unwrap();
        assert!(vars.is_empty());
    }
}
