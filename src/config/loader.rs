use super::env_file::read_env_file;
use super::{get_global_config_dir, OutreachConfig};
use crate::error::{common, OutreachError, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

const CONFIG_FILE_NAME: &str = "outreach.toml";
const ENV_FILE_NAME: &str = ".env";

/// Values given on the command line; they win over every other layer
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub contacts: Vec<PathBuf>,
    pub sent_log: Option<PathBuf>,
    pub daily_limit: Option<usize>,
    pub seconds_between_emails: Option<u64>,
    pub test_email: Option<String>,
}

/// Builds the single [`OutreachConfig`] for a process
///
/// Layers, later wins: defaults, TOML file, `.env`, process environment,
/// command-line overrides. `.env` only supplies keys the environment lacks.
pub struct ConfigLoader {
    working_dir: PathBuf,
    config_file: Option<PathBuf>,
    env_file: Option<PathBuf>,
}

impl ConfigLoader {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
            config_file: None,
            env_file: None,
        }
    }

    /// Use an explicit TOML file; it must exist
    pub fn with_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    pub fn with_env_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.env_file = Some(path.into());
        self
    }

    /// Load using the real process environment
    pub fn load(&self, overrides: &CliOverrides) -> Result<OutreachConfig> {
        self.load_with(overrides, |key| std::env::var(key).ok())
    }

    /// Load with a caller-provided environment lookup
    pub fn load_with<F>(&self, overrides: &CliOverrides, env: F) -> Result<OutreachConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = self.load_file()?;

        let env_path = self
            .env_file
            .clone()
            .unwrap_or_else(|| self.working_dir.join(ENV_FILE_NAME));
        let dotenv: HashMap<String, String> = read_env_file(&env_path)?;
        if !dotenv.is_empty() {
            debug!("Loaded {} value(s) from {}", dotenv.len(), env_path.display());
        }

        config.merge_vars(|key| env(key).or_else(|| dotenv.get(key).cloned()));
        apply_overrides(&mut config, overrides);
        self.resolve_paths(&mut config);

        Ok(config)
    }

    fn load_file(&self) -> Result<OutreachConfig> {
        let path = match &self.config_file {
            Some(explicit) => {
                let path = self.absolute(explicit);
                if !path.exists() {
                    return Err(common::config_not_found(&path));
                }
                path
            }
            None => {
                let local = self.working_dir.join(CONFIG_FILE_NAME);
                let global = get_global_config_dir().map(|dir| dir.join(CONFIG_FILE_NAME));
                match (local.exists(), global) {
                    (true, _) => local,
                    (false, Some(global)) if global.exists() => global,
                    _ => return Ok(OutreachConfig::default()),
                }
            }
        };

        debug!("Reading configuration from {}", path.display());
        let content = std::fs::read_to_string(&path).map_err(|e| {
            OutreachError::config(format!("Could not read {}", path.display())).with_source(e)
        })?;
        let config: OutreachConfig = toml::from_str(&content)
            .map_err(|e| OutreachError::from(e).with_context(path.display()))?;
        Ok(config)
    }

    fn resolve_paths(&self, config: &mut OutreachConfig) {
        config.paths.contacts = config
            .paths
            .contacts
            .iter()
            .map(|p| self.absolute(p))
            .collect();
        config.paths.sent_log = self.absolute(&config.paths.sent_log);
        config.paths.gmail_token = self.absolute(&config.paths.gmail_token);
    }

    fn absolute(&self, path: &Path) -> PathBuf {
        if path.is_absolute() || path.as_os_str().is_empty() {
            path.to_path_buf()
        } else {
            self.working_dir.join(path)
        }
    }
}

fn apply_overrides(config: &mut OutreachConfig, overrides: &CliOverrides) {
    if !overrides.contacts.is_empty() {
        config.paths.contacts = overrides.contacts.clone();
    }
    if let Some(path) = &overrides.sent_log {
        config.paths.sent_log = path.clone();
    }
    if let Some(limit) = overrides.daily_limit {
        config.sending.daily_limit = limit;
    }
    if let Some(secs) = overrides.seconds_between_emails {
        config.sending.seconds_between_emails = secs;
    }
    if let Some(email) = &overrides.test_email {
        config.sending.test_email = email.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_layers_apply_in_order() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("outreach.toml"),
            r#"
[sending]
daily_limit = 10
seconds_between_emails = 5

[company]
name = "Toml Co"
"#,
        )
        .unwrap();
        std::fs::write(
            temp.path().join(".env"),
            "DAILY_LIMIT=20\nCOMPANY_NAME=Dotenv Co\n",
        )
        .unwrap();

        let loader = ConfigLoader::new(temp.path());
        let env = |key: &str| (key == "COMPANY_NAME").then(|| "Env Co".to_string());
        let overrides = CliOverrides {
            seconds_between_emails: Some(0),
            ..CliOverrides::default()
        };

        let config = loader.load_with(&overrides, env).unwrap();
        assert_eq!(config.sending.daily_limit, 20);
        assert_eq!(config.sending.seconds_between_emails, 0);
        assert_eq!(config.company.name, "Env Co");
    }

    #[test]
    fn test_relative_paths_resolve_against_working_dir() {
        let temp = TempDir::new().unwrap();
        let loader = ConfigLoader::new(temp.path());
        let overrides = CliOverrides {
            sent_log: Some(PathBuf::from("logs/sent.csv")),
            contacts: vec![PathBuf::from("/abs/contacts.csv")],
            ..CliOverrides::default()
        };

        let config = loader.load_with(&overrides, no_env).unwrap();
        assert_eq!(config.paths.sent_log, temp.path().join("logs/sent.csv"));
        assert_eq!(config.paths.contacts, vec![PathBuf::from("/abs/contacts.csv")]);
    }

    #[test]
    fn test_explicit_missing_config_file_is_fatal() {
        let temp = TempDir::new().unwrap();
        let loader = ConfigLoader::new(temp.path()).with_config_file("missing.toml");

        let err = loader.load_with(&CliOverrides::default(), no_env).unwrap_err();
        assert_eq!(err.code(), ErrorCode::CONFIG_NOT_FOUND);
    }

    #[test]
    fn test_invalid_toml_is_reported() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.toml");
        std::fs::write(&path, "[sending\ndaily_limit = ").unwrap();

        let loader = ConfigLoader::new(temp.path()).with_config_file(&path);
        let err = loader.load_with(&CliOverrides::default(), no_env).unwrap_err();
        assert_eq!(err.code(), ErrorCode::CONFIG_INVALID_TOML);
    }
}
