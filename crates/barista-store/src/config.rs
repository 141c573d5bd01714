//! Layered configuration resolution.
//!
//! Every value resolves in strict priority order: process environment,
//! then the local secrets file, then (non-sensitive values only) the config
//! file. The password and API key are deliberately never read from or
//! written to the config file, which may end up in a backup or a repo.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::warn;

use crate::error::StoreError;

/// Environment variable and secrets-file key for the account email.
pub const EMAIL_KEY: &str = "FELLOW_EMAIL";
/// Environment variable and secrets-file key for the account password.
pub const PASSWORD_KEY: &str = "FELLOW_PASSWORD";
/// Environment variable and secrets-file key for the LLM API key.
pub const API_KEY_KEY: &str = "OPENAI_API_KEY";
/// Environment variable and secrets-file key for the assistant id.
pub const ASSISTANT_ID_KEY: &str = "OPENAI_ASSISTANT_ID";

/// Default config file name, relative to the working directory.
const DEFAULT_CONFIG_FILE: &str = "brew_studio_config.json";

/// Where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSource {
    Environment,
    SecretsFile,
    ConfigFile,
    Unset,
}

impl std::fmt::Display for ValueSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ValueSource::Environment => "Environment Variable",
            ValueSource::SecretsFile => "Secrets File",
            ValueSource::ConfigFile => "Config File",
            ValueSource::Unset => "Not configured",
        };
        write!(f, "{}", s)
    }
}

/// Provenance of one configuration value, for the settings page.
#[derive(Debug, Clone)]
pub struct ConfigSource {
    pub name: &'static str,
    pub source: ValueSource,
}

/// Non-sensitive settings persisted to the config file.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct ConfigFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    fellow_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    openai_assistant_id: Option<String>,
}

/// Secrets file format. Values here never reach the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SecretsFile {
    version: u32,
    secrets: HashMap<String, String>,
}

impl Default for SecretsFile {
    fn default() -> Self {
        Self {
            version: 1,
            secrets: HashMap::new(),
        }
    }
}

/// Layered configuration over the environment and two JSON files.
#[derive(Debug, Clone)]
pub struct Config {
    config_path: PathBuf,
    secrets_path: PathBuf,
}

impl Config {
    /// Config in the working directory, secrets under the platform config
    /// dir.
    pub fn new() -> Self {
        Self {
            config_path: PathBuf::from(DEFAULT_CONFIG_FILE),
            secrets_path: Self::default_secrets_path(),
        }
    }

    /// Config with explicit file locations (used by tests and the CLI).
    pub fn at(config_path: impl AsRef<Path>, secrets_path: impl AsRef<Path>) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            secrets_path: secrets_path.as_ref().to_path_buf(),
        }
    }

    /// Default secrets path: `<config dir>/barista/secrets.json`.
    pub fn default_secrets_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("barista")
            .join("secrets.json")
    }

    // ------------------------------------------------------------------
    // Resolution
    // ------------------------------------------------------------------

    /// Account email: env, then secrets, then config file.
    pub async fn fellow_email(&self) -> Option<String> {
        if let Some(v) = env_value(EMAIL_KEY) {
            return Some(v);
        }
        if let Some(v) = self.secret(EMAIL_KEY).await {
            return Some(v);
        }
        self.load_config_file().await.fellow_email
    }

    /// Account password: env, then secrets. Never the config file.
    pub async fn fellow_password(&self) -> Option<String> {
        if let Some(v) = env_value(PASSWORD_KEY) {
            return Some(v);
        }
        self.secret(PASSWORD_KEY).await
    }

    /// LLM API key: env, then secrets. Never the config file.
    pub async fn openai_api_key(&self) -> Option<String> {
        if let Some(v) = env_value(API_KEY_KEY) {
            return Some(v);
        }
        self.secret(API_KEY_KEY).await
    }

    /// Assistant id: env, then secrets, then config file.
    pub async fn assistant_id(&self) -> Option<String> {
        if let Some(v) = env_value(ASSISTANT_ID_KEY) {
            return Some(v);
        }
        if let Some(v) = self.secret(ASSISTANT_ID_KEY).await {
            return Some(v);
        }
        self.load_config_file().await.openai_assistant_id
    }

    /// Report where each value currently resolves from.
    pub async fn sources(&self) -> Vec<ConfigSource> {
        let config = self.load_config_file().await;
        let secrets = self.load_secrets_file().await;
        let has_secret = |key: &str| secrets.secrets.get(key).is_some_and(|v| !v.is_empty());

        let mut report = Vec::with_capacity(4);

        report.push(ConfigSource {
            name: "Fellow Email",
            source: if env_value(EMAIL_KEY).is_some() {
                ValueSource::Environment
            } else if has_secret(EMAIL_KEY) {
                ValueSource::SecretsFile
            } else if config.fellow_email.as_deref().is_some_and(|v| !v.is_empty()) {
                ValueSource::ConfigFile
            } else {
                ValueSource::Unset
            },
        });

        report.push(ConfigSource {
            name: "Fellow Password",
            source: if env_value(PASSWORD_KEY).is_some() {
                ValueSource::Environment
            } else if has_secret(PASSWORD_KEY) {
                ValueSource::SecretsFile
            } else {
                ValueSource::Unset
            },
        });

        report.push(ConfigSource {
            name: "OpenAI API Key",
            source: if env_value(API_KEY_KEY).is_some() {
                ValueSource::Environment
            } else if has_secret(API_KEY_KEY) {
                ValueSource::SecretsFile
            } else {
                ValueSource::Unset
            },
        });

        report.push(ConfigSource {
            name: "OpenAI Assistant ID",
            source: if env_value(ASSISTANT_ID_KEY).is_some() {
                ValueSource::Environment
            } else if has_secret(ASSISTANT_ID_KEY) {
                ValueSource::SecretsFile
            } else if config
                .openai_assistant_id
                .as_deref()
                .is_some_and(|v| !v.is_empty())
            {
                ValueSource::ConfigFile
            } else {
                ValueSource::Unset
            },
        });

        report
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Persist the email to the config file (non-sensitive).
    pub async fn save_email(&self, email: &str) -> Result<(), StoreError> {
        let mut config = self.load_config_file().await;
        config.fellow_email = Some(email.to_string());
        self.write_config_file(&config).await
    }

    /// Persist the assistant id to the config file (non-sensitive).
    pub async fn save_assistant_id(&self, assistant_id: &str) -> Result<(), StoreError> {
        let mut config = self.load_config_file().await;
        config.openai_assistant_id = Some(assistant_id.to_string());
        self.write_config_file(&config).await
    }

    /// Store a secret in the secrets file.
    pub async fn set_secret(&self, name: &str, value: &str) -> Result<(), StoreError> {
        validate_secret_name(name)?;
        let mut secrets = self.load_secrets_file().await;
        secrets.secrets.insert(name.to_string(), value.to_string());
        self.write_secrets_file(&secrets).await
    }

    async fn secret(&self, name: &str) -> Option<String> {
        self.load_secrets_file()
            .await
            .secrets
            .get(name)
            .filter(|v| !v.is_empty())
            .cloned()
    }

    async fn load_config_file(&self) -> ConfigFile {
        if !self.config_path.exists() {
            return ConfigFile::default();
        }
        match fs::read_to_string(&self.config_path).await {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                warn!(error = %e, path = %self.config_path.display(), "could not parse config file");
                ConfigFile::default()
            }),
            Err(e) => {
                warn!(error = %e, path = %self.config_path.display(), "could not read config file");
                ConfigFile::default()
            }
        }
    }

    async fn load_secrets_file(&self) -> SecretsFile {
        if !self.secrets_path.exists() {
            return SecretsFile::default();
        }
        match fs::read_to_string(&self.secrets_path).await {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                warn!(error = %e, path = %self.secrets_path.display(), "could not parse secrets file");
                SecretsFile::default()
            }),
            Err(e) => {
                warn!(error = %e, path = %self.secrets_path.display(), "could not read secrets file");
                SecretsFile::default()
            }
        }
    }

    async fn write_config_file(&self, config: &ConfigFile) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(config)?;
        atomic_write(&self.config_path, &content, false).await
    }

    async fn write_secrets_file(&self, secrets: &SecretsFile) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(secrets)?;
        atomic_write(&self.secrets_path, &content, true).await
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

/// Non-empty environment variable lookup.
fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn validate_secret_name(name: &str) -> Result<(), StoreError> {
    if name.is_empty() {
        return Err(StoreError::InvalidName("name cannot be empty".to_string()));
    }
    if name.len() > 64 {
        return Err(StoreError::InvalidName(
            "name too long (max 64 chars)".to_string(),
        ));
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(StoreError::InvalidName(
            "name must be alphanumeric with underscores only".to_string(),
        ));
    }
    Ok(())
}

/// Write to a temp file then rename. Secret files get 0600 on Unix.
async fn atomic_write(path: &Path, content: &str, restrict: bool) -> Result<(), StoreError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).await?;
    }

    let temp_path = path.with_extension("tmp");
    let mut file = fs::File::create(&temp_path).await?;

    #[cfg(unix)]
    if restrict {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = file.metadata().await?.permissions();
        perms.set_mode(0o600);
        file.set_permissions(perms).await?;
    }
    #[cfg(not(unix))]
    let _ = restrict;

    file.write_all(content.as_bytes()).await?;
    file.sync_all().await?;
    fs::rename(&temp_path, path).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn test_config(dir: &tempfile::TempDir) -> Config {
        Config::at(
            dir.path().join("brew_studio_config.json"),
            dir.path().join("secrets.json"),
        )
    }

    #[tokio::test]
    async fn email_falls_back_through_layers() {
        let dir = tempdir().unwrap();
        let config = test_config(&dir);

        assert_eq!(config.fellow_email().await, None);

        config.save_email("file@example.com").await.unwrap();
        assert_eq!(
            config.fellow_email().await.as_deref(),
            Some("file@example.com")
        );

        config
            .set_secret(EMAIL_KEY, "secret@example.com")
            .await
            .unwrap();
        assert_eq!(
            config.fellow_email().await.as_deref(),
            Some("secret@example.com")
        );
    }

    #[tokio::test]
    async fn env_overrides_config_file_email() {
        let dir = tempdir().unwrap();
        let config = test_config(&dir);
        config.save_email("file@example.com").await.unwrap();

        // SAFETY: this is the only test in the crate touching FELLOW_EMAIL.
        unsafe { std::env::set_var(EMAIL_KEY, "env@example.com") };
        let resolved = config.fellow_email().await;
        let source = config.sources().await[0].source;
        unsafe { std::env::remove_var(EMAIL_KEY) };

        assert_eq!(resolved.as_deref(), Some("env@example.com"));
        assert_eq!(source, ValueSource::Environment);

        // With the variable gone, the file value is back.
        assert_eq!(
            config.fellow_email().await.as_deref(),
            Some("file@example.com")
        );
    }

    #[tokio::test]
    async fn password_never_comes_from_config_file() {
        let dir = tempdir().unwrap();
        let config = test_config(&dir);

        // Even a config file that (wrongly) contains a password key is
        // ignored by resolution.
        std::fs::write(
            dir.path().join("brew_studio_config.json"),
            r#"{"fellow_email":"a@b.c","fellow_password":"leaked"}"#,
        )
        .unwrap();

        assert_eq!(config.fellow_password().await, None);

        config.set_secret(PASSWORD_KEY, "hunter2").await.unwrap();
        assert_eq!(config.fellow_password().await.as_deref(), Some("hunter2"));
    }

    #[tokio::test]
    async fn save_email_does_not_leak_secrets_to_config_file() {
        let dir = tempdir().unwrap();
        let config = test_config(&dir);

        config.set_secret(API_KEY_KEY, "sk-test").await.unwrap();
        config.save_email("a@b.c").await.unwrap();

        let raw = std::fs::read_to_string(dir.path().join("brew_studio_config.json")).unwrap();
        assert!(raw.contains("a@b.c"));
        assert!(!raw.contains("sk-test"));
    }

    #[tokio::test]
    async fn sources_report_tracks_provenance() {
        let dir = tempdir().unwrap();
        let config = test_config(&dir);

        let report = config.sources().await;
        assert!(report.iter().all(|s| s.source == ValueSource::Unset));

        config.save_email("a@b.c").await.unwrap();
        config.set_secret(PASSWORD_KEY, "pw").await.unwrap();

        let report = config.sources().await;
        assert_eq!(report[0].source, ValueSource::ConfigFile);
        assert_eq!(report[1].source, ValueSource::SecretsFile);
        assert_eq!(report[2].source, ValueSource::Unset);
    }

    #[test_case::test_case("", false; "empty name")]
    #[test_case::test_case("has-dash", false; "dash rejected")]
    #[test_case::test_case("has space", false; "space rejected")]
    #[test_case::test_case("VALID_NAME", true; "upper snake accepted")]
    #[test_case::test_case("valid123", true; "lower alnum accepted")]
    fn secret_names_are_validated(name: &str, ok: bool) {
        assert_eq!(validate_secret_name(name).is_ok(), ok);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn secrets_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let config = test_config(&dir);
        config.set_secret(PASSWORD_KEY, "pw").await.unwrap();

        let mode = std::fs::metadata(dir.path().join("secrets.json"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
