//! Configuration types for the bot runtime.

use lyrebird_catalog::CatalogConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration, loaded from a TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Chat platform adapter settings.
    pub telegram: TelegramConfig,
    /// Catalog site settings.
    pub catalog: CatalogConfig,
    /// Search pipeline settings.
    pub search: SearchSettings,
    /// Session store bounds.
    pub sessions: SessionSettings,
    /// Optional usage logging collaborator.
    pub usage_log: UsageLogSettings,
}

/// Telegram Bot API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    /// Bot token from BotFather. Must be set for the bot to start.
    pub bot_token: String,
    /// API base URL; overridable for tests.
    pub api_base: String,
    /// Long-poll timeout for `getUpdates`, in seconds.
    pub poll_timeout_secs: u64,
    /// Optional web-app URL rendered as a reply-keyboard button in the
    /// greeting (the "Radio" button).
    pub webapp_url: Option<String>,
    /// Chat command that returns the usage report (e.g. `/report`).
    /// `None` disables the command.
    pub report_command: Option<String>,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            api_base: "https://api.telegram.org".to_owned(),
            poll_timeout_secs: 25,
            webapp_url: None,
            report_command: None,
        }
    }
}

/// Search pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Tracks longer than this are dropped from results (inclusive bound).
    pub max_duration_secs: u64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            max_duration_secs: 600,
        }
    }
}

/// Session store bounds. Sessions beyond these are evicted; an evicted
/// session reads as "no prior search".
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Maximum number of concurrently retained sessions.
    pub max_entries: u64,
    /// Session time-to-live in seconds.
    pub ttl_secs: u64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            max_entries: 10_000,
            ttl_secs: 86_400,
        }
    }
}

/// Usage logging collaborator settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UsageLogSettings {
    /// Whether searches are recorded at all.
    pub enabled: bool,
    /// CSV file the log appends to.
    pub path: PathBuf,
}

impl Default for UsageLogSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            path: PathBuf::from("usage.csv"),
        }
    }
}

impl BotConfig {
    /// Load configuration from a TOML file. A missing file yields the
    /// defaults; a malformed file is an error.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            tracing::info!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        let config = toml::from_str(&raw)?;
        Ok(config)
    }

    /// Reject configurations the runtime cannot start with.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.telegram.bot_token.trim().is_empty() {
            anyhow::bail!("telegram.bot_token must be set");
        }
        self.catalog
            .validate()
            .map_err(|e| anyhow::anyhow!("catalog config invalid: {e}"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = BotConfig::default();
        assert_eq!(config.search.max_duration_secs, 600);
        assert_eq!(config.sessions.max_entries, 10_000);
        assert_eq!(config.sessions.ttl_secs, 86_400);
        assert_eq!(config.telegram.poll_timeout_secs, 25);
        assert!(!config.usage_log.enabled);
        assert!(config.telegram.report_command.is_none());
    }

    #[test]
    fn partial_toml_overrides_defaults() {
        let config: BotConfig = toml::from_str(
            r#"
            [telegram]
            bot_token = "123:abc"
            report_command = "/report"

            [search]
            max_duration_secs = 300
            "#,
        )
        .expect("parse");
        assert_eq!(config.telegram.bot_token, "123:abc");
        assert_eq!(config.telegram.report_command.as_deref(), Some("/report"));
        assert_eq!(config.search.max_duration_secs, 300);
        // Untouched sections keep their defaults.
        assert_eq!(config.catalog.timeout_seconds, 15);
        assert_eq!(config.sessions.max_entries, 10_000);
    }

    #[test]
    fn validate_rejects_empty_token() {
        let config = BotConfig::default();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_accepts_configured_token() {
        let config = BotConfig {
            telegram: TelegramConfig {
                bot_token: "123:abc".into(),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn load_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = BotConfig::load(&dir.path().join("absent.toml")).expect("load");
        assert!(config.telegram.bot_token.is_empty());
    }

    #[test]
    fn load_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "telegram = 5").expect("write");
        assert!(BotConfig::load(&path).is_err());
    }
}
