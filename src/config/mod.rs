//! Configuration management for agent-chat
//!
//! Configuration is read from `~/.config/agent-chat/config.toml` (platform
//! equivalent via `directories`) and merged with defaults. Environment
//! variables and CLI flags override file values.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Environment variable overriding `api.base_url`
pub const ENV_API_BASE: &str = "AGENT_CHAT_API_BASE";
/// Environment variable overriding `api.user_id`
pub const ENV_USER_ID: &str = "AGENT_CHAT_USER_ID";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub ui: UiConfig,
}

/// Backend connection settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL the `/available_agents` and `/chat/run` paths are joined onto
    pub base_url: String,
    /// Fixed user identifier sent with every chat request
    pub user_id: String,
    /// Service name reported with feedback
    pub service_name: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            user_id: "test_user".to_string(),
            service_name: "my-agent".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UiConfig {
    /// Text shown in the bot placeholder while a reply is in flight
    pub pending_text: String,
    /// Text used when the backend reply has no `output`
    pub no_response_text: String,
    /// Terminal poll interval in milliseconds
    pub tick_rate_ms: u64,
    /// Show `HH:MM` next to each transcript entry
    pub show_timestamps: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            pending_text: "Thinking...".to_string(),
            no_response_text: "No response received".to_string(),
            tick_rate_ms: 100,
            show_timestamps: true,
        }
    }
}

impl Config {
    /// Load configuration from the default location, or defaults if absent
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from_path(&config_path)
        } else {
            Ok(Config::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::load_from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Load configuration from a TOML string
    pub fn load_from_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "agent-chat") {
            Ok(proj_dirs.config_dir().join("config.toml"))
        } else {
            Ok(PathBuf::from("config.toml"))
        }
    }

    /// Directory for the TUI log file
    pub fn log_dir() -> Result<PathBuf> {
        let dir = match directories::ProjectDirs::from("", "", "agent-chat") {
            Some(proj_dirs) => proj_dirs.data_local_dir().to_path_buf(),
            None => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
        Ok(dir)
    }

    /// Apply `AGENT_CHAT_*` environment overrides
    pub fn apply_env(&mut self) {
        self.apply_overrides(
            std::env::var(ENV_API_BASE).ok(),
            std::env::var(ENV_USER_ID).ok(),
        );
    }

    /// Apply explicit overrides; `None` and blank values leave the field unchanged
    pub fn apply_overrides(&mut self, base_url: Option<String>, user_id: Option<String>) {
        if let Some(base_url) = base_url.filter(|s| !s.trim().is_empty()) {
            self.api.base_url = base_url;
        }
        if let Some(user_id) = user_id.filter(|s| !s.trim().is_empty()) {
            self.api.user_id = user_id;
        }
    }

    /// Parse and validate the API base URL
    pub fn api_base(&self) -> Result<Url> {
        let url = Url::parse(&self.api.base_url)
            .with_context(|| format!("Invalid api.base_url: {}", self.api.base_url))?;
        if url.cannot_be_a_base() {
            anyhow::bail!("api.base_url cannot be used as a base: {}", self.api.base_url);
        }
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api.user_id, "test_user");
        assert_eq!(config.ui.pending_text, "Thinking...");
        assert_eq!(config.ui.no_response_text, "No response received");
    }

    #[test]
    fn test_load_from_str_empty() {
        let config = Config::load_from_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_from_str_partial_config() {
        let config = Config::load_from_str(
            r#"
            [api]
            base_url = "https://agents.example.com/v1/"
            "#,
        )
        .unwrap();
        assert_eq!(config.api.base_url, "https://agents.example.com/v1/");
        // unspecified fields keep defaults
        assert_eq!(config.api.user_id, "test_user");
        assert_eq!(config.ui, UiConfig::default());
    }

    #[test]
    fn test_load_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[ui]\npending_text = \"Working\"\nshow_timestamps = false\n",
        )
        .unwrap();

        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.ui.pending_text, "Working");
        assert!(!config.ui.show_timestamps);
    }

    #[test]
    fn test_load_from_str_invalid() {
        assert!(Config::load_from_str("[api\nbase_url = 1").is_err());
    }

    #[test]
    fn test_overrides() {
        let mut config = Config::default();
        config.apply_overrides(Some("http://10.0.0.2:9000".into()), None);
        assert_eq!(config.api.base_url, "http://10.0.0.2:9000");
        assert_eq!(config.api.user_id, "test_user");

        config.apply_overrides(Some("  ".into()), Some("alice".into()));
        assert_eq!(config.api.base_url, "http://10.0.0.2:9000");
        assert_eq!(config.api.user_id, "alice");
    }

    #[test]
    fn test_api_base_validation() {
        let mut config = Config::default();
        assert!(config.api_base().is_ok());

        config.api.base_url = "not a url".to_string();
        assert!(config.api_base().is_err());

        config.api.base_url = "mailto:someone@example.com".to_string();
        assert!(config.api_base().is_err());
    }

    #[test]
    fn test_config_file_roundtrip() {
        let mut config = Config::default();
        config.api.user_id = "bob".to_string();
        config.ui.tick_rate_ms = 50;

        let serialized = toml::to_string_pretty(&config).unwrap();
        let parsed = Config::load_from_str(&serialized).unwrap();
        assert_eq!(parsed, config);
    }
}
