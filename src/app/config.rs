use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::control::{PopOrder, ServerOptions};
use crate::render::status_bar::DEFAULT_MAX_ENTRY_CHARS;

/// Agent configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Control socket path
    #[serde(default = "crate::control::default_socket_path")]
    pub socket_path: PathBuf,
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Which notification `pop` removes ("newest" or "oldest")
    #[serde(default)]
    pub pop_order: PopOrder,
    /// Drop control connections that send nothing for this many seconds
    #[serde(default)]
    pub read_timeout_secs: Option<u64>,
    /// Status line settings
    #[serde(default)]
    pub render: RenderConfig,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            socket_path: crate::control::default_socket_path(),
            log_level: default_log_level(),
            pop_order: PopOrder::default(),
            read_timeout_secs: None,
            render: RenderConfig::default(),
        }
    }
}

/// Status line settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Entries longer than this are cut and end in "..."
    #[serde(default = "default_max_entry_chars")]
    pub max_entry_chars: usize,
    /// Glyph drawn between entries (rendered in font slot T2)
    #[serde(default = "default_separator_glyph")]
    pub separator_glyph: String,
    #[serde(default)]
    pub theme: ThemeConfig,
}

fn default_max_entry_chars() -> usize {
    DEFAULT_MAX_ENTRY_CHARS
}

fn default_separator_glyph() -> String {
    "\u{e0b1}".to_string()
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_entry_chars: default_max_entry_chars(),
            separator_glyph: default_separator_glyph(),
            theme: ThemeConfig::default(),
        }
    }
}

/// X resource keys for the bar colors, with optional pinned values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeConfig {
    #[serde(default = "default_background_key")]
    pub background_key: String,
    #[serde(default = "default_text_key")]
    pub text_key: String,
    #[serde(default = "default_urgent_key")]
    pub urgent_key: String,
    /// Pinned colors skip the xrdb lookup
    #[serde(default)]
    pub background: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub urgent: Option<String>,
}

fn default_background_key() -> String {
    "background".to_string()
}

fn default_text_key() -> String {
    "foreground-alt".to_string()
}

fn default_urgent_key() -> String {
    "secondary".to_string()
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            background_key: default_background_key(),
            text_key: default_text_key(),
            urgent_key: default_urgent_key(),
            background: None,
            text: None,
            urgent: None,
        }
    }
}

impl Config {
    /// Load from the default location, writing defaults there on first run
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Self::default();
            if let Err(e) = config.save_to(&config_path) {
                tracing::warn!("Failed to save default config: {}", e);
            }
            Ok(config)
        }
    }

    /// Load from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        toml::from_str(&content).map_err(|e| anyhow::anyhow!("Failed to parse config: {}", e))
    }

    /// ~/.config/notification-agent/config.toml
    pub fn config_path() -> Result<PathBuf> {
        let base_dirs = directories::BaseDirs::new()
            .ok_or_else(|| anyhow::anyhow!("Failed to determine home directory"))?;
        Ok(base_dirs
            .home_dir()
            .join(".config/notification-agent/config.toml"))
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        Ok(())
    }

    pub fn server_options(&self) -> ServerOptions {
        ServerOptions {
            pop_order: self.pop_order,
            read_timeout: self.read_timeout_secs.map(Duration::from_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.socket_path, crate::control::default_socket_path());
        assert_eq!(config.pop_order, PopOrder::Newest);
        assert_eq!(config.render.max_entry_chars, 40);
        assert_eq!(config.render.theme.urgent_key, "secondary");
        assert!(config.read_timeout_secs.is_none());
    }

    #[test]
    fn test_partial_file() {
        let config: Config = toml::from_str(
            r##"
socket_path = "/run/user/1000/agent.sock"
pop_order = "oldest"
read_timeout_secs = 10

[render]
max_entry_chars = 25

[render.theme]
urgent = "#ff00ff"
"##,
        )
        .unwrap();

        assert_eq!(config.socket_path, PathBuf::from("/run/user/1000/agent.sock"));
        assert_eq!(config.pop_order, PopOrder::Oldest);
        assert_eq!(config.render.max_entry_chars, 25);
        assert_eq!(config.render.theme.urgent.as_deref(), Some("#ff00ff"));
        assert_eq!(config.render.theme.background_key, "background");

        let options = config.server_options();
        assert_eq!(options.read_timeout, Some(Duration::from_secs(10)));
        assert_eq!(options.pop_order, PopOrder::Oldest);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/config.toml");

        let mut config = Config::default();
        config.pop_order = PopOrder::Oldest;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.pop_order, PopOrder::Oldest);
        assert_eq!(loaded.render.separator_glyph, config.render.separator_glyph);
    }

    #[test]
    fn test_invalid_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "pop_order = \"sideways\"").unwrap();
        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"));
    }
}
