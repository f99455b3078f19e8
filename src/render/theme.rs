//! Status bar colors
//!
//! Colors come from the X resource database so the bar follows the desktop
//! theme. Any key that cannot be resolved falls back to a fixed color.

use std::collections::HashMap;
use std::process::Command;

use crate::app::config::ThemeConfig;

pub const DEFAULT_BACKGROUND: &str = "#000000";
pub const DEFAULT_TEXT: &str = "#FFFFFF";
pub const DEFAULT_URGENT: &str = "#FF0000";

/// Key → color string source
pub trait ColorLookup {
    fn lookup(&self, key: &str) -> Option<String>;
}

/// Reads values with `xrdb -get <key>`
#[derive(Debug, Default, Clone, Copy)]
pub struct Xrdb;

impl ColorLookup for Xrdb {
    fn lookup(&self, key: &str) -> Option<String> {
        let output = Command::new("xrdb").args(["-get", key]).output();
        match output {
            Ok(o) if o.status.success() => {
                let value = String::from_utf8_lossy(&o.stdout).trim().to_string();
                (!value.is_empty()).then_some(value)
            }
            Ok(o) => {
                tracing::debug!(
                    "xrdb -get {} failed: {}",
                    key,
                    String::from_utf8_lossy(&o.stderr).trim()
                );
                None
            }
            Err(e) => {
                tracing::debug!("Failed to run xrdb: {}", e);
                None
            }
        }
    }
}

impl ColorLookup for HashMap<String, String> {
    fn lookup(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// Resolved colors used by the formatter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    pub background: String,
    pub text: String,
    pub urgent: String,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: DEFAULT_BACKGROUND.to_string(),
            text: DEFAULT_TEXT.to_string(),
            urgent: DEFAULT_URGENT.to_string(),
        }
    }
}

impl Palette {
    /// Pinned colors win, then the lookup, then the built-in defaults
    pub fn resolve(config: &ThemeConfig, source: &dyn ColorLookup) -> Self {
        let pick = |pinned: &Option<String>, key: &str, fallback: &str| {
            pinned
                .clone()
                .or_else(|| source.lookup(key))
                .unwrap_or_else(|| fallback.to_string())
        };

        Self {
            background: pick(&config.background, &config.background_key, DEFAULT_BACKGROUND),
            text: pick(&config.text, &config.text_key, DEFAULT_TEXT),
            urgent: pick(&config.urgent, &config.urgent_key, DEFAULT_URGENT),
        }
    }
}
