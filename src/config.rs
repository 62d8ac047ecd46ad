use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::keyboard::layout::DEFAULT_LAYOUT;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_keyboard_layout")]
    pub keyboard_layout: String,
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_word_count")]
    pub word_count: usize,
    /// Capitals must use the Shift on the opposite hand.
    #[serde(default = "default_strict_shift_side")]
    pub strict_shift_side: bool,
    /// Clear held keys when the terminal reports no release within this many
    /// milliseconds of the last press.
    #[serde(default = "default_release_fallback_ms")]
    pub release_fallback_ms: u64,
    #[serde(default = "default_show_navigation")]
    pub show_navigation: bool,
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_keyboard_layout() -> String {
    DEFAULT_LAYOUT.to_string()
}
fn default_theme() -> String {
    "catppuccin-mocha".to_string()
}
fn default_word_count() -> usize {
    20
}
fn default_strict_shift_side() -> bool {
    true
}
fn default_release_fallback_ms() -> u64 {
    150
}
fn default_show_navigation() -> bool {
    true
}
fn default_log_filter() -> String {
    "keyguide=info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            keyboard_layout: default_keyboard_layout(),
            theme: default_theme(),
            word_count: default_word_count(),
            strict_shift_side: default_strict_shift_side(),
            release_fallback_ms: default_release_fallback_ms(),
            show_navigation: default_show_navigation(),
            log_filter: default_log_filter(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Read `path`, or defaults when the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// `<config_dir>/keyguide`, also searched for user layouts and boards.
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("keyguide")
    }

    /// `<data_dir>/keyguide`, where the log file goes.
    pub fn data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("keyguide")
    }

    /// Validate `keyboard_layout` against the layouts that exist, resetting to
    /// the default if it names none of them. Call after deserialization.
    pub fn normalize_layout(&mut self, valid: &[String]) {
        if !valid.iter().any(|name| name == &self.keyboard_layout) {
            self.keyboard_layout = default_keyboard_layout();
        }
    }
}
