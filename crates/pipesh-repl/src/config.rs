//! Configuration for the pipesh REPL.
//!
//! Configuration is loaded from `~/.config/pipesh/config.toml`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

/// Configuration for the interactive REPL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplConfig {
    /// Prompt printed before every line.
    #[serde(default = "default_prompt")]
    pub prompt: String,

    /// Print the welcome and goodbye lines.
    #[serde(default = "default_true")]
    pub banner: bool,

    /// Load and save line history.
    #[serde(default = "default_true")]
    pub history: bool,

    /// History file; defaults to `history.txt` in the data directory.
    #[serde(default)]
    pub history_file: Option<PathBuf>,
}

fn default_prompt() -> String {
    "> ".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self {
            prompt: default_prompt(),
            banner: true,
            history: true,
            history_file: None,
        }
    }
}

impl ReplConfig {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, returns default configuration.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    /// Get the default config file path.
    pub fn config_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("", "", "pipesh")
            .context("Could not determine config directory")?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Where line history is kept, or `None` when history is off.
    pub fn history_path(&self) -> Option<PathBuf> {
        if !self.history {
            return None;
        }
        if let Some(path) = &self.history_file {
            return Some(path.clone());
        }
        ProjectDirs::from("", "", "pipesh").map(|d| d.data_dir().join("history.txt"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ReplConfig::default();
        assert_eq!(config.prompt, "> ");
        assert!(config.banner);
        assert!(config.history);
        assert!(config.history_file.is_none());
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
prompt = "$ "
banner = false
history = true
history_file = "/tmp/pipesh-history"
"#;

        let config: ReplConfig = toml::from_str(toml).expect("parse failed");
        assert_eq!(config.prompt, "$ ");
        assert!(!config.banner);
        assert_eq!(
            config.history_path(),
            Some(PathBuf::from("/tmp/pipesh-history"))
        );
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: ReplConfig = toml::from_str("").expect("parse failed");
        assert_eq!(config, ReplConfig::default());
    }

    #[test]
    fn test_history_disabled() {
        let config: ReplConfig = toml::from_str("history = false").expect("parse failed");
        assert_eq!(config.history_path(), None);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "prompt = \"pipesh> \"\n").unwrap();

        let config = ReplConfig::load_from(&path).unwrap();
        assert_eq!(config.prompt, "pipesh> ");
        assert!(config.banner);
    }

    #[test]
    fn test_load_from_bad_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "banner = \"maybe\"\n").unwrap();

        let err = ReplConfig::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"));
    }
}
