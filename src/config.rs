//! Process-scoped settings, persisted outside the corpus directory.
//!
//! The config file remembers the last opened folder and the captioning
//! model/prompt pair. It lives in the user's config directory:
//! - Linux: ~/.config/caption-curator/config.json
//! - macOS: ~/Library/Application Support/caption-curator/config.json
//! - Windows: %APPDATA%\caption-curator\config.json

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::ollama::{DEFAULT_MODEL, DEFAULT_PROMPT};

const CONFIG_DIR_NAME: &str = "caption-curator";
const CONFIG_FILE_NAME: &str = "config.json";

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_prompt() -> String {
    DEFAULT_PROMPT.to_string()
}

/// Persisted application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Last corpus folder opened, resumed when no folder is given
    #[serde(default)]
    pub last_folder: Option<PathBuf>,

    /// Captioning model identifier passed to the backend
    #[serde(default = "default_model")]
    pub model: String,

    /// Captioning instruction passed to the backend
    #[serde(default = "default_prompt")]
    pub prompt: String,

    /// Unix timestamp of the last write, informational only
    #[serde(default)]
    pub saved_at: Option<i64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            last_folder: None,
            model: default_model(),
            prompt: default_prompt(),
            saved_at: None,
        }
    }
}

impl AppConfig {
    /// Path of the per-user config file
    pub fn config_path() -> Result<PathBuf> {
        let base = dirs::config_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| Error::Config("could not determine config directory".to_string()))?;
        Ok(base.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load the user's settings; a missing file yields the defaults.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load settings from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(text) => serde_json::from_str(&text).map_err(|source| Error::MalformedStore {
                file: path.to_path_buf(),
                source,
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Persist the settings, stamping the write time.
    pub fn save(&mut self) -> Result<()> {
        let path = Self::config_path()?;
        self.save_to(&path)
    }

    /// Persist the settings to an explicit path, creating parents.
    pub fn save_to(&mut self, path: &Path) -> Result<()> {
        self.saved_at = Some(Utc::now().timestamp());
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(self)
            .expect("config serialization cannot fail");
        fs::write(path, text)?;
        Ok(())
    }

    /// Remember a corpus folder as the one to resume next run.
    pub fn remember_folder(&mut self, folder: &Path) -> Result<()> {
        self.last_folder = Some(folder.to_path_buf());
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = AppConfig::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.model, DEFAULT_MODEL);
    }

    #[test]
    fn test_round_trip_preserves_settings() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = AppConfig::default();
        config.last_folder = Some(PathBuf::from("/data/corpus"));
        config.model = "moondream".to_string();
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.last_folder, Some(PathBuf::from("/data/corpus")));
        assert_eq!(loaded.model, "moondream");
        assert!(loaded.saved_at.is_some());
    }

    #[test]
    fn test_missing_keys_fall_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"last_folder": "/data/corpus"}"#).unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.prompt, DEFAULT_PROMPT);
    }
}
