use crate::index::types::IndexConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const APP_NAME: &str = "invfile";
const CONFIG_FILE: &str = "config.json";
const INDEX_DIR: &str = "index";

/// Application configuration stored in the app data directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Where artifacts are written and read when no directory is given
    #[serde(default)]
    pub index_dir: Option<PathBuf>,

    /// Raw corpus used for title lookup when none is given
    #[serde(default)]
    pub corpus: Option<PathBuf>,

    /// Results shown per page
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Corpus markers and artifact names
    #[serde(default)]
    pub index: IndexConfig,
}

fn default_page_size() -> usize {
    10
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            index_dir: None,
            corpus: None,
            page_size: default_page_size(),
            index: IndexConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load config from the app data directory, or return default if not found
    pub fn load() -> Result<Self> {
        Self::load_from(&get_config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file {}", config_path.display()))?;
        let config: AppConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", config_path.display()))?;
        Ok(config)
    }

    /// Save config to the app data directory
    pub fn save(&self) -> Result<PathBuf> {
        let config_path = get_config_path()?;
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).context("Failed to create app data directory")?;
        }
        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&config_path, content).context("Failed to write config file")?;
        Ok(config_path)
    }

    /// Index directory: explicit argument, then config, then the app data default
    pub fn resolve_index_dir(&self, explicit: Option<PathBuf>) -> Result<PathBuf> {
        match explicit.or_else(|| self.index_dir.clone()) {
            Some(dir) => Ok(dir),
            None => Ok(get_app_data_dir()?.join(INDEX_DIR)),
        }
    }

    /// Effective page size, never 0
    pub fn effective_page_size(&self, explicit: Option<usize>) -> usize {
        explicit.unwrap_or(self.page_size).max(1)
    }
}

/// Get the path to the config file
pub fn get_config_path() -> Result<PathBuf> {
    Ok(get_app_data_dir()?.join(CONFIG_FILE))
}

/// Get the application data directory
pub fn get_app_data_dir() -> Result<PathBuf> {
    let base = if cfg!(target_os = "macos") {
        dirs::home_dir().map(|h| h.join("Library").join("Application Support"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
    } else {
        // Linux/Unix: use XDG_DATA_HOME or ~/.local/share
        dirs::data_dir()
    };

    let base = base.context("Could not determine app data directory")?;
    Ok(base.join(APP_NAME))
}
