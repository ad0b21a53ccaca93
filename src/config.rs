//! Configuration loading and management
//!
//! Handles parsing of the `config.toml` file found in the platform config
//! directory (or the path passed with `--config`).

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::filter::Filter;

/// Name of the config file inside the config directory
pub const CONFIG_FILE: &str = "config.toml";

/// Storage slot key used when none is configured
pub const DEFAULT_SLOT_KEY: &str = "todos.v1";

const ID_LEN_MIN: usize = 6;
const ID_LEN_MAX: usize = 16;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Where and how the task slot is stored
    #[serde(default)]
    pub storage: StorageConfig,

    /// Task id generation
    #[serde(default)]
    pub tasks: TasksConfig,

    /// Terminal view settings
    #[serde(default)]
    pub ui: UiConfig,
}

/// Storage-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Data directory; platform data dir when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,

    /// Slot key the task list is saved under
    #[serde(default = "default_key")]
    pub key: String,

    /// How long to wait for the slot lock
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

fn default_key() -> String {
    DEFAULT_SLOT_KEY.to_string()
}

fn default_lock_timeout_ms() -> u64 {
    crate::lock::DEFAULT_LOCK_TIMEOUT_MS
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: None,
            key: default_key(),
            lock_timeout_ms: default_lock_timeout_ms(),
        }
    }
}

/// Tasks configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TasksConfig {
    /// Length of generated task ids
    #[serde(default = "default_id_len")]
    pub id_len: usize,
}

fn default_id_len() -> usize {
    8
}

impl Default for TasksConfig {
    fn default() -> Self {
        Self {
            id_len: default_id_len(),
        }
    }
}

/// Terminal view configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Filter selected when a session starts
    #[serde(default = "default_filter")]
    pub default_filter: String,
}

fn default_filter() -> String {
    Filter::All.as_str().to_string()
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            default_filter: default_filter(),
        }
    }
}

impl UiConfig {
    pub fn default_filter(&self) -> Result<Filter> {
        self.default_filter
            .parse()
            .map_err(|err| Error::InvalidConfig(format!("ui.default_filter: {err}")))
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|err| Error::InvalidConfig(format!("{}: {err}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Load `config.toml` from `dir`, or return defaults.
    ///
    /// A broken implicit config is logged and ignored.
    pub fn load_from_dir(dir: &Path) -> Self {
        let config_path = dir.join(CONFIG_FILE);
        if !config_path.exists() {
            return Self::default();
        }
        match Self::load(&config_path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(path = %config_path.display(), %err, "ignoring invalid config");
                Self::default()
            }
        }
    }

    /// Resolve configuration for a run: an explicit path must load cleanly,
    /// otherwise the platform config dir is consulted.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        Ok(default_config_dir()
            .map(|dir| Self::load_from_dir(&dir))
            .unwrap_or_default())
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        crate::lock::write_atomic(path, content.as_bytes())
    }

    /// Data directory: `override_dir`, then `storage.dir`, then the platform
    /// data dir.
    pub fn data_dir(&self, override_dir: Option<&Path>) -> Result<PathBuf> {
        if let Some(dir) = override_dir {
            return Ok(dir.to_path_buf());
        }
        if let Some(dir) = self.storage.dir.as_ref() {
            return Ok(dir.clone());
        }
        project_dirs()
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or(Error::NoDataDir)
    }

    fn validate(&self) -> Result<()> {
        self.storage.validate()?;
        self.tasks.validate()?;
        self.ui.default_filter()?;
        Ok(())
    }
}

impl StorageConfig {
    fn validate(&self) -> Result<()> {
        validate_slot_key(&self.key)
            .map_err(|err| Error::InvalidConfig(format!("storage.key: {err}")))?;
        if self.lock_timeout_ms == 0 {
            return Err(Error::InvalidConfig(
                "storage.lock_timeout_ms must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl TasksConfig {
    fn validate(&self) -> Result<()> {
        if self.id_len < ID_LEN_MIN {
            return Err(Error::InvalidConfig(format!(
                "tasks.id_len must be >= {ID_LEN_MIN}"
            )));
        }
        if self.id_len > ID_LEN_MAX {
            return Err(Error::InvalidConfig(format!(
                "tasks.id_len must be <= {ID_LEN_MAX}"
            )));
        }
        Ok(())
    }
}

/// Slot keys become file names, so they are restricted to a safe charset.
pub fn validate_slot_key(key: &str) -> std::result::Result<(), String> {
    if key.trim().is_empty() {
        return Err("key cannot be empty".to_string());
    }
    if key.starts_with('.') {
        return Err(format!("key '{key}' cannot start with '.'"));
    }
    if !key
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | '-'))
    {
        return Err(format!("key '{key}' may only contain [A-Za-z0-9._-]"));
    }
    Ok(())
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "todos")
}

/// Platform config directory for todos, if the platform has one
pub fn default_config_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().to_path_buf())
}
