//! Per-user configuration: which provider to use and its settings.
//!
//! Stored as YAML at `~/.gritty/config.yaml`:
//!
//! ```yaml
//! provider: openai
//! config:
//!   apiKey: sk-...
//! ```
//!
//! The file is restricted to its owner after every write because it usually
//! holds a credential.

use crate::error::GrittyError;
use dirs::home_dir;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

const CONFIG_DIR: &str = ".gritty";
const CONFIG_FILE: &str = "config.yaml";

/// The persisted provider selection.
///
/// `config` is the provider-specific settings node; only the provider named
/// by `provider` knows how to decode it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredConfig {
    pub provider: String,
    #[serde(default)]
    pub config: serde_yaml::Value,
}

impl StoredConfig {
    pub fn new(provider: impl Into<String>, config: serde_yaml::Value) -> Self {
        Self {
            provider: provider.into(),
            config,
        }
    }
}

/// Reads and writes [`StoredConfig`] at a fixed path.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// Store at the default per-user location.
    pub fn user_default() -> Result<Self, GrittyError> {
        let home = home_dir().ok_or(GrittyError::HomeDirUnavailable)?;
        Ok(Self::at(home.join(CONFIG_DIR).join(CONFIG_FILE)))
    }

    /// Store at an explicit path.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Loads the stored configuration.
    ///
    /// # Errors
    ///
    /// - [`GrittyError::ConfigMissing`] if the file does not exist
    /// - [`GrittyError::ConfigRead`] if it cannot be read
    /// - [`GrittyError::ConfigInvalid`] if it is not valid YAML of the
    ///   expected shape or names no provider
    pub fn load(&self) -> Result<StoredConfig, GrittyError> {
        if !self.path.exists() {
            return Err(GrittyError::ConfigMissing {
                path: self.path.clone(),
            });
        }

        let content = fs::read_to_string(&self.path).map_err(|source| GrittyError::ConfigRead {
            path: self.path.clone(),
            source,
        })?;
        let config: StoredConfig = serde_yaml::from_str(&content)
            .map_err(|e| GrittyError::ConfigInvalid(e.to_string()))?;

        if config.provider.trim().is_empty() {
            return Err(GrittyError::ConfigInvalid(
                "provider not set in configuration file".to_string(),
            ));
        }

        info!("Loaded config from: {}", self.path.display());
        Ok(config)
    }

    /// Writes the configuration, replacing any previous file, then restricts
    /// the file to owner read/write.
    pub fn save(&self, config: &StoredConfig) -> Result<(), GrittyError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| GrittyError::ConfigWrite(e.to_string()))?;
        }

        let content =
            serde_yaml::to_string(config).map_err(|e| GrittyError::ConfigWrite(e.to_string()))?;
        fs::write(&self.path, content).map_err(|e| GrittyError::ConfigWrite(e.to_string()))?;
        self.restrict_permissions()?;

        info!("Saved config to: {}", self.path.display());
        Ok(())
    }

    #[cfg(unix)]
    fn restrict_permissions(&self) -> Result<(), GrittyError> {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600)).map_err(|source| {
            GrittyError::FilePermission {
                path: self.path.clone(),
                source,
            }
        })
    }

    #[cfg(not(unix))]
    fn restrict_permissions(&self) -> Result<(), GrittyError> {
        Ok(())
    }
}
