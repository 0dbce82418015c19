//! Path management for qrsecrets
//!
//! ## Path Resolution Order
//!
//! 1. `QRSECRETS_CONFIG_DIR` environment variable (if set)
//! 2. Unix (Linux/macOS): `$XDG_CONFIG_HOME/qrsecrets` or `~/.config/qrsecrets`
//! 3. Windows: `%APPDATA%\qrsecrets`

use std::path::{Path, PathBuf};

use crate::error::{QrResult, QrSecretsError};

/// Environment variable overriding the configuration directory
pub const CONFIG_DIR_ENV: &str = "QRSECRETS_CONFIG_DIR";

/// Locations of qrsecrets' files on disk
#[derive(Debug, Clone)]
pub struct QrSecretsPaths {
    base_dir: PathBuf,
}

impl QrSecretsPaths {
    /// Resolve the configuration directory for this user
    ///
    /// # Errors
    ///
    /// Returns an error if neither the override nor a home directory can be
    /// found.
    pub fn new() -> QrResult<Self> {
        let base_dir = match std::env::var_os(CONFIG_DIR_ENV) {
            Some(custom) if !custom.is_empty() => PathBuf::from(custom),
            _ => resolve_default_path()?,
        };
        Ok(Self { base_dir })
    }

    /// Use an explicit base directory (tests, `--config-dir`)
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// `config.json` inside the base directory
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Create the base directory if it is missing
    pub fn ensure_directories(&self) -> QrResult<()> {
        std::fs::create_dir_all(&self.base_dir).map_err(|e| {
            QrSecretsError::Io(format!(
                "failed to create {}: {}",
                self.base_dir.display(),
                e
            ))
        })
    }

    /// Whether settings have ever been saved
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}

#[cfg(not(windows))]
fn resolve_default_path() -> QrResult<PathBuf> {
    let config_base = match std::env::var_os("XDG_CONFIG_HOME") {
        Some(xdg) if !xdg.is_empty() => PathBuf::from(xdg),
        _ => {
            let home = std::env::var_os("HOME").ok_or_else(|| {
                QrSecretsError::Config("could not determine the home directory".into())
            })?;
            PathBuf::from(home).join(".config")
        }
    };
    Ok(config_base.join("qrsecrets"))
}

#[cfg(windows)]
fn resolve_default_path() -> QrResult<PathBuf> {
    let appdata = std::env::var_os("APPDATA")
        .ok_or_else(|| QrSecretsError::Config("could not determine APPDATA directory".into()))?;
    Ok(PathBuf::from(appdata).join("qrsecrets"))
}
