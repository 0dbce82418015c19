//! User defaults for qrsecrets
//!
//! Stored as JSON in [`QrSecretsPaths::settings_file`]. Every field has a
//! serde default so older or hand-edited files keep loading.

use serde::{Deserialize, Serialize};

use super::paths::QrSecretsPaths;
use super::presets::Preset;
use crate::error::{QrResult, QrSecretsError};
use crate::registry::{curves, hashes, CurveId, HashId};

/// Persisted defaults applied when a command line flag is omitted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Curve for `generate-key`, e.g. `P-521`
    #[serde(default = "default_curve")]
    pub default_curve: String,

    /// Hash for the metadata ECIES KDF, e.g. `SHA-256`
    #[serde(default = "default_hash")]
    pub default_hash: String,

    /// Argon2 preset for `encrypt`
    #[serde(default)]
    pub default_preset: Preset,

    /// Filler bytes appended to every secret
    #[serde(default)]
    pub default_padding: u32,

    /// Emit and expect base64 instead of raw bytes
    #[serde(default)]
    pub base64_output: bool,
}

fn default_schema_version() -> u32 {
    1
}

fn default_curve() -> String {
    "P-521".to_string()
}

fn default_hash() -> String {
    "SHA-256".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            default_curve: default_curve(),
            default_hash: default_hash(),
            default_preset: Preset::default(),
            default_padding: 0,
            base64_output: false,
        }
    }
}

impl Settings {
    /// Load settings from disk, or return defaults if none were saved
    pub fn load_or_create(paths: &QrSecretsPaths) -> QrResult<Self> {
        let settings_path = paths.settings_file();
        if !settings_path.exists() {
            return Ok(Settings::default());
        }

        let contents = std::fs::read_to_string(&settings_path)
            .map_err(|e| QrSecretsError::Io(format!("failed to read settings file: {}", e)))?;
        let settings: Settings = serde_json::from_str(&contents)
            .map_err(|e| QrSecretsError::Config(format!("failed to parse settings file: {}", e)))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to disk
    pub fn save(&self, paths: &QrSecretsPaths) -> QrResult<()> {
        self.validate()?;
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| QrSecretsError::Io(format!("failed to write settings file: {}", e)))
    }

    /// Resolved default curve
    pub fn curve(&self) -> QrResult<CurveId> {
        match curves::name_to_id(&self.default_curve) {
            CurveId::INVALID => Err(QrSecretsError::Config(format!(
                "unknown curve '{}' in settings",
                self.default_curve
            ))),
            id => Ok(id),
        }
    }

    /// Resolved default hash
    pub fn hash(&self) -> QrResult<HashId> {
        hashes::name_to_id(&self.default_hash).ok_or_else(|| {
            QrSecretsError::Config(format!("unknown hash '{}' in settings", self.default_hash))
        })
    }

    fn validate(&self) -> QrResult<()> {
        self.curve()?;
        self.hash()?;
        Ok(())
    }
}
