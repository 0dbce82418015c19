//! Named security levels
//!
//! A preset picks a curve for new keys and the Argon2 cost applied to the
//! passphrase. Higher presets make every decode slower on purpose.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::crypto::KeyDerivationParams;
use crate::error::QrSecretsError;
use crate::registry::CurveId;

const MIB: u32 = 1024;

/// Security preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
    Low,
    Medium,
    #[default]
    Default,
    High,
    VeryHigh,
}

impl Preset {
    pub const ALL: [Preset; 5] = [
        Preset::Low,
        Preset::Medium,
        Preset::Default,
        Preset::High,
        Preset::VeryHigh,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Preset::Low => "low",
            Preset::Medium => "medium",
            Preset::Default => "default",
            Preset::High => "high",
            Preset::VeryHigh => "very-high",
        }
    }

    /// Curve used when generating a key under this preset
    pub fn curve(self) -> CurveId {
        match self {
            Preset::Low => CurveId::P256,
            Preset::Medium => CurveId::P384,
            _ => CurveId::P521,
        }
    }

    /// Argon2 parameters for the ciphertext section
    pub fn kdf_params(self) -> KeyDerivationParams {
        let (memory, iterations, parallelism) = match self {
            Preset::Low => (32 * MIB, 4, 1),
            Preset::Medium => (32 * MIB, 4, 2),
            Preset::Default => (32 * MIB, 4, 4),
            Preset::High => (64 * MIB, 6, 4),
            Preset::VeryHigh => (64 * MIB, 12, 4),
        };
        KeyDerivationParams::with_values(memory, iterations, parallelism, 32)
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = QrSecretsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Preset::ALL
            .into_iter()
            .find(|p| p.name() == wanted)
            .ok_or_else(|| {
                QrSecretsError::Config(format!(
                    "unknown preset '{}' (expected low, medium, default, high or very-high)",
                    s
                ))
            })
    }
}
