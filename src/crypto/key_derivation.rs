//! Key derivation using Argon2id
//!
//! Stretches the container passphrase into the AES-GCM key of the ciphertext
//! section. All tuning parameters travel inside the (asymmetrically
//! encrypted) metadata section, so the decoder rebuilds the exact same
//! derivation from what it recovers there.

use argon2::{Algorithm, Argon2, Params, Version};
use serde::{Deserialize, Serialize};

use crate::error::{QrResult, QrSecretsError};

use super::encryption::SUPPORTED_KEY_LENS;
use super::SecureBytes;

/// Largest accepted Argon2 memory cost in KiB (4 GiB)
pub const MAX_MEMORY_COST: u32 = 4 * 1024 * 1024;

/// Largest accepted Argon2 iteration count
pub const MAX_TIME_COST: u32 = 256;

/// Argon2id tuning parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyDerivationParams {
    /// Memory cost in KiB (default: 32768 = 32 MiB)
    pub memory_cost: u32,
    /// Time cost (iterations, default: 3)
    pub time_cost: u32,
    /// Parallelism degree (default: 4)
    pub parallelism: u8,
    /// Derived key length in bytes (default: 32)
    pub key_len: u32,
}

impl Default for KeyDerivationParams {
    fn default() -> Self {
        Self {
            memory_cost: 32 * 1024,
            time_cost: 3,
            parallelism: 4,
            key_len: 32,
        }
    }
}

impl KeyDerivationParams {
    /// Create params with specific values
    pub fn with_values(memory_cost: u32, time_cost: u32, parallelism: u8, key_len: u32) -> Self {
        Self {
            memory_cost,
            time_cost,
            parallelism,
            key_len,
        }
    }

    fn to_argon2(self) -> QrResult<Params> {
        // Decoded parameters are unauthenticated, so cap the work they can ask for.
        if self.memory_cost > MAX_MEMORY_COST {
            return Err(QrSecretsError::Validation(format!(
                "Argon2 memory must be at most {} KiB, got {}",
                MAX_MEMORY_COST, self.memory_cost
            )));
        }
        if self.time_cost > MAX_TIME_COST {
            return Err(QrSecretsError::Validation(format!(
                "Argon2 iterations must be at most {}, got {}",
                MAX_TIME_COST, self.time_cost
            )));
        }
        if !SUPPORTED_KEY_LENS.contains(&self.key_len) {
            return Err(QrSecretsError::Validation(format!(
                "Argon2 key length must be one of {:?} bytes, got {}",
                SUPPORTED_KEY_LENS, self.key_len
            )));
        }
        let key_len = usize::try_from(self.key_len).map_err(|_| {
            QrSecretsError::Validation(format!("Argon2 key length {} is too large", self.key_len))
        })?;
        Params::new(
            self.memory_cost,
            self.time_cost,
            u32::from(self.parallelism),
            Some(key_len),
        )
        .map_err(|e| QrSecretsError::Validation(format!("Invalid Argon2 parameters: {}", e)))
    }

    /// Check the parameters against Argon2's limits and the cost ceiling
    pub fn validate(&self) -> QrResult<()> {
        self.to_argon2().map(|_| ())
    }
}

/// A derived encryption key, zeroized on drop
pub struct DerivedKey {
    key: SecureBytes,
}

impl DerivedKey {
    /// Get the key bytes
    pub fn as_bytes(&self) -> &[u8] {
        self.key.as_bytes()
    }

    /// Key length in bytes
    pub fn len(&self) -> usize {
        self.key.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.key.is_empty()
    }
}

/// Derive an encryption key from a passphrase and salt
///
/// Invalid parameters are reported as [`QrSecretsError::Validation`]; the
/// decode path remaps them so that they look like any other decryption
/// failure.
pub fn derive_key(
    passphrase: &[u8],
    salt: &[u8],
    params: &KeyDerivationParams,
) -> QrResult<DerivedKey> {
    let argon2_params = params.to_argon2()?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon2_params);

    let mut key = SecureBytes::new(vec![0u8; params.key_len as usize]);
    argon2
        .hash_password_into(passphrase, salt, key.as_bytes_mut())
        .map_err(|e| QrSecretsError::Validation(format!("Key derivation failed: {}", e)))?;

    Ok(DerivedKey { key })
}
