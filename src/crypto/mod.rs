//! Symmetric cryptography for qrsecrets
//!
//! Provides Argon2id passphrase stretching and AES-GCM sealing of the
//! ciphertext section, plus zeroizing containers for secret material.

pub mod encryption;
pub mod key_derivation;
pub mod secure_memory;

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::aead::OsRng;

use crate::error::{QrResult, QrSecretsError};

pub use encryption::{generate_nonce, open, seal, NONCE_SIZE};
pub use key_derivation::{derive_key, DerivedKey, KeyDerivationParams};
pub use secure_memory::{SecureBytes, SecureString};

/// Fill `buf` from the operating system CSPRNG
///
/// There is no fallback source: if the OS cannot supply randomness the
/// operation fails.
pub fn fill_random(buf: &mut [u8]) -> QrResult<()> {
    OsRng.try_fill_bytes(buf).map_err(|_| QrSecretsError::Rng)
}
