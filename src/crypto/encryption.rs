//! AES-GCM encryption/decryption
//!
//! Provides the AEAD used both for the ciphertext section and inside the
//! ECIES wrapping of the metadata section. The key length selects the AES
//! variant (16, 24 or 32 bytes). No associated data is used.

use aes::Aes192;
use aes_gcm::{
    aead::{consts::U12, Aead, KeyInit, Nonce},
    Aes128Gcm, Aes256Gcm, AesGcm,
};

use crate::error::{QrResult, QrSecretsError};

/// Size of the AES-GCM nonce in bytes (96 bits)
pub const NONCE_SIZE: usize = 12;

/// Size of the AES-GCM authentication tag in bytes
pub const TAG_SIZE: usize = 16;

/// Key lengths accepted by [`seal`] and [`open`]
pub const SUPPORTED_KEY_LENS: [u32; 3] = [16, 24, 32];

type Aes192Gcm = AesGcm<Aes192, U12>;

/// Generate a fresh random nonce
pub fn generate_nonce() -> QrResult<[u8; NONCE_SIZE]> {
    let mut nonce = [0u8; NONCE_SIZE];
    super::fill_random(&mut nonce)?;
    Ok(nonce)
}

fn seal_with<C: KeyInit + Aead>(
    key: &[u8],
    nonce: &[u8; NONCE_SIZE],
    plaintext: &[u8],
) -> QrResult<Vec<u8>> {
    let cipher = C::new_from_slice(key)
        .map_err(|e| QrSecretsError::Encryption(format!("Failed to create cipher: {}", e)))?;
    cipher
        .encrypt(Nonce::<C>::from_slice(nonce), plaintext)
        .map_err(|e| QrSecretsError::Encryption(format!("Encryption failed: {}", e)))
}

fn open_with<C: KeyInit + Aead>(
    key: &[u8],
    nonce: &[u8; NONCE_SIZE],
    ciphertext: &[u8],
) -> QrResult<Vec<u8>> {
    let cipher = C::new_from_slice(key).map_err(|_| QrSecretsError::Decryption)?;
    cipher
        .decrypt(Nonce::<C>::from_slice(nonce), ciphertext)
        .map_err(|_| QrSecretsError::Decryption)
}

/// Encrypt `plaintext` and append the authentication tag
pub fn seal(key: &[u8], nonce: &[u8; NONCE_SIZE], plaintext: &[u8]) -> QrResult<Vec<u8>> {
    match key.len() {
        16 => seal_with::<Aes128Gcm>(key, nonce, plaintext),
        24 => seal_with::<Aes192Gcm>(key, nonce, plaintext),
        32 => seal_with::<Aes256Gcm>(key, nonce, plaintext),
        n => Err(QrSecretsError::Validation(format!(
            "Invalid AES key length: {} bytes",
            n
        ))),
    }
}

/// Authenticate and decrypt `ciphertext`
///
/// Every failure, including an unusable key length, is reported as the
/// same [`QrSecretsError::Decryption`].
pub fn open(key: &[u8], nonce: &[u8; NONCE_SIZE], ciphertext: &[u8]) -> QrResult<Vec<u8>> {
    match key.len() {
        16 => open_with::<Aes128Gcm>(key, nonce, ciphertext),
        24 => open_with::<Aes192Gcm>(key, nonce, ciphertext),
        32 => open_with::<Aes256Gcm>(key, nonce, ciphertext),
        _ => Err(QrSecretsError::Decryption),
    }
}
