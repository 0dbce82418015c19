//! Passphrase acquisition
//!
//! A value given on the command line (or through the environment variable
//! clap maps onto the same flag) wins. Otherwise the user is prompted on the
//! terminal with hidden input.
//!
//! Two secrets are handled here: the container passphrase and the optional
//! password protecting a private key file.

use crate::crypto::SecureString;
use crate::error::{QrResult, QrSecretsError};

/// Environment variable consulted for the container passphrase
pub const PASSPHRASE_ENV: &str = "QRSECRETS_PASSPHRASE";

/// Environment variable consulted for the private key password
pub const KEY_PASSWORD_ENV: &str = "QRSECRETS_KEY_PASSWORD";

/// Passphrase for sealing a new container
///
/// Prompts twice when interactive. An empty passphrase is refused.
pub fn for_encryption(given: Option<String>) -> QrResult<SecureString> {
    new_secret(given, "Passphrase: ", "Confirm passphrase: ", "passphrase")
}

/// Passphrase for opening an existing container
pub fn for_decryption(given: Option<String>) -> QrResult<SecureString> {
    match given {
        Some(p) => Ok(SecureString::new(p)),
        None => prompt("Passphrase: "),
    }
}

/// Password for locking a newly generated private key file
pub fn for_key_protection(given: Option<String>) -> QrResult<SecureString> {
    new_secret(given, "Key password: ", "Confirm key password: ", "key password")
}

/// Password for unlocking an encrypted private key file
pub fn for_key_unlock(given: Option<String>) -> QrResult<SecureString> {
    match given {
        Some(p) => Ok(SecureString::new(p)),
        None => prompt("Key password: "),
    }
}

fn new_secret(
    given: Option<String>,
    label: &str,
    confirm_label: &str,
    what: &str,
) -> QrResult<SecureString> {
    let secret = match given {
        Some(p) => SecureString::new(p),
        None => {
            let first = prompt(label)?;
            let second = prompt(confirm_label)?;
            if first != second {
                return Err(QrSecretsError::Validation(format!("{}s do not match", what)));
            }
            first
        }
    };

    if secret.is_empty() {
        return Err(QrSecretsError::Validation(format!("{} must not be empty", what)));
    }
    Ok(secret)
}

fn prompt(label: &str) -> QrResult<SecureString> {
    rpassword::prompt_password(label)
        .map(SecureString::new)
        .map_err(|e| {
            let what = label.trim_end_matches([':', ' ']).to_ascii_lowercase();
            QrSecretsError::Io(format!("failed to read {}: {}", what, e))
        })
}
