//! CLI command handlers
//!
//! Bridges clap argument parsing with the container and key APIs. Handlers
//! return [`QrResult`]; `main` turns failures into an exit status.

pub mod config;
pub mod decrypt;
pub mod encrypt;
pub mod keygen;
pub mod passphrase;

use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::Path;

use crate::config::Settings;
use crate::crypto::SecureString;
use crate::error::{QrResult, QrSecretsError};
use crate::keys::{self, PrivateKey, PublicKey};

pub use config::{handle_config_command, ConfigArgs};
pub use decrypt::{handle_decrypt_command, DecryptArgs};
pub use encrypt::{handle_encrypt_command, EncryptArgs};
pub use keygen::{handle_generate_key_command, GenerateKeyArgs};

/// Path argument meaning stdin or stdout
const STDIO: &str = "-";

/// Read a whole file, or stdin for `-`
pub(crate) fn read_input(path: &Path) -> QrResult<Vec<u8>> {
    let mut buf = Vec::new();
    if path.as_os_str() == STDIO {
        std::io::stdin().read_to_end(&mut buf)?;
    } else {
        File::open(path)
            .and_then(|mut f| f.read_to_end(&mut buf))
            .map_err(|e| QrSecretsError::Io(format!("failed to read {}: {}", path.display(), e)))?;
    }
    Ok(buf)
}

/// Read a PEM file into memory
pub(crate) fn read_pem(path: &Path) -> QrResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| QrSecretsError::Io(format!("failed to read key {}: {}", path.display(), e)))
}

/// Load a private key file, asking for its password when it is protected
pub(crate) fn load_private_key(
    path: &Path,
    key_password: Option<String>,
) -> QrResult<Box<dyn PrivateKey>> {
    let pem = SecureString::new(read_pem(path)?);
    unlock_private_pem(&pem, key_password)
}

/// Load the key to encrypt to from a public or a private key file
pub(crate) fn load_recipient_key(
    path: &Path,
    key_password: Option<String>,
) -> QrResult<Box<dyn PublicKey>> {
    let pem = SecureString::new(read_pem(path)?);
    if keys::is_encrypted_pem(&pem) {
        return unlock_private_pem(&pem, key_password).map(|k| k.public_key());
    }
    keys::load_encryption_key(&pem)
}

fn unlock_private_pem(
    pem: &SecureString,
    key_password: Option<String>,
) -> QrResult<Box<dyn PrivateKey>> {
    if keys::is_encrypted_pem(pem) {
        let password = passphrase::for_key_unlock(key_password)?;
        keys::load_encrypted_private_pem(pem, password.as_bytes())
    } else {
        keys::load_private_pem(pem)
    }
}

/// Whether container bytes travel as base64 text
///
/// `--base64` forces it on, `--raw` overrides a saved base64 default.
pub(crate) fn use_base64(base64: bool, raw: bool, settings: &Settings) -> bool {
    base64 || (settings.base64_output && !raw)
}

/// Write `bytes` to `path`, or to stdout when no path is given
///
/// An existing file is only replaced when `force` is set.
pub(crate) fn write_output(path: Option<&Path>, bytes: &[u8], force: bool) -> QrResult<()> {
    match path {
        None => write_stdout(bytes),
        Some(p) if p.as_os_str() == STDIO => write_stdout(bytes),
        Some(p) => {
            let mut file = create_file(p, force, false)?;
            file.write_all(bytes)?;
            Ok(())
        }
    }
}

fn write_stdout(bytes: &[u8]) -> QrResult<()> {
    let mut out = std::io::stdout().lock();
    out.write_all(bytes)?;
    out.flush()?;
    Ok(())
}

/// Open `path` for writing, refusing to clobber unless `force`
///
/// `private` restricts the file to its owner on Unix.
pub(crate) fn create_file(path: &Path, force: bool, private: bool) -> QrResult<File> {
    let mut options = OpenOptions::new();
    options.write(true);
    if force {
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    }

    #[cfg(unix)]
    if private {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    #[cfg(not(unix))]
    let _ = private;

    options.open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::AlreadyExists {
            QrSecretsError::Validation(format!(
                "{} already exists, pass --force to overwrite it",
                path.display()
            ))
        } else {
            QrSecretsError::Io(format!("failed to create {}: {}", path.display(), e))
        }
    })
}
