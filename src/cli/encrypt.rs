//! `encrypt`: seal a secret into a container
//!
//! The recipient curve is taken from the key file. Argon2 parameters start
//! from a preset and can be overridden one by one.

use std::path::PathBuf;

use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine;
use clap::Args;
use tracing::{debug, info};

use super::{load_recipient_key, passphrase, read_input, use_base64, write_output};
use crate::config::{Preset, Settings};
use crate::container::{Container, QR_MAX_BYTES};
use crate::crypto::{KeyDerivationParams, SecureBytes};
use crate::error::{QrResult, QrSecretsError};
use crate::registry::{hashes, HashId};

/// Arguments for `qrsecrets encrypt`
#[derive(Args, Debug)]
pub struct EncryptArgs {
    /// Recipient key: a public key PEM or the private key PEM itself
    #[arg(short, long)]
    pub key: PathBuf,

    /// Secret given inline
    #[arg(short, long, conflicts_with = "file")]
    pub text: Option<String>,

    /// Read the secret from a file (`-` for stdin, the default)
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Container destination (stdout when omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write unpadded standard base64 instead of raw bytes
    #[arg(long, conflicts_with = "raw")]
    pub base64: bool,

    /// Write raw bytes even when base64 is the saved default
    #[arg(long)]
    pub raw: bool,

    /// Security preset for the Argon2 parameters
    #[arg(short, long)]
    pub preset: Option<Preset>,

    /// Hash for the metadata key wrapping (sha256, sha512, sha3-256, sha3-512)
    #[arg(long)]
    pub hash: Option<String>,

    /// Filler bytes appended to the secret
    #[arg(long)]
    pub padding: Option<u32>,

    /// Argon2 memory in KiB
    #[arg(long)]
    pub argon_memory: Option<u32>,

    /// Argon2 iterations
    #[arg(long)]
    pub argon_iterations: Option<u32>,

    /// Argon2 lanes
    #[arg(long)]
    pub argon_parallelism: Option<u8>,

    /// Derived AES key length: 16, 24 or 32
    #[arg(long)]
    pub argon_key_len: Option<u32>,

    /// Container passphrase (prompted for when omitted)
    #[arg(long, env = passphrase::PASSPHRASE_ENV, hide_env_values = true)]
    pub passphrase: Option<String>,

    /// Password of an encrypted private key given as `--key`
    #[arg(long, env = passphrase::KEY_PASSWORD_ENV, hide_env_values = true)]
    pub key_password: Option<String>,

    /// Allow output larger than a single QR code can hold
    #[arg(long)]
    pub ignore_size_limit: bool,

    /// Overwrite the output file if it exists
    #[arg(long)]
    pub force: bool,
}

/// Handle `encrypt`
pub fn handle_encrypt_command(settings: &Settings, args: EncryptArgs) -> QrResult<()> {
    let public_key = load_recipient_key(&args.key, args.key_password.clone())?;
    let hash = resolve_hash(settings, args.hash.as_deref())?;
    let params = resolve_params(settings, &args);
    params.validate()?;
    let padding = args.padding.unwrap_or(settings.default_padding);

    let plaintext = SecureBytes::new(match (&args.text, &args.file) {
        (Some(text), _) => text.as_bytes().to_vec(),
        (None, Some(file)) => read_input(file)?,
        (None, None) => read_input(std::path::Path::new("-"))?,
    });

    let passphrase = passphrase::for_encryption(args.passphrase)?;

    let mut container = Container::new(public_key.curve(), hash, &plaintext, padding)?;
    container.set_kdf_params(&params);
    debug!(
        curve = public_key.name(),
        hash = %hash,
        memory = params.memory_cost,
        iterations = params.time_cost,
        parallelism = params.parallelism,
        "sealing container"
    );
    let data = container.marshal(public_key.as_ref(), passphrase.as_bytes())?;

    let base64 = use_base64(args.base64, args.raw, settings);
    let mut output = if base64 {
        STANDARD_NO_PAD.encode(&data).into_bytes()
    } else {
        data
    };
    check_size(output.len(), args.ignore_size_limit)?;
    info!(bytes = output.len(), "container sealed");

    if args.output.is_none() && base64 {
        output.push(b'\n');
    }
    write_output(args.output.as_deref(), &output, args.force)
}

fn resolve_hash(settings: &Settings, name: Option<&str>) -> QrResult<HashId> {
    match name {
        Some(name) => hashes::name_to_id(name).ok_or_else(|| {
            QrSecretsError::Validation(format!(
                "unknown hash '{}' (expected one of {})",
                name,
                hashes::all()
                    .iter()
                    .map(|k| k.name)
                    .collect::<Vec<_>>()
                    .join(", ")
            ))
        }),
        None => settings.hash(),
    }
}

fn resolve_params(settings: &Settings, args: &EncryptArgs) -> KeyDerivationParams {
    let mut params = args.preset.unwrap_or(settings.default_preset).kdf_params();
    if let Some(memory) = args.argon_memory {
        params.memory_cost = memory;
    }
    if let Some(iterations) = args.argon_iterations {
        params.time_cost = iterations;
    }
    if let Some(parallelism) = args.argon_parallelism {
        params.parallelism = parallelism;
    }
    if let Some(key_len) = args.argon_key_len {
        params.key_len = key_len;
    }
    params
}

fn check_size(len: usize, ignore: bool) -> QrResult<()> {
    if len > QR_MAX_BYTES && !ignore {
        return Err(QrSecretsError::Validation(format!(
            "container is {} bytes but a QR code holds at most {}; \
             lower the padding or pass --ignore-size-limit",
            len, QR_MAX_BYTES
        )));
    }
    Ok(())
}
