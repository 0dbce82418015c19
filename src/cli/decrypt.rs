//! `decrypt`: open a container and recover the secret

use std::path::PathBuf;

use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine;
use clap::Args;

use super::{load_private_key, passphrase, read_input, use_base64, write_output};
use crate::config::Settings;
use crate::container::Container;
use crate::error::{QrResult, QrSecretsError};

/// Arguments for `qrsecrets decrypt`
#[derive(Args, Debug)]
pub struct DecryptArgs {
    /// Private key PEM of the recipient
    #[arg(short, long)]
    pub key: PathBuf,

    /// Container file (`-` for stdin)
    #[arg(short, long, default_value = "-")]
    pub input: PathBuf,

    /// The container is base64 text
    #[arg(long, conflicts_with = "raw")]
    pub base64: bool,

    /// The container is raw bytes even when base64 is the saved default
    #[arg(long)]
    pub raw: bool,

    /// Where to write the secret (stdout when omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Container passphrase (prompted for when omitted)
    #[arg(long, env = passphrase::PASSPHRASE_ENV, hide_env_values = true)]
    pub passphrase: Option<String>,

    /// Password of an encrypted private key (prompted for when needed)
    #[arg(long, env = passphrase::KEY_PASSWORD_ENV, hide_env_values = true)]
    pub key_password: Option<String>,

    /// Overwrite the output file if it exists
    #[arg(long)]
    pub force: bool,
}

/// Handle `decrypt`
pub fn handle_decrypt_command(settings: &Settings, args: DecryptArgs) -> QrResult<()> {
    let private_key = load_private_key(&args.key, args.key_password)?;

    let raw = read_input(&args.input)?;
    let data = if use_base64(args.base64, args.raw, settings) {
        decode_base64(&raw)?
    } else {
        raw
    };

    let passphrase = passphrase::for_decryption(args.passphrase)?;
    let container = Container::unmarshal(&data, private_key.as_ref(), passphrase.as_bytes())?;

    write_output(args.output.as_deref(), container.plaintext(), args.force)
}

/// Decode base64 text, tolerating surrounding whitespace and `=` padding
fn decode_base64(raw: &[u8]) -> QrResult<Vec<u8>> {
    let text = std::str::from_utf8(raw)
        .map_err(|_| QrSecretsError::Validation("base64 input is not valid text".into()))?;
    let trimmed = text.trim().trim_end_matches('=');
    STANDARD_NO_PAD
        .decode(trimmed)
        .map_err(|e| QrSecretsError::Validation(format!("invalid base64 input: {}", e)))
}
