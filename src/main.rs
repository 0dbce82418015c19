use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use qrsecrets::cli::{
    handle_config_command, handle_decrypt_command, handle_encrypt_command,
    handle_generate_key_command, ConfigArgs, DecryptArgs, EncryptArgs, GenerateKeyArgs,
};
use qrsecrets::config::{paths::CONFIG_DIR_ENV, QrSecretsPaths, Settings};

#[derive(Parser)]
#[command(
    name = "qrsecrets",
    version,
    about = "Hybrid-encrypted secrets sized to fit in a QR code",
    long_about = "qrsecrets seals a secret with a passphrase (Argon2id + AES-GCM) and \
                  wraps the key derivation parameters for an elliptic curve key, so the \
                  secret can only be recovered with both. Output fits a single QR code."
)]
struct Cli {
    /// Log each encode and decode stage to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Directory holding config.json
    #[arg(long, global = true, env = CONFIG_DIR_ENV)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a recipient key pair
    #[command(alias = "keygen")]
    GenerateKey(GenerateKeyArgs),

    /// Seal a secret into a container
    #[command(alias = "enc")]
    Encrypt(EncryptArgs),

    /// Open a container and print the secret
    #[command(alias = "dec")]
    Decrypt(DecryptArgs),

    /// Show or change saved defaults
    Config(ConfigArgs),
}

fn init_tracing(verbose: bool) -> Result<()> {
    let directive = if verbose {
        "qrsecrets=debug"
    } else {
        "qrsecrets=warn"
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive(directive.parse()?))
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let paths = match cli.config_dir {
        Some(dir) => QrSecretsPaths::with_base_dir(dir),
        None => QrSecretsPaths::new()?,
    };
    let mut settings = Settings::load_or_create(&paths)?;

    match cli.command {
        Commands::GenerateKey(args) => handle_generate_key_command(&settings, args)?,
        Commands::Encrypt(args) => handle_encrypt_command(&settings, args)?,
        Commands::Decrypt(args) => handle_decrypt_command(&settings, args)?,
        Commands::Config(args) => handle_config_command(&paths, &mut settings, args)?,
    }

    Ok(())
}
