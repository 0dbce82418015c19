//! `generate-key`: create a recipient key pair

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use clap::Args;
use tracing::debug;

use super::{create_file, passphrase};
use crate::config::{Preset, Settings};
use crate::error::{QrResult, QrSecretsError};
use crate::keys;
use crate::registry::{curves, CurveId};

/// Arguments for `qrsecrets generate-key`
#[derive(Args, Debug)]
pub struct GenerateKeyArgs {
    /// Curve for the new key (p224, p256, p384, p521)
    #[arg(short, long)]
    pub curve: Option<String>,

    /// Take the curve from a security preset
    #[arg(short, long, conflicts_with = "curve")]
    pub preset: Option<Preset>,

    /// Private key file; the public key goes next to it with a `.pub` suffix
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Overwrite existing key files
    #[arg(long)]
    pub force: bool,

    /// Protect the private key file with a password
    #[arg(short, long)]
    pub encrypt: bool,

    /// Password for `--encrypt` (prompted for when omitted)
    #[arg(long, env = passphrase::KEY_PASSWORD_ENV, hide_env_values = true)]
    pub key_password: Option<String>,
}

/// Handle `generate-key`
pub fn handle_generate_key_command(settings: &Settings, args: GenerateKeyArgs) -> QrResult<()> {
    let curve = resolve_curve(settings, &args)?;
    let key = keys::generate(curve)?;
    let public = key.public_key();

    let private_path = args
        .output
        .unwrap_or_else(|| PathBuf::from(format!("ecdsa-{}.pem", curve.name())));
    let public_path = public_key_path(&private_path);
    debug!(curve = %curve, path = %private_path.display(), "writing key pair");

    let private_pem = if args.encrypt {
        let password = passphrase::for_key_protection(args.key_password)?;
        key.to_encrypted_pem(password.as_bytes())?
    } else {
        key.to_pem()?
    };
    let public_pem = public.to_pem()?;

    // Both files are opened before either is written, and removed again on
    // failure, so a half-written pair never stays behind.
    let private_file = create_file(&private_path, args.force, true)?;
    let public_file = match create_file(&public_path, args.force, false) {
        Ok(file) => file,
        Err(e) => {
            discard(&[&private_path]);
            return Err(e);
        }
    };
    if let Err(e) = write_pair(
        (private_file, private_pem.as_bytes()),
        (public_file, public_pem.as_bytes()),
    ) {
        discard(&[&private_path, &public_path]);
        return Err(e);
    }

    println!("Curve:       {}", public.name());
    println!("Fingerprint: {}", public.fingerprint());
    println!("Private key: {}", private_path.display());
    println!("Public key:  {}", public_path.display());
    Ok(())
}

fn resolve_curve(settings: &Settings, args: &GenerateKeyArgs) -> QrResult<CurveId> {
    if let Some(name) = &args.curve {
        return match curves::name_to_id(name) {
            CurveId::INVALID => Err(QrSecretsError::Validation(format!(
                "unknown curve '{}' (expected one of {})",
                name,
                curves::all()
                    .iter()
                    .map(|c| c.name)
                    .collect::<Vec<_>>()
                    .join(", ")
            ))),
            id => Ok(id),
        };
    }
    match args.preset {
        Some(preset) => Ok(preset.curve()),
        None => settings.curve(),
    }
}

fn write_pair(private: (File, &[u8]), public: (File, &[u8])) -> QrResult<()> {
    for (mut file, bytes) in [private, public] {
        file.write_all(bytes)?;
        file.sync_all()?;
    }
    Ok(())
}

fn discard(paths: &[&Path]) {
    for path in paths {
        if let Err(e) = std::fs::remove_file(path) {
            debug!(path = %path.display(), error = %e, "could not remove partial key file");
        }
    }
}

fn public_key_path(private: &Path) -> PathBuf {
    let mut name = private.as_os_str().to_owned();
    name.push(".pub");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn args(curve: Option<&str>, preset: Option<Preset>) -> GenerateKeyArgs {
        GenerateKeyArgs {
            curve: curve.map(String::from),
            preset,
            output: None,
            force: false,
            encrypt: false,
            key_password: None,
        }
    }

    #[test]
    fn test_resolve_curve_precedence() {
        let settings = Settings::default();
        assert_eq!(resolve_curve(&settings, &args(Some("p-224"), None)).unwrap(), CurveId::P224);
        assert_eq!(
            resolve_curve(&settings, &args(None, Some(Preset::Medium))).unwrap(),
            CurveId::P384
        );
        assert_eq!(resolve_curve(&settings, &args(None, None)).unwrap(), CurveId::P521);
    }

    #[test]
    fn test_resolve_unknown_curve() {
        let err = resolve_curve(&Settings::default(), &args(Some("secp256k1"), None))
            .err()
            .unwrap();
        assert!(err.to_string().contains("P-256"));
    }

    #[test]
    fn test_public_key_path() {
        assert_eq!(
            public_key_path(Path::new("/tmp/ecdsa-P-256.pem")),
            PathBuf::from("/tmp/ecdsa-P-256.pem.pub")
        );
    }

    #[test]
    fn test_generate_writes_loadable_pair() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("k.pem");
        let mut a = args(Some("p256"), None);
        a.output = Some(output.clone());
        handle_generate_key_command(&Settings::default(), a).unwrap();

        let private = keys::load_private_pem(&std::fs::read_to_string(&output).unwrap()).unwrap();
        let public =
            keys::load_public_pem(&std::fs::read_to_string(temp_dir.path().join("k.pem.pub")).unwrap())
                .unwrap();
        assert_eq!(private.curve(), CurveId::P256);
        assert_eq!(public.fingerprint(), private.public_key().fingerprint());
    }

    #[test]
    fn test_existing_public_key_leaves_no_private_key() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("k.pem");
        let public = temp_dir.path().join("k.pem.pub");
        std::fs::write(&public, "keep me").unwrap();

        let mut a = args(Some("p256"), None);
        a.output = Some(output.clone());
        let err = handle_generate_key_command(&Settings::default(), a).err().unwrap();
        assert!(err.is_validation());
        assert!(!output.exists());
        assert_eq!(std::fs::read_to_string(&public).unwrap(), "keep me");
    }

    #[test]
    fn test_generate_encrypted_private_key() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("locked.pem");
        let mut a = args(Some("p384"), None);
        a.output = Some(output.clone());
        a.encrypt = true;
        a.key_password = Some("key pw".into());
        handle_generate_key_command(&Settings::default(), a).unwrap();

        let pem = std::fs::read_to_string(&output).unwrap();
        assert!(keys::is_encrypted_pem(&pem));
        let key = keys::load_encrypted_private_pem(&pem, b"key pw").unwrap();
        assert_eq!(key.curve(), CurveId::P384);
    }
}
