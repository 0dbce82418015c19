//! `config`: show or change the saved defaults

use clap::Args;

use crate::config::{Preset, QrSecretsPaths, Settings};
use crate::error::QrResult;

/// Arguments for `qrsecrets config`
///
/// With no flags the current paths and settings are printed. Any flag
/// updates that default and saves the file.
#[derive(Args, Debug, Default)]
pub struct ConfigArgs {
    /// Default curve for generated keys
    #[arg(long)]
    pub curve: Option<String>,

    /// Default hash for the metadata key wrapping
    #[arg(long)]
    pub hash: Option<String>,

    /// Default security preset
    #[arg(long)]
    pub preset: Option<Preset>,

    /// Default padding in bytes
    #[arg(long)]
    pub padding: Option<u32>,

    /// Default to base64 input and output
    #[arg(long)]
    pub base64: Option<bool>,
}

impl ConfigArgs {
    fn is_update(&self) -> bool {
        self.curve.is_some()
            || self.hash.is_some()
            || self.preset.is_some()
            || self.padding.is_some()
            || self.base64.is_some()
    }
}

/// Handle `config`
pub fn handle_config_command(
    paths: &QrSecretsPaths,
    settings: &mut Settings,
    args: ConfigArgs,
) -> QrResult<()> {
    if args.is_update() {
        apply(settings, args);
        settings.save(paths)?;
        println!("Saved {}", paths.settings_file().display());
        println!();
    }

    println!("qrsecrets configuration");
    println!("=======================");
    println!("Config directory: {}", paths.base_dir().display());
    println!("Settings file:    {}", paths.settings_file().display());
    println!();
    println!("Default curve:    {}", settings.default_curve);
    println!("Default hash:     {}", settings.default_hash);
    println!("Default preset:   {}", settings.default_preset);
    println!("Default padding:  {}", settings.default_padding);
    println!("Base64 output:    {}", settings.base64_output);
    Ok(())
}

fn apply(settings: &mut Settings, args: ConfigArgs) {
    if let Some(curve) = args.curve {
        settings.default_curve = curve;
    }
    if let Some(hash) = args.hash {
        settings.default_hash = hash;
    }
    if let Some(preset) = args.preset {
        settings.default_preset = preset;
    }
    if let Some(padding) = args.padding {
        settings.default_padding = padding;
    }
    if let Some(base64) = args.base64 {
        settings.base64_output = base64;
    }
}
