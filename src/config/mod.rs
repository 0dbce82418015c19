//! Configuration for qrsecrets
//!
//! - XDG-compliant path resolution
//! - Persisted user defaults
//! - Named security presets

pub mod paths;
pub mod presets;
pub mod settings;

pub use paths::QrSecretsPaths;
pub use presets::Preset;
pub use settings::Settings;
