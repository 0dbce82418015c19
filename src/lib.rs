//! qrsecrets - hybrid-encrypted secrets small enough for a QR code
//!
//! A secret is sealed under a passphrase with Argon2id and AES-GCM. The
//! salt and Argon2 tuning needed to repeat that derivation are themselves
//! encrypted to an elliptic curve public key, so recovering the secret takes
//! both the private key and the passphrase.
//!
//! # Architecture
//!
//! - `registry`: curve and hash identifiers stored in the container header
//! - `crypto`: Argon2id, AES-GCM and zeroizing buffers
//! - `keys`: per-curve ECIES keys and PEM handling
//! - `container`: the binary container and its two sections
//! - `config`: paths, saved defaults and security presets
//! - `cli`: command handlers for the `qrsecrets` binary
//! - `error`: the crate error type
//!
//! # Example
//!
//! ```rust,ignore
//! use qrsecrets::container::Container;
//! use qrsecrets::registry::{CurveId, HashId};
//!
//! let key = qrsecrets::keys::generate(CurveId::P256)?;
//! let container = Container::new(CurveId::P256, HashId::SHA256, b"secret", 16)?;
//! let bytes = container.marshal(key.public_key().as_ref(), b"passphrase")?;
//! let opened = Container::unmarshal(&bytes, key.as_ref(), b"passphrase")?;
//! assert_eq!(opened.plaintext(), b"secret");
//! ```

pub mod cli;
pub mod config;
pub mod container;
pub mod crypto;
pub mod error;
pub mod keys;
pub mod registry;

pub use container::Container;
pub use error::{QrResult, QrSecretsError};
