//! Custom error types for qrsecrets
//!
//! This module defines the error hierarchy for the crate using thiserror
//! for ergonomic error definitions.
//!
//! Cryptographic failures are deliberately collapsed into a single
//! [`QrSecretsError::Decryption`] variant so that a caller (or an attacker
//! observing the caller) cannot tell a wrong passphrase from a wrong key or
//! from tampered bytes.

use thiserror::Error;

/// The main error type for qrsecrets operations
#[derive(Error, Debug)]
pub enum QrSecretsError {
    /// The stream does not start with the container magic number
    #[error("stream is not a container")]
    NotContainer,

    /// The container was written with a protocol version this build cannot read
    #[error("protocol version {0} is not supported")]
    ProtocolVersionSupport(u8),

    /// The curve ID is not one of the registered curves
    #[error("curve {0} is not supported")]
    CurveSupport(u8),

    /// The hash ID is not one of the registered hashes
    #[error("hash {0} is unsupported")]
    HashUnsupported(u8),

    /// The key supplied for encoding is on a different curve than the container
    #[error("curve of public key ({key}) does not match curve of container ({container})")]
    CurveMismatch {
        container: &'static str,
        key: &'static str,
    },

    /// The salt is not exactly 32 bytes long
    #[error("invalid salt: must be 32 bytes long, got {0}")]
    SaltInvalid(usize),

    /// A section is too short to hold the fields it claims to hold
    #[error("ciphertext is too short to be valid")]
    CipherTextShort,

    /// The stream ended before a length-prefixed field was fully read
    #[error("truncated container: unexpected end of stream while reading {0}")]
    Truncated(String),

    /// Decryption or authentication failed
    #[error("decryption failed")]
    Decryption,

    /// Encryption failed for a reason other than bad input
    #[error("Encryption error: {0}")]
    Encryption(String),

    /// Caller supplied parameters that can never produce a valid container
    #[error("Validation error: {0}")]
    Validation(String),

    /// The operating system random source could not supply bytes
    #[error("secure random source failed")]
    Rng,

    /// Key parsing or serialization errors
    #[error("Key error: {0}")]
    Key(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),
}

impl QrSecretsError {
    /// Create a "truncated" error naming the field being read
    pub fn truncated(field: impl Into<String>) -> Self {
        Self::Truncated(field.into())
    }

    /// Check if this is the undifferentiated cryptographic failure
    pub fn is_crypto(&self) -> bool {
        matches!(self, Self::Decryption)
    }

    /// Check if this error comes from a malformed byte stream
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::NotContainer | Self::CipherTextShort | Self::Truncated(_)
        )
    }

    /// Check if this error names an unsupported protocol field
    pub fn is_unsupported(&self) -> bool {
        matches!(
            self,
            Self::ProtocolVersionSupport(_) | Self::CurveSupport(_) | Self::HashUnsupported(_)
        )
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::SaltInvalid(_) | Self::CurveMismatch { .. }
        )
    }
}

impl From<std::io::Error> for QrSecretsError {
    fn from(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            Self::Truncated(err.to_string())
        } else {
            Self::Io(err.to_string())
        }
    }
}

impl From<serde_json::Error> for QrSecretsError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for qrsecrets operations
pub type QrResult<T> = Result<T, QrSecretsError>;
