//! The qrsecrets container
//!
//! ```text
//! offset  size  field
//!  0       3    magic number 5F DB 4C
//!  3       1    protocol version (1)
//!  4       1    curve ID
//!  5       1    hash ID
//!  6       ...  metadata section    (see `metadata`)
//!  ...     ...  ciphertext section  (see `ciphertext`)
//! ```
//!
//! Encoding writes straight to the destination stream. Decoding is all or
//! nothing: on any failure no container, and no partial plaintext, is
//! returned.

pub mod ciphertext;
pub mod metadata;

use std::io::{Read, Write};

use tracing::{debug, warn};

pub use ciphertext::SectionCipherText;
pub use metadata::SectionMetaData;

use crate::crypto::{self, KeyDerivationParams};
use crate::error::{QrResult, QrSecretsError};
use crate::keys::{PrivateKey, PublicKey};
use crate::registry::{hashes, CurveId, HashId};

/// Prepended to every container to identify the format
pub const MAGIC_NUMBER: [u8; 3] = [0x5F, 0xDB, 0x4C];

/// The protocol version written by this build, and the only one it reads
pub const PROTOCOL_VERSION: u8 = 1;

/// Argon2 salt length
pub const SALT_SIZE: usize = 32;

/// Binary capacity of the largest QR code (version 40, error correction L)
pub const QR_MAX_BYTES: usize = 2953;

/// Stages of [`Container::decode`], named in failure logs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecodeStage {
    Magic,
    Version,
    Header,
    Metadata,
    Ciphertext,
}

impl DecodeStage {
    fn as_str(self) -> &'static str {
        match self {
            DecodeStage::Magic => "magic",
            DecodeStage::Version => "version",
            DecodeStage::Header => "header",
            DecodeStage::Metadata => "metadata",
            DecodeStage::Ciphertext => "ciphertext",
        }
    }
}

/// A secret together with everything needed to seal or unseal it
#[derive(Debug, Clone)]
pub struct Container {
    version: u8,
    /// Curve of the recipient key wrapping the metadata section
    pub curve: CurveId,
    /// Hash used by the KDF inside the metadata wrapping
    pub hash: HashId,
    pub metadata: SectionMetaData,
    pub ciphertext: SectionCipherText,
}

impl Container {
    /// Create a container for `plaintext` with a fresh random salt
    ///
    /// Argon2 parameters start at [`KeyDerivationParams::default`] and may be
    /// changed with [`Container::set_kdf_params`] before encoding.
    pub fn new(curve: CurveId, hash: HashId, plaintext: &[u8], padding: u32) -> QrResult<Self> {
        let mut salt = vec![0u8; SALT_SIZE];
        crypto::fill_random(&mut salt)?;

        Ok(Self {
            version: PROTOCOL_VERSION,
            curve,
            hash,
            metadata: SectionMetaData::new(salt, &KeyDerivationParams::default(), padding),
            ciphertext: SectionCipherText::new(plaintext, padding),
        })
    }

    /// Protocol version of this container
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Override the Argon2 parameters used for the ciphertext section
    pub fn set_kdf_params(&mut self, params: &KeyDerivationParams) {
        self.metadata.set_kdf_params(params);
    }

    /// Recovered or to-be-protected secret
    pub fn plaintext(&self) -> &[u8] {
        &self.ciphertext.plaintext
    }

    /// Check everything that can be checked before a byte is written
    fn validate(&self, public_key: &dyn PublicKey) -> QrResult<()> {
        let key_curve = public_key.curve();
        if !key_curve.is_supported() {
            return Err(QrSecretsError::CurveSupport(key_curve.as_u8()));
        }
        if key_curve != self.curve {
            return Err(QrSecretsError::CurveMismatch {
                container: self.curve.name(),
                key: key_curve.name(),
            });
        }
        if hashes::id_to_kdf(self.hash).is_none() {
            return Err(QrSecretsError::HashUnsupported(self.hash.as_u8()));
        }
        if self.metadata.salt.len() != SALT_SIZE {
            return Err(QrSecretsError::SaltInvalid(self.metadata.salt.len()));
        }
        self.metadata.kdf_params().validate()
    }

    /// Seal the container and write it to `w`
    ///
    /// The metadata section is encrypted to `public_key`, which must be on
    /// the container's curve; the payload key is stretched from `passphrase`.
    pub fn encode<W: Write>(
        &self,
        w: &mut W,
        public_key: &dyn PublicKey,
        passphrase: &[u8],
    ) -> QrResult<()> {
        self.validate(public_key)?;

        debug!(
            version = self.version,
            curve = %self.curve,
            hash = %self.hash,
            "encoding container"
        );
        w.write_all(&MAGIC_NUMBER)?;
        w.write_all(&[self.version, self.curve.as_u8(), self.hash.as_u8()])?;

        self.metadata.encode(w, self.hash, public_key)?;
        self.ciphertext.encode(w, &self.metadata, passphrase)
    }

    /// Seal the container into a byte vector
    pub fn marshal(&self, public_key: &dyn PublicKey, passphrase: &[u8]) -> QrResult<Vec<u8>> {
        let mut buf = Vec::new();
        self.encode(&mut buf, public_key, passphrase)?;
        Ok(buf)
    }

    /// Read and open a container from `r`
    pub fn decode<R: Read>(
        r: &mut R,
        private_key: &dyn PrivateKey,
        passphrase: &[u8],
    ) -> QrResult<Self> {
        let mut stage = DecodeStage::Magic;
        Self::decode_stages(r, private_key, passphrase, &mut stage).inspect_err(|e| {
            warn!(stage = stage.as_str(), error = %e, "container decode failed");
        })
    }

    fn decode_stages<R: Read>(
        r: &mut R,
        private_key: &dyn PrivateKey,
        passphrase: &[u8],
        stage: &mut DecodeStage,
    ) -> QrResult<Self> {
        let magic: [u8; 3] = read_array(r, "magic number")?;
        if magic != MAGIC_NUMBER {
            return Err(QrSecretsError::NotContainer);
        }

        // A new protocol version gets its own decode routine keyed on this
        // byte; there is no fallback.
        *stage = DecodeStage::Version;
        let [version] = read_array(r, "version")?;
        if version != PROTOCOL_VERSION {
            return Err(QrSecretsError::ProtocolVersionSupport(version));
        }

        *stage = DecodeStage::Header;
        let [curve, hash] = read_array(r, "curve and hash IDs")?;
        let curve = CurveId(curve);
        let hash = HashId(hash);
        debug!(version, curve = %curve, hash = %hash, "parsed container header");

        *stage = DecodeStage::Metadata;
        let metadata = SectionMetaData::decode(r, curve, hash, private_key)?;

        *stage = DecodeStage::Ciphertext;
        let ciphertext = SectionCipherText::decode(r, &metadata, passphrase)?;

        Ok(Self {
            version,
            curve,
            hash,
            metadata,
            ciphertext,
        })
    }

    /// Open a container held in memory
    pub fn unmarshal(
        bytes: &[u8],
        private_key: &dyn PrivateKey,
        passphrase: &[u8],
    ) -> QrResult<Self> {
        let mut reader = bytes;
        Self::decode(&mut reader, private_key, passphrase)
    }
}

/// Read a fixed-size field, reporting a short stream as truncation
pub(crate) fn read_array<const N: usize, R: Read>(
    r: &mut R,
    field: &'static str,
) -> QrResult<[u8; N]> {
    let mut buf = [0u8; N];
    read_field(r, &mut buf, field)?;
    Ok(buf)
}

/// Fill `buf`, reporting a short stream as truncation and anything else as I/O
pub(crate) fn read_field<R: Read>(
    r: &mut R,
    buf: &mut [u8],
    field: &'static str,
) -> QrResult<()> {
    r.read_exact(buf).map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            QrSecretsError::truncated(field)
        } else {
            QrSecretsError::from(e)
        }
    })
}
