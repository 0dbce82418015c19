//! Hash identifiers and the HKDF instances they select
//!
//! The hash ID in the container header decides which HKDF instantiation the
//! ECIES step uses to turn an ECDH shared secret into key material. The wire
//! format does not record anything else, so both ends rebuild the same
//! function from this table.

use std::fmt;

use hkdf::{Hkdf, InvalidLength};
use sha2::{Sha256, Sha512};
use sha3::{Sha3_256, Sha3_512};

/// One-byte identifier of a hash function, as stored in the container header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HashId(pub u8);

impl HashId {
    pub const SHA256: HashId = HashId(0);
    pub const SHA512: HashId = HashId(1);
    pub const SHA3_256: HashId = HashId(2);
    pub const SHA3_512: HashId = HashId(3);

    /// Raw header byte
    pub fn as_u8(self) -> u8 {
        self.0
    }

    /// Display name, or `"unsupported"` for unknown IDs
    pub fn name(self) -> &'static str {
        id_to_kdf(self).map(|k| k.name).unwrap_or("unsupported")
    }
}

impl fmt::Display for HashId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

type ExpandFn = fn(ikm: &[u8], info: &[u8], okm: &mut [u8]) -> Result<(), InvalidLength>;

/// An HKDF instantiated with one registered hash
#[derive(Clone, Copy)]
pub struct Kdf {
    pub id: HashId,
    pub name: &'static str,
    expand: ExpandFn,
}

impl Kdf {
    /// Extract-then-expand `ikm` into `okm` with an empty salt
    ///
    /// Fails only when `okm` is longer than HKDF allows for the hash
    /// (255 times its output size).
    pub fn derive(&self, ikm: &[u8], info: &[u8], okm: &mut [u8]) -> Result<(), InvalidLength> {
        (self.expand)(ikm, info, okm)
    }
}

impl fmt::Debug for Kdf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Kdf")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish()
    }
}

fn hkdf_sha256(ikm: &[u8], info: &[u8], okm: &mut [u8]) -> Result<(), InvalidLength> {
    Hkdf::<Sha256>::new(None, ikm).expand(info, okm)
}

fn hkdf_sha512(ikm: &[u8], info: &[u8], okm: &mut [u8]) -> Result<(), InvalidLength> {
    Hkdf::<Sha512>::new(None, ikm).expand(info, okm)
}

fn hkdf_sha3_256(ikm: &[u8], info: &[u8], okm: &mut [u8]) -> Result<(), InvalidLength> {
    Hkdf::<Sha3_256>::new(None, ikm).expand(info, okm)
}

fn hkdf_sha3_512(ikm: &[u8], info: &[u8], okm: &mut [u8]) -> Result<(), InvalidLength> {
    Hkdf::<Sha3_512>::new(None, ikm).expand(info, okm)
}

const KDFS: [Kdf; 4] = [
    Kdf {
        id: HashId::SHA256,
        name: "SHA-256",
        expand: hkdf_sha256,
    },
    Kdf {
        id: HashId::SHA512,
        name: "SHA-512",
        expand: hkdf_sha512,
    },
    Kdf {
        id: HashId::SHA3_256,
        name: "SHA3-256",
        expand: hkdf_sha3_256,
    },
    Kdf {
        id: HashId::SHA3_512,
        name: "SHA3-512",
        expand: hkdf_sha3_512,
    },
];

/// All registered KDFs in ID order
pub fn all() -> &'static [Kdf] {
    &KDFS
}

/// Look up the KDF for a hash ID
pub fn id_to_kdf(id: HashId) -> Option<&'static Kdf> {
    KDFS.iter().find(|k| k.id == id)
}

/// Convert a hash name to its ID
///
/// Case-insensitive; dashes and underscores are ignored, so `sha3-256`,
/// `SHA3_256` and `sha3256` all match.
pub fn name_to_id(name: &str) -> Option<HashId> {
    let normalize = |s: &str| s.trim().to_ascii_lowercase().replace(['-', '_'], "");
    let wanted = normalize(name);
    KDFS.iter().find(|k| normalize(k.name) == wanted).map(|k| k.id)
}
