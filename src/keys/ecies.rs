//! ECIES framing shared by every curve
//!
//! ```text
//! Z     = ECDH(ephemeral, recipient)            (x-coordinate)
//! okm   = HKDF-<hash>(salt = "", ikm = Z, info = E, 44)
//! key   = okm[..32]   nonce = okm[32..44]
//! out   = E || AES-256-GCM(key, nonce, plaintext)
//! ```
//!
//! `E` is the SEC1 uncompressed encoding of the ephemeral public key. A fresh
//! ephemeral key per message makes the derived nonce single-use.

use zeroize::Zeroizing;

use crate::crypto::encryption::{self, NONCE_SIZE, TAG_SIZE};
use crate::error::{QrResult, QrSecretsError};
use crate::registry::Kdf;

const KEY_SIZE: usize = 32;
const OKM_SIZE: usize = KEY_SIZE + NONCE_SIZE;

fn expand(shared: &[u8], ephemeral_point: &[u8], kdf: &Kdf) -> Option<Zeroizing<[u8; OKM_SIZE]>> {
    let mut okm = Zeroizing::new([0u8; OKM_SIZE]);
    kdf.derive(shared, ephemeral_point, &mut okm[..]).ok()?;
    Some(okm)
}

fn split(okm: &[u8; OKM_SIZE]) -> (&[u8], [u8; NONCE_SIZE]) {
    let mut nonce = [0u8; NONCE_SIZE];
    nonce.copy_from_slice(&okm[KEY_SIZE..]);
    (&okm[..KEY_SIZE], nonce)
}

/// Seal `plaintext` once the ECDH step is done
pub(crate) fn seal(
    shared: &[u8],
    ephemeral_point: &[u8],
    kdf: &Kdf,
    plaintext: &[u8],
) -> QrResult<Vec<u8>> {
    let okm = expand(shared, ephemeral_point, kdf)
        .ok_or_else(|| QrSecretsError::Encryption("ECIES key expansion failed".into()))?;
    let (key, nonce) = split(&okm);
    let sealed = encryption::seal(key, &nonce, plaintext)?;

    let mut out = Vec::with_capacity(ephemeral_point.len() + sealed.len());
    out.extend_from_slice(ephemeral_point);
    out.extend_from_slice(&sealed);
    Ok(out)
}

/// Split an ECIES message into the ephemeral point and the sealed body
pub(crate) fn split_message(ciphertext: &[u8], point_len: usize) -> QrResult<(&[u8], &[u8])> {
    if ciphertext.len() < point_len + TAG_SIZE {
        return Err(QrSecretsError::Decryption);
    }
    Ok(ciphertext.split_at(point_len))
}

/// Open the sealed body once the ECDH step is done
pub(crate) fn open(
    shared: &[u8],
    ephemeral_point: &[u8],
    kdf: &Kdf,
    sealed: &[u8],
) -> QrResult<Vec<u8>> {
    let okm = expand(shared, ephemeral_point, kdf).ok_or(QrSecretsError::Decryption)?;
    let (key, nonce) = split(&okm);
    encryption::open(key, &nonce, sealed)
}
