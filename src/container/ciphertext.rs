//! Ciphertext section: the secret itself, sealed under a passphrase key
//!
//! ```text
//!  0   8  length of nonce || sealed (u64 BE)
//!  8  12  nonce
//! 20   n  AES-GCM(plaintext || padding) with tag
//! ```

use std::fmt;
use std::io::{Read, Write};

use tracing::debug;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::{read_array, SectionMetaData};
use crate::crypto::{self, derive_key, SecureBytes, NONCE_SIZE};
use crate::error::{QrResult, QrSecretsError};

/// The protected secret and its filler bytes
///
/// Both buffers are zeroized when the section is dropped.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SectionCipherText {
    pub plaintext: Vec<u8>,
    /// Opaque filler; its content is never checked
    pub padding: Vec<u8>,
}

impl SectionCipherText {
    /// Hold `plaintext` with `padding_len` zero bytes of filler
    pub fn new(plaintext: &[u8], padding_len: u32) -> Self {
        Self {
            plaintext: plaintext.to_vec(),
            padding: vec![0u8; padding_len as usize],
        }
    }

    /// Seal and write the section
    ///
    /// The key is stretched from `passphrase` with the salt and Argon2
    /// parameters in `metadata`.
    pub fn encode<W: Write>(
        &self,
        w: &mut W,
        metadata: &SectionMetaData,
        passphrase: &[u8],
    ) -> QrResult<()> {
        if self.padding.len() != metadata.padding_size as usize {
            return Err(QrSecretsError::Validation(format!(
                "padding is {} bytes but metadata declares {}",
                self.padding.len(),
                metadata.padding_size
            )));
        }

        let key = derive_key(passphrase, &metadata.salt, &metadata.kdf_params())?;
        let nonce = crypto::generate_nonce()?;

        let mut payload = SecureBytes::with_capacity(self.plaintext.len() + self.padding.len());
        payload.extend_from_slice(&self.plaintext);
        payload.extend_from_slice(&self.padding);

        let sealed = crypto::seal(key.as_bytes(), &nonce, &payload)?;
        let len = (NONCE_SIZE + sealed.len()) as u64;

        debug!(len, padding = self.padding.len(), "writing ciphertext section");
        w.write_all(&len.to_be_bytes())?;
        w.write_all(&nonce)?;
        w.write_all(&sealed)?;
        Ok(())
    }

    /// Read, authenticate and decrypt the section
    pub fn decode<R: Read>(
        r: &mut R,
        metadata: &SectionMetaData,
        passphrase: &[u8],
    ) -> QrResult<Self> {
        let len = u64::from_be_bytes(read_array(r, "payload length")?);
        if len <= NONCE_SIZE as u64 {
            return Err(QrSecretsError::CipherTextShort);
        }

        let nonce: [u8; NONCE_SIZE] = read_array(r, "nonce")?;

        // The length is untrusted, so read through `take` instead of
        // allocating it up front.
        let sealed_len = len - NONCE_SIZE as u64;
        let mut sealed = Vec::new();
        r.by_ref().take(sealed_len).read_to_end(&mut sealed)?;
        if sealed.len() as u64 != sealed_len {
            return Err(QrSecretsError::truncated("payload"));
        }
        debug!(len, "read ciphertext section");

        // The Argon2 cost is attacker-chosen until the AEAD tag checks out;
        // refuse anything over the ceiling before spending it.
        let params = metadata.kdf_params();
        params.validate().map_err(|_| QrSecretsError::Decryption)?;
        let key = derive_key(passphrase, &metadata.salt, &params)
            .map_err(|_| QrSecretsError::Decryption)?;
        let opened = SecureBytes::new(crypto::open(key.as_bytes(), &nonce, &sealed)?);

        let padding_size = metadata.padding_size as usize;
        if opened.len() < padding_size {
            return Err(QrSecretsError::CipherTextShort);
        }
        let (plaintext, padding) = opened.split_at(opened.len() - padding_size);

        Ok(Self {
            plaintext: plaintext.to_vec(),
            padding: padding.to_vec(),
        })
    }
}

impl fmt::Debug for SectionCipherText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SectionCipherText")
            .field("plaintext_len", &self.plaintext.len())
            .field("padding_len", &self.padding.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::KeyDerivationParams;

    fn metadata(padding: u32) -> SectionMetaData {
        SectionMetaData::new(
            vec![5u8; 32],
            &KeyDerivationParams::with_values(64, 1, 1, 32),
            padding,
        )
    }

    #[test]
    fn test_encode_decode() {
        let m = metadata(10);
        let section = SectionCipherText::new(b"My secret message.", 10);
        let mut buf = Vec::new();
        section.encode(&mut buf, &m, b"password123SECURE").unwrap();

        // length prefix + nonce + plaintext + padding + tag
        assert_eq!(buf.len(), 8 + 12 + 18 + 10 + 16);
        assert_eq!(u64::from_be_bytes(buf[..8].try_into().unwrap()), 12 + 18 + 10 + 16);

        let decoded = SectionCipherText::decode(&mut buf.as_slice(), &m, b"password123SECURE").unwrap();
        assert_eq!(decoded.plaintext, b"My secret message.");
        assert_eq!(decoded.padding.len(), 10);
    }

    #[test]
    fn test_padding_content_not_checked() {
        let m = metadata(4);
        let mut section = SectionCipherText::new(b"abc", 4);
        section.padding = vec![0xde, 0xad, 0xbe, 0xef];
        let mut buf = Vec::new();
        section.encode(&mut buf, &m, b"pw").unwrap();

        let decoded = SectionCipherText::decode(&mut buf.as_slice(), &m, b"pw").unwrap();
        assert_eq!(decoded.padding, vec![0xde, 0xad, 0xbe, 0xef]);
    }

    #[test]
    fn test_padding_mismatch_rejected() {
        let m = metadata(4);
        let section = SectionCipherText::new(b"abc", 5);
        let err = section.encode(&mut Vec::new(), &m, b"pw").err().unwrap();
        assert!(err.is_validation());
    }

    #[test]
    fn test_wrong_passphrase() {
        let m = metadata(0);
        let mut buf = Vec::new();
        SectionCipherText::new(b"abc", 0).encode(&mut buf, &m, b"right").unwrap();
        let err = SectionCipherText::decode(&mut buf.as_slice(), &m, b"wrong").err().unwrap();
        assert!(err.is_crypto());
    }

    #[test]
    fn test_length_without_room_for_nonce() {
        for len in [0u64, 1, 12] {
            let buf = len.to_be_bytes();
            let err = SectionCipherText::decode(&mut &buf[..], &metadata(0), b"pw").err().unwrap();
            assert!(matches!(err, QrSecretsError::CipherTextShort));
        }
    }

    #[test]
    fn test_truncated_payload() {
        let m = metadata(0);
        let mut buf = Vec::new();
        SectionCipherText::new(b"abc", 0).encode(&mut buf, &m, b"pw").unwrap();
        buf.pop();
        let err = SectionCipherText::decode(&mut buf.as_slice(), &m, b"pw").err().unwrap();
        assert!(matches!(err, QrSecretsError::Truncated(_)));
    }

    #[test]
    fn test_huge_declared_length_does_not_allocate() {
        let mut buf = u64::MAX.to_be_bytes().to_vec();
        buf.extend_from_slice(&[0u8; 40]);
        let err = SectionCipherText::decode(&mut buf.as_slice(), &metadata(0), b"pw").err().unwrap();
        assert!(matches!(err, QrSecretsError::Truncated(_)));
    }

    #[test]
    fn test_padding_larger_than_payload() {
        let sealed_with = metadata(0);
        let mut buf = Vec::new();
        SectionCipherText::new(b"abc", 0).encode(&mut buf, &sealed_with, b"pw").unwrap();

        let mut claims_more = metadata(0);
        claims_more.padding_size = 100;
        let err = SectionCipherText::decode(&mut buf.as_slice(), &claims_more, b"pw").err().unwrap();
        assert!(matches!(err, QrSecretsError::CipherTextShort));
    }

    #[test]
    fn test_debug_hides_plaintext() {
        let section = SectionCipherText::new(b"top secret", 2);
        let debug = format!("{:?}", section);
        assert!(!debug.contains("top secret"));
        assert!(debug.contains("plaintext_len: 10"));
    }

    #[test]
    fn test_excessive_argon_cost_is_decryption_error() {
        let sealed_with = metadata(0);
        let mut buf = Vec::new();
        SectionCipherText::new(b"abc", 0).encode(&mut buf, &sealed_with, b"pw").unwrap();

        let mut forged = metadata(0);
        forged.argon_memory = u32::MAX;
        let err = SectionCipherText::decode(&mut buf.as_slice(), &forged, b"pw").err().unwrap();
        assert!(err.is_crypto());
    }
}
