//! Metadata section: salt and Argon2 tuning, wrapped with ECIES
//!
//! ```text
//! plaintext (49 bytes, big-endian)
//!  0  32  salt
//! 32   4  argon memory (KiB)
//! 36   4  argon iterations
//! 40   1  argon parallelism
//! 41   4  argon key length
//! 45   4  padding size
//!
//! wire
//!  0   2  ciphertext length
//!  2   n  ECIES(plaintext)
//! ```
//!
//! Only the holder of the private key learns the salt and cost parameters,
//! so an interceptor cannot start an offline passphrase search.

use std::io::{Read, Write};

use tracing::debug;

use super::{read_array, read_field, SALT_SIZE};
use crate::crypto::KeyDerivationParams;
use crate::error::{QrResult, QrSecretsError};
use crate::keys::{PrivateKey, PublicKey};
use crate::registry::{curves, hashes, CurveId, HashId, Kdf};

/// Symmetric-encryption parameters needed to rebuild the payload key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionMetaData {
    /// Argon2 salt, exactly 32 bytes
    pub salt: Vec<u8>,
    pub argon_memory: u32,
    pub argon_iterations: u32,
    pub argon_parallelism: u8,
    pub argon_key_len: u32,
    /// Number of filler bytes appended to the plaintext before sealing
    pub padding_size: u32,
}

impl SectionMetaData {
    /// Size of the serialized (pre-encryption) section
    pub const ENCODED_LEN: usize = SALT_SIZE + 4 + 4 + 1 + 4 + 4;

    /// Build a section from a salt, KDF parameters and a padding size
    pub fn new(salt: Vec<u8>, params: &KeyDerivationParams, padding_size: u32) -> Self {
        Self {
            salt,
            argon_memory: params.memory_cost,
            argon_iterations: params.time_cost,
            argon_parallelism: params.parallelism,
            argon_key_len: params.key_len,
            padding_size,
        }
    }

    /// Argon2 parameters stored in this section
    pub fn kdf_params(&self) -> KeyDerivationParams {
        KeyDerivationParams::with_values(
            self.argon_memory,
            self.argon_iterations,
            self.argon_parallelism,
            self.argon_key_len,
        )
    }

    /// Replace the Argon2 parameters, keeping salt and padding
    pub fn set_kdf_params(&mut self, params: &KeyDerivationParams) {
        self.argon_memory = params.memory_cost;
        self.argon_iterations = params.time_cost;
        self.argon_parallelism = params.parallelism;
        self.argon_key_len = params.key_len;
    }

    /// Serialize the fixed-width fields
    pub fn to_bytes(&self) -> QrResult<[u8; Self::ENCODED_LEN]> {
        if self.salt.len() != SALT_SIZE {
            return Err(QrSecretsError::SaltInvalid(self.salt.len()));
        }

        let mut out = [0u8; Self::ENCODED_LEN];
        out[..32].copy_from_slice(&self.salt);
        out[32..36].copy_from_slice(&self.argon_memory.to_be_bytes());
        out[36..40].copy_from_slice(&self.argon_iterations.to_be_bytes());
        out[40] = self.argon_parallelism;
        out[41..45].copy_from_slice(&self.argon_key_len.to_be_bytes());
        out[45..49].copy_from_slice(&self.padding_size.to_be_bytes());
        Ok(out)
    }

    /// Parse the fixed-width fields
    ///
    /// Bytes past the last field are ignored.
    pub fn from_bytes(bytes: &[u8]) -> QrResult<Self> {
        let mut cursor = bytes;
        let salt = take(&mut cursor, SALT_SIZE)?.to_vec();
        let argon_memory = take_u32(&mut cursor)?;
        let argon_iterations = take_u32(&mut cursor)?;
        let argon_parallelism = take(&mut cursor, 1)?[0];
        let argon_key_len = take_u32(&mut cursor)?;
        let padding_size = take_u32(&mut cursor)?;

        Ok(Self {
            salt,
            argon_memory,
            argon_iterations,
            argon_parallelism,
            argon_key_len,
            padding_size,
        })
    }

    /// Encrypt the section to `public_key` and write it length-prefixed
    pub fn encode<W: Write>(
        &self,
        w: &mut W,
        hash: HashId,
        public_key: &dyn PublicKey,
    ) -> QrResult<()> {
        let plaintext = self.to_bytes()?;
        let kdf = kdf_for(hash)?;

        let ciphertext = public_key.encrypt(&plaintext, kdf)?;
        let len = u16::try_from(ciphertext.len()).map_err(|_| {
            QrSecretsError::Validation(format!(
                "metadata ciphertext is {} bytes, the limit is {}",
                ciphertext.len(),
                u16::MAX
            ))
        })?;

        debug!(
            curve = public_key.name(),
            hash = kdf.name,
            len,
            "writing metadata section"
        );
        w.write_all(&len.to_be_bytes())?;
        w.write_all(&ciphertext)?;
        Ok(())
    }

    /// Read and decrypt a metadata section
    pub fn decode<R: Read>(
        r: &mut R,
        curve: CurveId,
        hash: HashId,
        private_key: &dyn PrivateKey,
    ) -> QrResult<Self> {
        let len = u16::from_be_bytes(read_array(r, "metadata length")?);
        let mut ciphertext = vec![0u8; usize::from(len)];
        read_field(r, &mut ciphertext, "metadata section")?;
        debug!(len, "read metadata section");

        if curves::id_to_curve(curve).is_none() {
            return Err(QrSecretsError::CurveSupport(curve.as_u8()));
        }
        let kdf = kdf_for(hash)?;

        let plaintext = private_key.decrypt(&ciphertext, curve, kdf)?;
        Self::from_bytes(&plaintext)
    }
}

fn kdf_for(hash: HashId) -> QrResult<&'static Kdf> {
    hashes::id_to_kdf(hash).ok_or(QrSecretsError::HashUnsupported(hash.as_u8()))
}

fn take<'a>(cursor: &mut &'a [u8], n: usize) -> QrResult<&'a [u8]> {
    if cursor.len() < n {
        return Err(QrSecretsError::CipherTextShort);
    }
    let (head, tail) = cursor.split_at(n);
    *cursor = tail;
    Ok(head)
}

fn take_u32(cursor: &mut &[u8]) -> QrResult<u32> {
    let bytes = take(cursor, 4)?;
    Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{P256PrivateKey, P384PrivateKey};

    fn sample() -> SectionMetaData {
        SectionMetaData {
            salt: (0..32).collect(),
            argon_memory: 0x0001_0203,
            argon_iterations: 4,
            argon_parallelism: 2,
            argon_key_len: 32,
            padding_size: 40,
        }
    }

    #[test]
    fn test_layout() {
        let bytes = sample().to_bytes().unwrap();
        assert_eq!(bytes.len(), 49);
        assert_eq!(&bytes[..32], &sample().salt[..]);
        assert_eq!(&bytes[32..36], &[0x00, 0x01, 0x02, 0x03]);
        assert_eq!(&bytes[36..40], &[0, 0, 0, 4]);
        assert_eq!(bytes[40], 2);
        assert_eq!(&bytes[41..45], &[0, 0, 0, 32]);
        assert_eq!(&bytes[45..49], &[0, 0, 0, 40]);
        assert_eq!(SectionMetaData::from_bytes(&bytes).unwrap(), sample());
    }

    #[test]
    fn test_salt_length_enforced() {
        for len in [0usize, 16, 31, 33, 64] {
            let mut m = sample();
            m.salt = vec![1u8; len];
            let err = m.to_bytes().err().unwrap();
            assert!(matches!(err, QrSecretsError::SaltInvalid(n) if n == len));
        }
    }

    #[test]
    fn test_short_plaintext() {
        let bytes = sample().to_bytes().unwrap();
        for cut in [0usize, 31, 32, 40, 48] {
            let err = SectionMetaData::from_bytes(&bytes[..cut]).err().unwrap();
            assert!(matches!(err, QrSecretsError::CipherTextShort));
        }
    }

    #[test]
    fn test_kdf_params_round_trip() {
        let mut m = sample();
        let params = KeyDerivationParams::with_values(1024, 2, 1, 16);
        m.set_kdf_params(&params);
        assert_eq!(m.kdf_params(), params);
        assert_eq!(m.padding_size, 40);
    }

    #[test]
    fn test_encode_decode() {
        let key = P256PrivateKey::generate();
        let mut buf = Vec::new();
        sample()
            .encode(&mut buf, HashId::SHA3_512, &key.public())
            .unwrap();

        let len = u16::from_be_bytes([buf[0], buf[1]]) as usize;
        assert_eq!(buf.len(), 2 + len);

        let decoded =
            SectionMetaData::decode(&mut buf.as_slice(), CurveId::P256, HashId::SHA3_512, &key)
                .unwrap();
        assert_eq!(decoded, sample());
    }

    #[test]
    fn test_decode_wrong_hash_is_crypto_error() {
        let key = P256PrivateKey::generate();
        let mut buf = Vec::new();
        sample().encode(&mut buf, HashId::SHA256, &key.public()).unwrap();

        let err = SectionMetaData::decode(&mut buf.as_slice(), CurveId::P256, HashId::SHA512, &key)
            .err()
            .unwrap();
        assert!(err.is_crypto());
    }

    #[test]
    fn test_decode_with_key_on_other_curve() {
        let key = P256PrivateKey::generate();
        let other = P384PrivateKey::generate();
        let mut buf = Vec::new();
        sample().encode(&mut buf, HashId::SHA256, &key.public()).unwrap();

        let err = SectionMetaData::decode(&mut buf.as_slice(), CurveId::P256, HashId::SHA256, &other)
            .err()
            .unwrap();
        assert!(err.is_crypto());
    }

    #[test]
    fn test_unsupported_hash() {
        let key = P256PrivateKey::generate();
        let err = sample()
            .encode(&mut Vec::new(), HashId(9), &key.public())
            .err()
            .unwrap();
        assert!(matches!(err, QrSecretsError::HashUnsupported(9)));
    }

    #[test]
    fn test_truncated_section() {
        let key = P256PrivateKey::generate();
        let mut buf = Vec::new();
        sample().encode(&mut buf, HashId::SHA256, &key.public()).unwrap();
        buf.truncate(buf.len() - 1);

        let err = SectionMetaData::decode(&mut buf.as_slice(), CurveId::P256, HashId::SHA256, &key)
            .err()
            .unwrap();
        assert!(matches!(err, QrSecretsError::Truncated(_)));
    }

    #[test]
    fn test_read_failure_is_not_truncation() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _: &mut [u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(std::io::ErrorKind::Other, "device gone"))
            }
        }

        let key = P256PrivateKey::generate();
        let mut reader = (&[0u8, 130][..]).chain(Broken);
        let err = SectionMetaData::decode(&mut reader, CurveId::P256, HashId::SHA256, &key)
            .err()
            .unwrap();
        assert!(matches!(err, QrSecretsError::Io(_)));
    }
}
