//! Concrete keys for the NIST prime curves

use aes_gcm::aead::OsRng;
use elliptic_curve::ecdh::{diffie_hellman, EphemeralSecret};
use elliptic_curve::pkcs8::{
    DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey, LineEnding,
};
use elliptic_curve::sec1::ToEncodedPoint;

use super::{ecies, PrivateKey, PublicKey};
use crate::crypto::SecureString;
use crate::error::{QrResult, QrSecretsError};
use crate::registry::{curves, CurveId, Kdf};

macro_rules! nist_curve {
    ($public:ident, $private:ident, $krate:ident, $curve:ty, $id:expr) => {
        /// Recipient public key on this curve
        #[derive(Clone, Debug)]
        pub struct $public {
            inner: $krate::PublicKey,
        }

        impl $public {
            /// Parse a SEC1 encoded point
            pub fn from_sec1_bytes(bytes: &[u8]) -> QrResult<Self> {
                $krate::PublicKey::from_sec1_bytes(bytes)
                    .map(|inner| Self { inner })
                    .map_err(|e| QrSecretsError::Key(format!("invalid {} point: {}", $id, e)))
            }

            /// Parse a `PUBLIC KEY` (SPKI) PEM document
            pub fn from_pem(pem: &str) -> QrResult<Self> {
                $krate::PublicKey::from_public_key_pem(pem)
                    .map(|inner| Self { inner })
                    .map_err(|e| QrSecretsError::Key(format!("invalid {} public key: {}", $id, e)))
            }
        }

        impl PublicKey for $public {
            fn curve(&self) -> CurveId {
                $id
            }

            fn encrypt(&self, plaintext: &[u8], kdf: &Kdf) -> QrResult<Vec<u8>> {
                let ephemeral = EphemeralSecret::<$curve>::random(&mut OsRng);
                let point = ephemeral.public_key().to_encoded_point(false);
                let shared = ephemeral.diffie_hellman(&self.inner);
                ecies::seal(
                    shared.raw_secret_bytes().as_slice(),
                    point.as_bytes(),
                    kdf,
                    plaintext,
                )
            }

            fn to_sec1_bytes(&self) -> Vec<u8> {
                self.inner.to_encoded_point(false).as_bytes().to_vec()
            }

            fn to_pem(&self) -> QrResult<String> {
                self.inner
                    .to_public_key_pem(LineEnding::LF)
                    .map_err(|e| QrSecretsError::Key(format!("failed to encode public key: {}", e)))
            }
        }

        /// Recipient private key on this curve
        #[derive(Clone)]
        pub struct $private {
            inner: $krate::SecretKey,
        }

        impl $private {
            /// Generate a fresh key from the OS random source
            pub fn generate() -> Self {
                Self {
                    inner: $krate::SecretKey::random(&mut OsRng),
                }
            }

            /// Parse an `EC PRIVATE KEY` (SEC1) or `PRIVATE KEY` (PKCS#8) PEM document
            pub fn from_pem(pem: &str) -> QrResult<Self> {
                $krate::SecretKey::from_sec1_pem(pem)
                    .or_else(|_| $krate::SecretKey::from_pkcs8_pem(pem).map_err(|_| ()))
                    .map(|inner| Self { inner })
                    .map_err(|_| QrSecretsError::Key(format!("not a {} private key", $id)))
            }

            /// Parse a password-protected `ENCRYPTED PRIVATE KEY` PEM document
            pub fn from_encrypted_pem(pem: &str, password: &[u8]) -> QrResult<Self> {
                $krate::SecretKey::from_pkcs8_encrypted_pem(pem, password)
                    .map(|inner| Self { inner })
                    .map_err(|_| {
                        QrSecretsError::Key(format!(
                            "not a {} private key, or the key password is wrong",
                            $id
                        ))
                    })
            }

            /// The matching public key as its concrete type
            pub fn public(&self) -> $public {
                $public {
                    inner: self.inner.public_key(),
                }
            }
        }

        impl PrivateKey for $private {
            fn curve(&self) -> CurveId {
                $id
            }

            fn public_key(&self) -> Box<dyn PublicKey> {
                Box::new(self.public())
            }

            fn decrypt(&self, ciphertext: &[u8], curve: CurveId, kdf: &Kdf) -> QrResult<Vec<u8>> {
                if curve != $id {
                    return Err(QrSecretsError::Decryption);
                }
                let point_len = curves::id_to_curve($id)
                    .map(|c| c.uncompressed_point_len())
                    .ok_or(QrSecretsError::Decryption)?;
                let (point, sealed) = ecies::split_message(ciphertext, point_len)?;
                let ephemeral = $krate::PublicKey::from_sec1_bytes(point)
                    .map_err(|_| QrSecretsError::Decryption)?;
                let shared = diffie_hellman(self.inner.to_nonzero_scalar(), ephemeral.as_affine());
                ecies::open(shared.raw_secret_bytes().as_slice(), point, kdf, sealed)
            }

            fn to_pem(&self) -> QrResult<SecureString> {
                self.inner
                    .to_sec1_pem(LineEnding::LF)
                    .map(|pem| SecureString::new(pem.as_str()))
                    .map_err(|e| QrSecretsError::Key(format!("failed to encode private key: {}", e)))
            }

            fn to_encrypted_pem(&self, password: &[u8]) -> QrResult<SecureString> {
                self.inner
                    .to_pkcs8_encrypted_pem(&mut OsRng, password, LineEnding::LF)
                    .map(|pem| SecureString::new(pem.as_str()))
                    .map_err(|e| QrSecretsError::Key(format!("failed to encrypt private key: {}", e)))
            }
        }

        impl std::fmt::Debug for $private {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_struct(stringify!($private)).finish_non_exhaustive()
            }
        }
    };
}

nist_curve!(P224PublicKey, P224PrivateKey, p224, p224::NistP224, CurveId::P224);
nist_curve!(P256PublicKey, P256PrivateKey, p256, p256::NistP256, CurveId::P256);
nist_curve!(P384PublicKey, P384PrivateKey, p384, p384::NistP384, CurveId::P384);
nist_curve!(P521PublicKey, P521PrivateKey, p521, p521::NistP521, CurveId::P521);
