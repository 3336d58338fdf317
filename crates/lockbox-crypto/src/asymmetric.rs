//! Asymmetric encryption with RSA-2048 OAEP-SHA-512
//!
//! Used only for small payloads (wrapped symmetric keys inside invites);
//! OAEP over a 2048-bit modulus tops out well under a record's worth of
//! plaintext.

use crate::{CryptoError, Result, RSA_BITS};
use rand::rngs::OsRng;
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey};
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use sha2::Sha512;

/// A public key for asymmetric encryption
#[derive(Clone, PartialEq)]
pub struct EncryptionPublicKey(RsaPublicKey);

impl EncryptionPublicKey {
    /// Encrypt a small plaintext to this key
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        self.0
            .encrypt(&mut OsRng, Oaep::new::<Sha512>(), plaintext)
            .map_err(|e| CryptoError::Encryption(e.to_string()))
    }

    /// Encode as DER (SubjectPublicKeyInfo)
    pub fn to_der(&self) -> Result<Vec<u8>> {
        self.0
            .to_public_key_der()
            .map(|doc| doc.as_bytes().to_vec())
            .map_err(|e| CryptoError::InvalidKey(e.to_string()))
    }

    /// Decode from DER (SubjectPublicKeyInfo)
    pub fn from_der(bytes: &[u8]) -> Result<Self> {
        RsaPublicKey::from_public_key_der(bytes)
            .map(Self)
            .map_err(|e| CryptoError::InvalidKey(e.to_string()))
    }
}

impl std::fmt::Debug for EncryptionPublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EncryptionPublicKey(rsa-{})", RSA_BITS)
    }
}

/// A private key for asymmetric decryption
#[derive(Clone)]
pub struct EncryptionPrivateKey(RsaPrivateKey);

impl EncryptionPrivateKey {
    /// Decrypt a ciphertext produced with the matching public key
    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        self.0
            .decrypt(Oaep::new::<Sha512>(), ciphertext)
            .map_err(|e| CryptoError::Decryption(e.to_string()))
    }

    /// Derive the matching public key
    pub fn public_key(&self) -> EncryptionPublicKey {
        EncryptionPublicKey(RsaPublicKey::from(&self.0))
    }

    /// Encode as DER (PKCS#8)
    pub fn to_der(&self) -> Result<Vec<u8>> {
        self.0
            .to_pkcs8_der()
            .map(|doc| doc.as_bytes().to_vec())
            .map_err(|e| CryptoError::InvalidKey(e.to_string()))
    }

    /// Decode from DER (PKCS#8)
    pub fn from_der(bytes: &[u8]) -> Result<Self> {
        RsaPrivateKey::from_pkcs8_der(bytes)
            .map(Self)
            .map_err(|e| CryptoError::InvalidKey(e.to_string()))
    }
}

impl std::fmt::Debug for EncryptionPrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EncryptionPrivateKey([REDACTED])")
    }
}

/// A key pair for asymmetric encryption
#[derive(Clone)]
pub struct EncryptionKeyPair {
    public: EncryptionPublicKey,
    private: EncryptionPrivateKey,
}

impl EncryptionKeyPair {
    /// Generate a new random key pair
    pub fn generate() -> Result<Self> {
        let private = RsaPrivateKey::new(&mut OsRng, RSA_BITS)
            .map_err(|e| CryptoError::KeyGeneration(e.to_string()))?;
        let public = RsaPublicKey::from(&private);
        Ok(Self {
            public: EncryptionPublicKey(public),
            private: EncryptionPrivateKey(private),
        })
    }

    /// Get the public key
    pub fn public_key(&self) -> &EncryptionPublicKey {
        &self.public
    }

    /// Get the private key
    pub fn private_key(&self) -> &EncryptionPrivateKey {
        &self.private
    }

    /// Consume the pair, returning both halves
    pub fn into_keys(self) -> (EncryptionPublicKey, EncryptionPrivateKey) {
        (self.public, self.private)
    }
}
