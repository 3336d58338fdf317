//! Digital signatures with RSA-2048 PSS-SHA-512

use crate::{CryptoError, Result, RSA_BITS};
use rand::rngs::OsRng;
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey};
use rsa::pss::{Signature as PssSignature, SigningKey as PssSigningKey, VerifyingKey as PssVerifyingKey};
use rsa::signature::{RandomizedSigner, SignatureEncoding, Verifier};
use rsa::{RsaPrivateKey, RsaPublicKey};
use sha2::Sha512;

/// A private signing key
#[derive(Clone)]
pub struct SigningKey(RsaPrivateKey);

impl SigningKey {
    /// Sign `data`, returning the signature bytes
    pub fn sign(&self, data: &[u8]) -> Result<Vec<u8>> {
        let signer = PssSigningKey::<Sha512>::new(self.0.clone());
        signer
            .try_sign_with_rng(&mut OsRng, data)
            .map(|sig| sig.to_vec())
            .map_err(|e| CryptoError::Signing(e.to_string()))
    }

    /// Derive the matching verifying key
    pub fn verifying_key(&self) -> VerifyingKey {
        VerifyingKey(RsaPublicKey::from(&self.0))
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

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SigningKey([REDACTED])")
    }
}

/// A public signature-verification key
#[derive(Clone, PartialEq)]
pub struct VerifyingKey(RsaPublicKey);

impl VerifyingKey {
    /// Check `signature` over `data`; any mismatch or malformed
    /// signature fails with [`CryptoError::SignatureVerification`]
    pub fn verify(&self, data: &[u8], signature: &[u8]) -> Result<()> {
        let sig = PssSignature::try_from(signature)
            .map_err(|_| CryptoError::SignatureVerification)?;
        PssVerifyingKey::<Sha512>::new(self.0.clone())
            .verify(data, &sig)
            .map_err(|_| CryptoError::SignatureVerification)
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

impl std::fmt::Debug for VerifyingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "VerifyingKey(rsa-{})", RSA_BITS)
    }
}

/// A key pair for digital signatures
#[derive(Clone)]
pub struct SigningKeyPair {
    signing: SigningKey,
    verifying: VerifyingKey,
}

impl SigningKeyPair {
    /// Generate a new random key pair
    pub fn generate() -> Result<Self> {
        let private = RsaPrivateKey::new(&mut OsRng, RSA_BITS)
            .map_err(|e| CryptoError::KeyGeneration(e.to_string()))?;
        let verifying = VerifyingKey(RsaPublicKey::from(&private));
        Ok(Self {
            signing: SigningKey(private),
            verifying,
        })
    }

    /// Get the private signing key
    pub fn signing_key(&self) -> &SigningKey {
        &self.signing
    }

    /// Get the public verifying key
    pub fn verifying_key(&self) -> &VerifyingKey {
        &self.verifying
    }

    /// Consume the pair, returning both halves
    pub fn into_keys(self) -> (SigningKey, VerifyingKey) {
        (self.signing, self.verifying)
    }
}
