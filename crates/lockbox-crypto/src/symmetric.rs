//! Symmetric encryption with AES-128-CBC
//!
//! CBC carries no authentication of its own; callers pair every
//! ciphertext with an HMAC tag from [`crate::mac`] (encrypt-then-MAC).
//! The random IV is appended to the ciphertext.

use crate::{kdf, random, CryptoError, Result};
use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use zeroize::{Zeroize, ZeroizeOnDrop};

type Aes128CbcEnc = cbc::Encryptor<aes::Aes128>;
type Aes128CbcDec = cbc::Decryptor<aes::Aes128>;

/// Size of a symmetric key in bytes (128 bits)
pub const KEY_SIZE: usize = 16;

/// Size of a CBC initialization vector in bytes
pub const IV_SIZE: usize = 16;

/// AES block size in bytes
const BLOCK_SIZE: usize = 16;

/// A symmetric encryption key
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SymKey([u8; KEY_SIZE]);

impl SymKey {
    /// Generate a new random key
    pub fn generate() -> Self {
        Self(random::random_array())
    }

    /// Create a key from raw bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != KEY_SIZE {
            return Err(CryptoError::InvalidKey(format!(
                "symmetric key must be {} bytes, got {}",
                KEY_SIZE,
                bytes.len()
            )));
        }
        let mut key = [0u8; KEY_SIZE];
        key.copy_from_slice(bytes);
        Ok(Self(key))
    }

    /// Derive a key from parent key material and a purpose string
    pub fn derive(parent: &[u8], purpose: &str) -> Self {
        Self(kdf::hash_kdf(parent, purpose))
    }

    /// Get the key bytes
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

impl std::fmt::Debug for SymKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SymKey([REDACTED])")
    }
}

/// Encrypt `plaintext` under `key` with a fresh random IV.
///
/// Output layout: `ciphertext || iv`.
pub fn encrypt(key: &SymKey, plaintext: &[u8]) -> Vec<u8> {
    let iv: [u8; IV_SIZE] = random::random_array();
    let cipher = Aes128CbcEnc::new_from_slices(key.as_bytes(), &iv)
        .expect("key and IV sizes are fixed at compile time");
    let mut out = cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext);
    out.extend_from_slice(&iv);
    out
}

/// Decrypt a `ciphertext || iv` buffer produced by [`encrypt`]
pub fn decrypt(key: &SymKey, ciphertext: &[u8]) -> Result<Vec<u8>> {
    if ciphertext.len() < IV_SIZE + BLOCK_SIZE
        || (ciphertext.len() - IV_SIZE) % BLOCK_SIZE != 0
    {
        return Err(CryptoError::InvalidCiphertext(format!(
            "ciphertext length {} is not iv + whole blocks",
            ciphertext.len()
        )));
    }
    let (body, iv) = ciphertext.split_at(ciphertext.len() - IV_SIZE);
    let cipher = Aes128CbcDec::new_from_slices(key.as_bytes(), iv)
        .expect("key and IV sizes checked above");
    cipher
        .decrypt_padded_vec_mut::<Pkcs7>(body)
        .map_err(|_| CryptoError::Decryption("invalid padding".into()))
}
