//! Message authentication with HMAC-SHA-512
//!
//! Every record on the untrusted store carries one of these tags; the
//! verify path is constant-time.

use crate::{kdf, random, CryptoError, Result};
use hmac::{Hmac, Mac};
use sha2::Sha512;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Size of a MAC key in bytes (128 bits)
pub const MAC_KEY_SIZE: usize = 16;

/// Size of an HMAC-SHA-512 tag in bytes
pub const TAG_SIZE: usize = 64;

/// An HMAC-SHA-512 authentication tag
pub type Tag = [u8; TAG_SIZE];

type HmacSha512 = Hmac<Sha512>;

/// A key for HMAC-SHA-512 authentication
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct MacKey([u8; MAC_KEY_SIZE]);

impl MacKey {
    /// Generate a new random MAC key
    pub fn generate() -> Self {
        Self(random::random_array())
    }

    /// Create a MAC key from raw bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != MAC_KEY_SIZE {
            return Err(CryptoError::InvalidKey(format!(
                "MAC key must be {} bytes, got {}",
                MAC_KEY_SIZE,
                bytes.len()
            )));
        }
        let mut key = [0u8; MAC_KEY_SIZE];
        key.copy_from_slice(bytes);
        Ok(Self(key))
    }

    /// Derive a MAC key from parent key material and a purpose string
    pub fn derive(parent: &[u8], purpose: &str) -> Self {
        Self(kdf::hash_kdf(parent, purpose))
    }

    /// Get the key bytes
    pub fn as_bytes(&self) -> &[u8; MAC_KEY_SIZE] {
        &self.0
    }
}

impl std::fmt::Debug for MacKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MacKey([REDACTED])")
    }
}

/// Compute the HMAC-SHA-512 tag of `data` under `key`
pub fn authenticate(key: &MacKey, data: &[u8]) -> Tag {
    let mut mac = HmacSha512::new_from_slice(key.as_bytes())
        .expect("HMAC can take a key of any size");
    mac.update(data);
    let mut tag = [0u8; TAG_SIZE];
    tag.copy_from_slice(&mac.finalize().into_bytes());
    tag
}

/// Verify a tag in constant time
pub fn verify(key: &MacKey, data: &[u8], tag: &[u8]) -> bool {
    let mut mac = HmacSha512::new_from_slice(key.as_bytes())
        .expect("HMAC can take a key of any size");
    mac.update(data);
    mac.verify_slice(tag).is_ok()
}
