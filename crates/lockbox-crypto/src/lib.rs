//! # Lockbox Crypto
//!
//! Cryptographic primitives for the Lockbox end-to-end-encrypted file
//! service.
//!
//! Everything a client stores on the untrusted dataserver is protected by
//! the primitives in this crate:
//!
//! - **Symmetric encryption**: AES-128-CBC with PKCS#7 padding; always
//!   paired with an HMAC at the layer above (encrypt-then-MAC)
//! - **MAC**: HMAC-SHA-512 with constant-time verification
//! - **Key derivation**: HKDF-SHA-512 purpose strings for fanning one key
//!   out into many, PBKDF2-HMAC-SHA-256 for rooting a user's key
//!   hierarchy in a password
//! - **Asymmetric encryption**: RSA-2048 OAEP-SHA-512 (invites)
//! - **Signatures**: RSA-2048 PSS-SHA-512 (sender authentication)
//!
//! ## Security Model
//!
//! All encryption happens client-side. Private keys and symmetric key
//! material never leave the client; the storage side sees only
//! ciphertext and MAC tags. Symmetric keys are zeroized on drop.
//!
//! ## Example
//!
//! ```rust,ignore
//! use lockbox_crypto::{mac, symmetric, SymKey, MacKey};
//!
//! let enc_key = SymKey::generate();
//! let mac_key = MacKey::generate();
//!
//! let ciphertext = symmetric::encrypt(&enc_key, b"hello");
//! let tag = mac::authenticate(&mac_key, &ciphertext);
//!
//! assert!(mac::verify(&mac_key, &ciphertext, &tag));
//! assert_eq!(symmetric::decrypt(&enc_key, &ciphertext)?, b"hello");
//! ```

pub mod asymmetric;
pub mod error;
pub mod hashing;
pub mod kdf;
pub mod mac;
pub mod random;
pub mod signing;
pub mod symmetric;

pub use asymmetric::{EncryptionKeyPair, EncryptionPrivateKey, EncryptionPublicKey};
pub use error::{CryptoError, Result};
pub use kdf::{hash_kdf, password_kdf, user_salt};
pub use mac::{MacKey, Tag, MAC_KEY_SIZE, TAG_SIZE};
pub use signing::{SigningKey, SigningKeyPair, VerifyingKey};
pub use symmetric::{SymKey, KEY_SIZE};

/// RSA modulus size used for both encryption and signing keys
pub const RSA_BITS: usize = 2048;
