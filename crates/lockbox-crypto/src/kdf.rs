//! Key derivation
//!
//! Two derivation paths feed the client's key hierarchy:
//!
//! - [`hash_kdf`] fans a single key out into many via HKDF-SHA-512 and a
//!   purpose string, so one 16-byte secret can back an arbitrary set of
//!   independent sub-keys
//! - [`password_kdf`] roots the hierarchy in a low-entropy password via
//!   PBKDF2-HMAC-SHA-256 with a per-user salt

use hkdf::Hkdf;
use sha2::{Digest, Sha256, Sha512};

/// Size of every derived key in bytes (128 bits)
pub const DERIVED_KEY_SIZE: usize = 16;

/// PBKDF2 iteration count for password-based derivation
pub const PBKDF2_ROUNDS: u32 = 100_000;

/// Size of the per-user PBKDF2 salt in bytes
pub const SALT_SIZE: usize = 16;

/// Derive a sub-key from parent key material and a purpose string.
///
/// The same `(key, purpose)` pair always yields the same sub-key;
/// distinct purposes yield independent keys.
pub fn hash_kdf(key: &[u8], purpose: &str) -> [u8; DERIVED_KEY_SIZE] {
    let mut ikm = Vec::with_capacity(key.len() + purpose.len());
    ikm.extend_from_slice(key);
    ikm.extend_from_slice(purpose.as_bytes());

    let hk = Hkdf::<Sha512>::new(None, &ikm);
    let mut okm = [0u8; DERIVED_KEY_SIZE];
    hk.expand(&[], &mut okm)
        .expect("16 bytes is a valid HKDF-SHA-512 output length");
    okm
}

/// Derive a key from a password and salt with PBKDF2-HMAC-SHA-256
pub fn password_kdf(password: &str, salt: &[u8]) -> [u8; DERIVED_KEY_SIZE] {
    let mut out = [0u8; DERIVED_KEY_SIZE];
    pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, PBKDF2_ROUNDS, &mut out);
    out
}

/// Deterministic per-user PBKDF2 salt.
///
/// Not secret; it only makes the password derivation differ per user so a
/// single lookup table cannot cover everyone.
pub fn user_salt(username: &str) -> [u8; SALT_SIZE] {
    let digest = Sha512::digest(username.as_bytes());
    let mut salt = [0u8; SALT_SIZE];
    salt.copy_from_slice(&digest[..SALT_SIZE]);
    salt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_kdf_purposes_are_independent() {
        let key = [1u8; 16];
        let a = hash_kdf(&key, "enc");
        let b = hash_kdf(&key, "mac");
        assert_ne!(a, b);
        assert_eq!(a, hash_kdf(&key, "enc"));
    }

    #[test]
    fn test_hash_kdf_keys_are_independent() {
        assert_ne!(hash_kdf(&[1u8; 16], "enc"), hash_kdf(&[2u8; 16], "enc"));
    }

    #[test]
    fn test_password_kdf_deterministic() {
        let salt = user_salt("alice");
        assert_eq!(password_kdf("pw", &salt), password_kdf("pw", &salt));
        assert_ne!(password_kdf("pw", &salt), password_kdf("pw2", &salt));
    }

    #[test]
    fn test_salts_differ_per_user() {
        assert_ne!(user_salt("alice"), user_salt("bob"));
        // same password, different user, different root key
        assert_ne!(
            password_kdf("pw", &user_salt("alice")),
            password_kdf("pw", &user_salt("bob"))
        );
    }
}
