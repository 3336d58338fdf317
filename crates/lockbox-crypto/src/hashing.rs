//! SHA-512 hashing

use sha2::{Digest, Sha512};

/// Size of a SHA-512 digest in bytes
pub const DIGEST_SIZE: usize = 64;

/// Compute the SHA-512 digest of `data`
pub fn sha512(data: &[u8]) -> [u8; DIGEST_SIZE] {
    let digest = Sha512::digest(data);
    let mut out = [0u8; DIGEST_SIZE];
    out.copy_from_slice(&digest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_size() {
        assert_eq!(sha512(b"lockbox").len(), DIGEST_SIZE);
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(sha512(b"same input"), sha512(b"same input"));
        assert_ne!(sha512(b"input a"), sha512(b"input b"));
    }
}
