//! Client error types
//!
//! Every operation on the public surface fails with a single
//! [`LockboxError`]. The variants carry the internal taxonomy for logs
//! and tests; callers should treat *which operation* failed as the
//! contract, not the variant or message.

use lockbox_crypto::CryptoError;
use lockbox_store::StoreError;
use thiserror::Error;

/// Result type alias using `LockboxError`
pub type Result<T> = std::result::Result<T, LockboxError>;

/// Errors from the client
#[derive(Error, Debug)]
pub enum LockboxError {
    /// Malformed call arguments (empty credentials, self-share, ...)
    #[error("invalid argument: {0}")]
    BadArgument(String),

    /// Registration under a username that is already taken
    #[error("user already exists: {0}")]
    UserExists(String),

    /// The named user has no published keys
    #[error("unknown user: {0}")]
    UnknownUser(String),

    /// Login failed; deliberately silent about why
    #[error("authentication failed")]
    AuthFailed,

    /// No such filename in the caller's namespace
    #[error("file not found: {0}")]
    FileNotFound(String),

    /// The filename is already bound in the caller's namespace
    #[error("filename already in use: {0}")]
    NameTaken(String),

    /// Operation restricted to the file owner
    #[error("caller does not own this file")]
    NotOwner,

    /// Revocation target is not a direct recipient
    #[error("file is not shared with {0}")]
    NotSharedWith(String),

    /// A stored record failed authentication, decryption, or decoding,
    /// or a record the protocol requires is missing. The untrusted store
    /// is presumed hostile; all of these read as tampering.
    #[error("integrity check failed: {0}")]
    Integrity(String),
}

impl From<StoreError> for LockboxError {
    fn from(err: StoreError) -> Self {
        LockboxError::Integrity(err.to_string())
    }
}

impl From<CryptoError> for LockboxError {
    fn from(err: CryptoError) -> Self {
        LockboxError::Integrity(err.to_string())
    }
}
