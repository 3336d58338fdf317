//! Error types for the lockbox-store crate

use thiserror::Error;

/// Result type alias using `StoreError`
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors from the storage layer
#[derive(Error, Debug)]
pub enum StoreError {
    /// No record at the requested handle
    #[error("no record at handle {0}")]
    NotFound(crate::Handle),

    /// Key directory name already taken (writes are one-shot)
    #[error("key directory name already taken: {0}")]
    NameTaken(String),

    /// A record failed authentication or decryption
    #[error("integrity check failed: {0}")]
    Integrity(String),

    /// Handle bytes of the wrong length
    #[error("handle must be {expected} bytes, got {actual}")]
    InvalidHandle { expected: usize, actual: usize },
}
