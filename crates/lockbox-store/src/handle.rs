//! Opaque 16-byte store addresses

use crate::{Result, StoreError};
use lockbox_crypto::{mac, random, MacKey};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Size of a store handle in bytes
pub const HANDLE_SIZE: usize = 16;

/// An opaque address into the dataserver.
///
/// Handles are either drawn at random (and then remembered inside some
/// other authenticated record) or derived deterministically from a MAC
/// key and a label, so that any party holding the key can recompute the
/// location without storing it.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle([u8; HANDLE_SIZE]);

impl Handle {
    /// Draw a fresh random handle
    pub fn random() -> Self {
        Self(random::random_array())
    }

    /// Build a handle from exactly [`HANDLE_SIZE`] bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != HANDLE_SIZE {
            return Err(StoreError::InvalidHandle {
                expected: HANDLE_SIZE,
                actual: bytes.len(),
            });
        }
        let mut handle = [0u8; HANDLE_SIZE];
        handle.copy_from_slice(bytes);
        Ok(Self(handle))
    }

    /// Derive a deterministic handle from a MAC key and a label.
    ///
    /// Same `(key, label)` pair, same handle; the key scopes the label so
    /// different users' identical labels land at independent locations.
    pub fn derive(key: &MacKey, label: &[u8]) -> Self {
        let tag = mac::authenticate(key, label);
        let mut handle = [0u8; HANDLE_SIZE];
        handle.copy_from_slice(&tag[..HANDLE_SIZE]);
        Self(handle)
    }

    /// Get the handle bytes
    pub fn as_bytes(&self) -> &[u8; HANDLE_SIZE] {
        &self.0
    }
}

// Serialized as a byte string, not a sequence of integers, so a handle
// costs 17 bytes inside an encoded record
impl Serialize for Handle {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_bytes(&self.0)
    }
}

impl<'de> Deserialize<'de> for Handle {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct HandleVisitor;

        impl<'de> Visitor<'de> for HandleVisitor {
            type Value = Handle;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "a byte string of {HANDLE_SIZE} bytes")
            }

            fn visit_bytes<E: de::Error>(self, bytes: &[u8]) -> std::result::Result<Handle, E> {
                Handle::from_bytes(bytes).map_err(|_| E::invalid_length(bytes.len(), &self))
            }
        }

        deserializer.deserialize_bytes(HandleVisitor)
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({})", hex::encode(self.0))
    }
}
