//! The trusted public-key directory

use crate::{Result, StoreError};
use bytes::Bytes;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

/// An in-memory model of the trusted key directory.
///
/// Names map to DER-encoded public keys. Writes are one-shot: the first
/// `set` for a name wins and every later one fails, which is what makes
/// concurrent duplicate registration detectable. Clones share the same
/// underlying map.
#[derive(Clone, Default)]
pub struct KeyServer {
    keys: Arc<DashMap<String, Bytes>>,
}

impl KeyServer {
    /// Create a new empty key directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a public key under `name`. Fails if the name is taken.
    pub fn set(&self, name: &str, key: impl Into<Bytes>) -> Result<()> {
        match self.keys.entry(name.to_string()) {
            Entry::Occupied(_) => Err(StoreError::NameTaken(name.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(key.into());
                Ok(())
            }
        }
    }

    /// Look up the public key published under `name`
    pub fn get(&self, name: &str) -> Option<Bytes> {
        self.keys.get(name).map(|entry| entry.value().clone())
    }

    /// Whether `name` has been published
    pub fn contains(&self, name: &str) -> bool {
        self.keys.contains_key(name)
    }

    /// Drop every entry (test reset)
    pub fn clear(&self) {
        self.keys.clear();
    }
}
