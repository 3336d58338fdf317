//! The untrusted key–value byte store

use crate::Handle;
use bytes::Bytes;
use dashmap::DashMap;
use std::sync::Arc;

/// An in-memory model of the untrusted dataserver.
///
/// Writes never fail and overwrites are allowed; reads of absent handles
/// return `None`. The server is *untrusted*: callers must treat every
/// byte it returns as potentially adversarial. Clones share the same
/// underlying map.
#[derive(Clone, Default)]
pub struct DataServer {
    records: Arc<DashMap<Handle, Bytes>>,
}

impl DataServer {
    /// Create a new empty dataserver
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `bytes` at `handle`, overwriting any previous record
    pub fn set(&self, handle: Handle, bytes: impl Into<Bytes>) {
        self.records.insert(handle, bytes.into());
    }

    /// Fetch the record at `handle`
    pub fn get(&self, handle: Handle) -> Option<Bytes> {
        self.records.get(&handle).map(|entry| entry.value().clone())
    }

    /// Remove the record at `handle`, if any
    pub fn delete(&self, handle: Handle) {
        self.records.remove(&handle);
    }

    /// Drop every record (test reset)
    pub fn clear(&self) {
        self.records.clear();
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// List every occupied handle (test inspection)
    pub fn handles(&self) -> Vec<Handle> {
        self.records.iter().map(|entry| *entry.key()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_roundtrip() {
        let server = DataServer::new();
        let loc = Handle::random();
        server.set(loc, Bytes::from_static(b"payload"));
        assert_eq!(server.get(loc).unwrap().as_ref(), b"payload");
    }

    #[test]
    fn test_missing_handle() {
        let server = DataServer::new();
        assert!(server.get(Handle::random()).is_none());
    }

    #[test]
    fn test_overwrite_allowed() {
        let server = DataServer::new();
        let loc = Handle::random();
        server.set(loc, Bytes::from_static(b"first"));
        server.set(loc, Bytes::from_static(b"second"));
        assert_eq!(server.get(loc).unwrap().as_ref(), b"second");
        assert_eq!(server.len(), 1);
    }

    #[test]
    fn test_delete_and_clear() {
        let server = DataServer::new();
        let loc = Handle::random();
        server.set(loc, Bytes::from_static(b"x"));
        server.delete(loc);
        assert!(server.get(loc).is_none());

        server.set(Handle::random(), Bytes::from_static(b"y"));
        server.clear();
        assert!(server.is_empty());
    }

    #[test]
    fn test_clones_share_state() {
        let server = DataServer::new();
        let alias = server.clone();
        let loc = Handle::random();
        server.set(loc, Bytes::from_static(b"shared"));
        assert_eq!(alias.get(loc).unwrap().as_ref(), b"shared");
    }
}
