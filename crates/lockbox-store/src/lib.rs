//! # Lockbox Store
//!
//! Storage layer for the Lockbox end-to-end-encrypted file service.
//!
//! Two in-memory servers model the deployment environment:
//!
//! - [`DataServer`]: the **untrusted** key–value byte store, addressed by
//!   16-byte [`Handle`]s. It may drop, corrupt, or substitute records at
//!   any time; nothing above it trusts what it returns.
//! - [`KeyServer`]: the **trusted** public-key directory, a write-once
//!   mapping from names to DER-encoded public keys.
//!
//! [`SealedStore`] layers authenticated envelopes over the dataserver:
//! every record is encrypted, and its MAC binds the record to the handle
//! it lives at, so substitution between locations is detected the same
//! way as bit-level tampering.
//!
//! ## Example
//!
//! ```rust,ignore
//! use lockbox_store::{DataServer, Handle, SealedStore};
//! use lockbox_crypto::{MacKey, SymKey};
//!
//! let store = SealedStore::new(DataServer::new());
//! let (enc, mac) = (SymKey::generate(), MacKey::generate());
//!
//! let loc = Handle::random();
//! store.put(loc, &enc, &mac, b"record body");
//! assert_eq!(store.get(loc, &enc, &mac)?, b"record body");
//! ```

pub mod dataserver;
pub mod error;
pub mod handle;
pub mod keyserver;
pub mod sealed;

pub use dataserver::DataServer;
pub use error::{Result, StoreError};
pub use handle::{Handle, HANDLE_SIZE};
pub use keyserver::KeyServer;
pub use sealed::SealedStore;
