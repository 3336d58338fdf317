//! # Lockbox Client
//!
//! End-to-end-encrypted personal file storage over an untrusted store.
//!
//! Users register under a username and password, then upload, download,
//! append to, share, receive, and revoke files. The dataserver holding
//! every record is assumed hostile: it may corrupt, drop, replay, or
//! relocate anything it stores. The client's guarantees are cryptographic:
//!
//! - **Confidentiality**: every record is encrypted client-side; the
//!   store sees only ciphertext at opaque locations
//! - **Integrity**: every record is MAC-bound to its location (or
//!   signed); any tampering surfaces as an error on the next operation
//!   that touches it
//! - **Delegated sharing**: recipients can share onward; the owner can
//!   revoke any direct recipient, which transitively cuts off everyone
//!   downstream of them via a full re-key
//!
//! ## Example
//!
//! ```rust,ignore
//! use lockbox_client::Client;
//! use lockbox_store::{DataServer, KeyServer};
//!
//! let client = Client::new(DataServer::new(), KeyServer::new());
//!
//! let alice = client.create_user("alice", "correct horse battery staple")?;
//! alice.upload_file("notes", b"hello")?;
//! alice.append_file("notes", b", world")?;
//! alice.share_file("notes", "bob")?;
//!
//! let bob = client.authenticate_user("bob", "bobs password")?;
//! bob.receive_file("notes", "alice")?;
//! assert_eq!(bob.download_file("notes")?, b"hello, world");
//!
//! alice.revoke_file("notes", "bob")?;
//! assert!(bob.download_file("notes").is_err());
//! ```
//!
//! Sessions hold secrets in memory only; every operation re-fetches and
//! re-verifies the records it needs, so there is no state to go stale
//! between calls.

mod client;
mod error;
mod files;
mod identity;
pub mod records;
mod sharing;

pub use client::{Client, User};
pub use error::{LockboxError, Result};
