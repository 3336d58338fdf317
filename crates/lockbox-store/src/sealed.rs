//! Authenticated envelopes over the untrusted dataserver
//!
//! Record layout: `SymEnc(enc_key, plaintext) || HMAC(mac_key, handle || ciphertext)`.
//!
//! Binding the handle into the MAC means an adversary who copies a valid
//! envelope to a different location produces a record that fails
//! verification there, so relocation is caught exactly like bit-level
//! tampering. The adapter never interprets plaintext.

use crate::{DataServer, Handle, Result, StoreError};
use lockbox_crypto::{mac, symmetric, MacKey, SymKey, TAG_SIZE};

/// The authenticated-envelope adapter
#[derive(Clone)]
pub struct SealedStore {
    data: DataServer,
}

impl SealedStore {
    /// Wrap a dataserver
    pub fn new(data: DataServer) -> Self {
        Self { data }
    }

    /// Access the underlying dataserver, for records protected by other
    /// means (asymmetrically encrypted invites)
    pub fn raw(&self) -> &DataServer {
        &self.data
    }

    /// Seal `plaintext` into an authenticated envelope at `handle`
    pub fn put(&self, handle: Handle, enc_key: &SymKey, mac_key: &MacKey, plaintext: &[u8]) {
        let ciphertext = symmetric::encrypt(enc_key, plaintext);

        let mut message = Vec::with_capacity(handle.as_bytes().len() + ciphertext.len());
        message.extend_from_slice(handle.as_bytes());
        message.extend_from_slice(&ciphertext);
        let tag = mac::authenticate(mac_key, &message);

        let mut record = ciphertext;
        record.extend_from_slice(&tag);
        self.data.set(handle, record);
    }

    /// Open the envelope at `handle`, verifying before decrypting.
    ///
    /// Every deviation from a faithful store (missing record, truncated
    /// or modified bytes, an envelope moved from another handle, wrong
    /// keys) comes back as an error.
    pub fn get(&self, handle: Handle, enc_key: &SymKey, mac_key: &MacKey) -> Result<Vec<u8>> {
        let record = self.data.get(handle).ok_or(StoreError::NotFound(handle))?;
        if record.len() < TAG_SIZE {
            return Err(StoreError::Integrity(format!(
                "record at {handle} too short to carry a tag"
            )));
        }

        let (ciphertext, tag) = record.split_at(record.len() - TAG_SIZE);
        let mut message = Vec::with_capacity(handle.as_bytes().len() + ciphertext.len());
        message.extend_from_slice(handle.as_bytes());
        message.extend_from_slice(ciphertext);
        if !mac::verify(mac_key, &message, tag) {
            return Err(StoreError::Integrity(format!("bad MAC at {handle}")));
        }

        symmetric::decrypt(enc_key, ciphertext)
            .map_err(|e| StoreError::Integrity(e.to_string()))
    }

    /// Remove the record at `handle`, if any
    pub fn delete(&self, handle: Handle) {
        self.data.delete(handle);
    }
}
