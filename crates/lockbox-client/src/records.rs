//! On-the-wire record types
//!
//! Every persistent structure the client stores is one of these, encoded
//! as DAG-CBOR and wrapped in an authenticated envelope (or, for
//! invites, in the hybrid signed-and-encrypted form built in the sharing
//! layer). Decoding rejects unknown shapes, so a swapped-in record of
//! the wrong type fails like any other tampering.

use crate::{LockboxError, Result};
use lockbox_store::Handle;
use serde::de::{self, DeserializeOwned, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Size of the raw symmetric key material carried inside records
pub const RAW_KEY_SIZE: usize = 16;

/// Raw symmetric key material as it appears inside records.
///
/// Serialized as a byte string, like every other byte field; the
/// surrounding record's envelope (or invite encryption) is what keeps
/// it confidential.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct RawKey([u8; RAW_KEY_SIZE]);

impl RawKey {
    /// Draw fresh random key material
    pub fn generate() -> Self {
        Self(lockbox_crypto::random::random_array())
    }

    /// Get the key bytes
    pub fn as_bytes(&self) -> &[u8; RAW_KEY_SIZE] {
        &self.0
    }
}

impl From<[u8; RAW_KEY_SIZE]> for RawKey {
    fn from(bytes: [u8; RAW_KEY_SIZE]) -> Self {
        Self(bytes)
    }
}

impl fmt::Debug for RawKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RawKey([REDACTED])")
    }
}

impl Serialize for RawKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_bytes(&self.0)
    }
}

impl<'de> Deserialize<'de> for RawKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct RawKeyVisitor;

        impl<'de> Visitor<'de> for RawKeyVisitor {
            type Value = RawKey;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "a byte string of {RAW_KEY_SIZE} bytes")
            }

            fn visit_bytes<E: de::Error>(self, bytes: &[u8]) -> std::result::Result<RawKey, E> {
                let key: [u8; RAW_KEY_SIZE] = bytes
                    .try_into()
                    .map_err(|_| E::invalid_length(bytes.len(), &self))?;
                Ok(RawKey(key))
            }
        }

        deserializer.deserialize_bytes(RawKeyVisitor)
    }
}

/// Encode a record as DAG-CBOR
pub fn encode<T: Serialize>(record: &T) -> Result<Vec<u8>> {
    serde_ipld_dagcbor::to_vec(record)
        .map_err(|e| LockboxError::Integrity(format!("record encoding failed: {e}")))
}

/// Decode a record from DAG-CBOR; malformed bytes are an integrity error
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_ipld_dagcbor::from_slice(bytes)
        .map_err(|e| LockboxError::Integrity(format!("malformed record: {e}")))
}

/// The root of a user's key hierarchy, sealed at a handle derivable only
/// from the username and password
#[derive(Serialize, Deserialize)]
pub struct RootRecord {
    /// PKCS#8 DER of the user's asymmetric decryption key
    #[serde(with = "serde_bytes")]
    pub enc_key_der: Vec<u8>,
    /// PKCS#8 DER of the user's signing key
    #[serde(with = "serde_bytes")]
    pub sign_key_der: Vec<u8>,
    /// Random master key; every other per-user secret derives from it
    pub master_key: RawKey,
}

/// A user's filename → capability map
#[derive(Serialize, Deserialize, Default)]
pub struct Namespace {
    pub files: BTreeMap<String, NamespaceEntry>,
}

/// One namespace binding: where the user's share node lives and the key
/// that opens it
#[derive(Serialize, Deserialize, Clone, Copy)]
pub struct NamespaceEntry {
    pub node: Handle,
    pub node_key: RawKey,
}

/// The cryptographic material a share node grants: the file header's
/// location and the file key everything under it derives from
#[derive(Serialize, Deserialize, Clone, Copy)]
pub struct FileRef {
    pub header: Handle,
    pub file_key: RawKey,
}

/// A sharer's bookkeeping for one direct recipient
#[derive(Serialize, Deserialize, Clone)]
pub struct ChildRef {
    pub username: String,
    /// The recipient's share node (created by the sharer)
    pub node: Handle,
    pub node_key: RawKey,
    /// The invite mailbox the recipient was notified through
    pub invite: Handle,
}

/// A node of a file's sharing tree.
///
/// Exactly one node per (user, filename); the owner's node roots the
/// tree. Nodes are self-contained: each carries the full [`FileRef`], so
/// reads never need an ancestor's keys.
#[derive(Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum ShareNode {
    Owner {
        file: FileRef,
        children: Vec<ChildRef>,
    },
    Recipient {
        /// The sharer's node, recorded for tree shape
        parent: Handle,
        file: FileRef,
        children: Vec<ChildRef>,
    },
}

impl ShareNode {
    /// The file material this node grants
    pub fn file(&self) -> &FileRef {
        match self {
            ShareNode::Owner { file, .. } => file,
            ShareNode::Recipient { file, .. } => file,
        }
    }

    /// Swap in a new file reference (revocation re-key)
    pub fn set_file(&mut self, new_file: FileRef) {
        match self {
            ShareNode::Owner { file, .. } => *file = new_file,
            ShareNode::Recipient { file, .. } => *file = new_file,
        }
    }

    /// This node's direct recipients
    pub fn children(&self) -> &[ChildRef] {
        match self {
            ShareNode::Owner { children, .. } => children,
            ShareNode::Recipient { children, .. } => children,
        }
    }

    /// Mutable access to the direct recipients
    pub fn children_mut(&mut self) -> &mut Vec<ChildRef> {
        match self {
            ShareNode::Owner { children, .. } => children,
            ShareNode::Recipient { children, .. } => children,
        }
    }

    /// Whether this is the owning node of its file
    pub fn is_owner(&self) -> bool {
        matches!(self, ShareNode::Owner { .. })
    }
}

/// File metadata; the commit point of every content mutation
#[derive(Serialize, Deserialize, Clone)]
pub struct FileHeader {
    pub owner: String,
    /// First chunk in file order
    pub head: Handle,
    /// Last chunk in file order; appends link backwards from here
    pub tail: Handle,
    pub chunk_count: u64,
}

/// One append's worth of content, chained backwards toward the head
#[derive(Serialize, Deserialize)]
pub struct Chunk {
    #[serde(with = "serde_bytes")]
    pub data: Vec<u8>,
    pub prev: Option<Handle>,
}

/// A sharing invite as stored in the recipient's mailbox.
///
/// Hybrid layout: RSA-OAEP can only carry a few dozen bytes, so the
/// payload rides under a fresh symmetric key and only that key is
/// wrapped asymmetrically. The signature covers the payload plaintext.
#[derive(Serialize, Deserialize)]
pub struct Invite {
    /// The invite key, encrypted to the recipient's public key
    #[serde(with = "serde_bytes")]
    pub key_ct: Vec<u8>,
    /// The encoded [`InvitePayload`], encrypted under the invite key
    #[serde(with = "serde_bytes")]
    pub payload_ct: Vec<u8>,
    /// The sender's signature over the payload plaintext
    #[serde(with = "serde_bytes")]
    pub signature: Vec<u8>,
}

/// What an invite actually grants, plus the context it is bound to.
///
/// The context fields stop an adversary from replaying an invite into a
/// different mailbox: the recipient checks all three against the call.
#[derive(Serialize, Deserialize)]
pub struct InvitePayload {
    pub filename: String,
    pub sender: String,
    pub recipient: String,
    /// The recipient's freshly created share node
    pub node: Handle,
    pub node_key: RawKey,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_share_node_roundtrip() {
        let node = ShareNode::Recipient {
            parent: Handle::random(),
            file: FileRef {
                header: Handle::random(),
                file_key: RawKey::from([9u8; RAW_KEY_SIZE]),
            },
            children: vec![ChildRef {
                username: "carol".into(),
                node: Handle::random(),
                node_key: RawKey::from([1u8; RAW_KEY_SIZE]),
                invite: Handle::random(),
            }],
        };
        let bytes = encode(&node).unwrap();
        let back: ShareNode = decode(&bytes).unwrap();
        assert!(!back.is_owner());
        assert_eq!(back.children().len(), 1);
        assert_eq!(back.file().file_key, RawKey::from([9u8; RAW_KEY_SIZE]));
    }

    #[test]
    fn test_handles_and_keys_encode_as_byte_strings() {
        // major type 2, one-byte head, 16 content bytes
        let loc = Handle::random();
        assert_eq!(encode(&loc).unwrap().len(), 17);
        let key = RawKey::generate();
        assert_eq!(encode(&key).unwrap().len(), 17);

        assert_eq!(decode::<Handle>(&encode(&loc).unwrap()).unwrap(), loc);
        assert_eq!(decode::<RawKey>(&encode(&key).unwrap()).unwrap(), key);

        // byte strings of the wrong length are rejected
        let short = serde_bytes::ByteBuf::from(vec![0u8; 15]);
        assert!(decode::<RawKey>(&encode(&short).unwrap()).is_err());
        assert!(decode::<Handle>(&encode(&short).unwrap()).is_err());
    }

    #[test]
    fn test_wrong_record_type_rejected() {
        let chunk = Chunk {
            data: b"contents".to_vec(),
            prev: None,
        };
        let bytes = encode(&chunk).unwrap();
        assert!(decode::<ShareNode>(&bytes).is_err());
        assert!(decode::<RootRecord>(&bytes).is_err());
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(decode::<Namespace>(b"").is_err());
        assert!(decode::<Namespace>(b"\xff\xff\xff").is_err());
    }

    #[test]
    fn test_namespace_roundtrip() {
        let mut ns = Namespace::default();
        ns.files.insert(
            "notes".into(),
            NamespaceEntry {
                node: Handle::random(),
                node_key: RawKey::from([2u8; RAW_KEY_SIZE]),
            },
        );
        let back: Namespace = decode(&encode(&ns).unwrap()).unwrap();
        assert!(back.files.contains_key("notes"));
        assert_eq!(back.files.len(), 1);
    }
}
