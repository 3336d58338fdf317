//! File layer: chunked, authenticated, append-only content
//!
//! A file is a sealed header plus a chain of sealed chunks, all keyed
//! from the per-file key carried in share nodes. Chunks link backwards
//! from the tail, so an append writes one chunk and reseals the header.
//! The header write is the commit point, and cost never depends on how
//! large the file already is.

use crate::records::{self, Chunk, FileHeader, FileRef, RawKey};
use crate::sharing::read_node;
use crate::{LockboxError, Result, User};
use lockbox_crypto::{MacKey, SymKey};
use lockbox_store::{Handle, SealedStore};
use std::collections::HashSet;

/// The sub-keys fanned out from a file key
pub(crate) struct FileKeys {
    pub header_enc: SymKey,
    pub header_mac: MacKey,
    pub chunk_enc: SymKey,
    pub chunk_mac: MacKey,
}

pub(crate) fn file_keys(file_key: &RawKey) -> FileKeys {
    FileKeys {
        header_enc: SymKey::derive(file_key.as_bytes(), "header-enc"),
        header_mac: MacKey::derive(file_key.as_bytes(), "header-mac"),
        chunk_enc: SymKey::derive(file_key.as_bytes(), "chunk-enc"),
        chunk_mac: MacKey::derive(file_key.as_bytes(), "chunk-mac"),
    }
}

/// A fully read and verified chunk chain
pub(crate) struct ChainContents {
    pub header: FileHeader,
    /// Chunk payloads in file order
    pub chunks: Vec<Vec<u8>>,
    /// Chunk handles in file order
    pub handles: Vec<Handle>,
}

impl ChainContents {
    /// Concatenate the chunks into the file's bytes
    pub fn into_bytes(self) -> Vec<u8> {
        let total = self.chunks.iter().map(Vec::len).sum();
        let mut out = Vec::with_capacity(total);
        for chunk in self.chunks {
            out.extend_from_slice(&chunk);
        }
        out
    }
}

/// Read and verify the whole chain behind `file`.
///
/// The walk is bounded by the header's chunk count and refuses to visit
/// a handle twice, so even a co-sharer abusing the file key cannot send
/// a reader into an unbounded traversal.
pub(crate) fn read_chain(sealed: &SealedStore, file: &FileRef) -> Result<ChainContents> {
    let keys = file_keys(&file.file_key);
    let header: FileHeader = records::decode(&sealed.get(
        file.header,
        &keys.header_enc,
        &keys.header_mac,
    )?)?;
    if header.chunk_count == 0 {
        return Err(LockboxError::Integrity("header claims an empty chunk chain".into()));
    }

    let mut chunks = Vec::new();
    let mut handles = Vec::new();
    let mut visited = HashSet::new();
    let mut cursor = Some(header.tail);
    let mut last = header.tail;

    while let Some(loc) = cursor {
        if chunks.len() as u64 == header.chunk_count {
            return Err(LockboxError::Integrity("chunk chain longer than header count".into()));
        }
        if !visited.insert(loc) {
            return Err(LockboxError::Integrity("cycle in chunk chain".into()));
        }
        let chunk: Chunk =
            records::decode(&sealed.get(loc, &keys.chunk_enc, &keys.chunk_mac)?)?;
        chunks.push(chunk.data);
        handles.push(loc);
        last = loc;
        cursor = chunk.prev;
    }

    if chunks.len() as u64 != header.chunk_count {
        return Err(LockboxError::Integrity("chunk chain shorter than header count".into()));
    }
    if last != header.head {
        return Err(LockboxError::Integrity("chunk chain does not end at the header's head".into()));
    }

    chunks.reverse();
    handles.reverse();
    Ok(ChainContents { header, chunks, handles })
}

/// Write `chunks` as a fresh chain at fresh handles and seal the header
/// over them. Replaces whatever chain the header previously described.
pub(crate) fn write_chain(
    sealed: &SealedStore,
    file: &FileRef,
    owner: &str,
    chunks: &[Vec<u8>],
) -> Result<()> {
    let keys = file_keys(&file.file_key);
    let mut iter = chunks.iter();
    let Some(first) = iter.next() else {
        return Err(LockboxError::Integrity("a file chain needs at least one chunk".into()));
    };

    let head = Handle::random();
    sealed.put(
        head,
        &keys.chunk_enc,
        &keys.chunk_mac,
        &records::encode(&Chunk { data: first.clone(), prev: None })?,
    );

    let mut tail = head;
    for data in iter {
        let loc = Handle::random();
        sealed.put(
            loc,
            &keys.chunk_enc,
            &keys.chunk_mac,
            &records::encode(&Chunk { data: data.clone(), prev: Some(tail) })?,
        );
        tail = loc;
    }

    let header = FileHeader {
        owner: owner.to_string(),
        head,
        tail,
        chunk_count: chunks.len() as u64,
    };
    sealed.put(
        file.header,
        &keys.header_enc,
        &keys.header_mac,
        &records::encode(&header)?,
    );
    Ok(())
}

impl User {
    /// Store `data` under `filename`, creating the file or overwriting
    /// its content.
    ///
    /// Overwriting keeps the file key and header location, so existing
    /// shares keep working and see the new content. A recipient's upload
    /// writes through their share node into the same shared file.
    pub fn upload_file(&self, filename: &str, data: &[u8]) -> Result<()> {
        tracing::debug!(user = %self.username, filename, bytes = data.len(), "upload");
        let (ns_keys, mut namespace) = self.load_namespace()?;

        if let Some(entry) = namespace.files.get(filename) {
            let node = read_node(&self.sealed, entry.node, &entry.node_key)?;
            let file = *node.file();
            // verify before touching anything, and learn the owner name
            let keys = file_keys(&file.file_key);
            let header: FileHeader = records::decode(&self.sealed.get(
                file.header,
                &keys.header_enc,
                &keys.header_mac,
            )?)?;
            return write_chain(&self.sealed, &file, &header.owner, &[data.to_vec()]);
        }

        let file = FileRef {
            header: Handle::random(),
            file_key: RawKey::generate(),
        };
        write_chain(&self.sealed, &file, &self.username, &[data.to_vec()])?;

        let node_key = RawKey::generate();
        let node_loc = Handle::random();
        crate::sharing::write_node(
            &self.sealed,
            node_loc,
            &node_key,
            &records::ShareNode::Owner { file, children: Vec::new() },
        )?;

        namespace
            .files
            .insert(filename.to_string(), records::NamespaceEntry { node: node_loc, node_key });
        self.store_namespace(&ns_keys, &namespace)
    }

    /// Fetch and verify the full content of `filename`
    pub fn download_file(&self, filename: &str) -> Result<Vec<u8>> {
        tracing::debug!(user = %self.username, filename, "download");
        let (_, namespace) = self.load_namespace()?;
        let entry = namespace
            .files
            .get(filename)
            .ok_or_else(|| LockboxError::FileNotFound(filename.to_string()))?;
        let node = read_node(&self.sealed, entry.node, &entry.node_key)?;
        Ok(read_chain(&self.sealed, node.file())?.into_bytes())
    }

    /// Append `data` to `filename` without rewriting existing content
    pub fn append_file(&self, filename: &str, data: &[u8]) -> Result<()> {
        tracing::debug!(user = %self.username, filename, bytes = data.len(), "append");
        let (_, namespace) = self.load_namespace()?;
        let entry = namespace
            .files
            .get(filename)
            .ok_or_else(|| LockboxError::FileNotFound(filename.to_string()))?;
        let node = read_node(&self.sealed, entry.node, &entry.node_key)?;
        let file = node.file();
        let keys = file_keys(&file.file_key);

        let mut header: FileHeader = records::decode(&self.sealed.get(
            file.header,
            &keys.header_enc,
            &keys.header_mac,
        )?)?;

        let loc = Handle::random();
        sealed_chunk(&self.sealed, &keys, loc, data, Some(header.tail))?;

        header.tail = loc;
        header.chunk_count += 1;
        self.sealed.put(
            file.header,
            &keys.header_enc,
            &keys.header_mac,
            &records::encode(&header)?,
        );
        Ok(())
    }
}

fn sealed_chunk(
    sealed: &SealedStore,
    keys: &FileKeys,
    loc: Handle,
    data: &[u8],
    prev: Option<Handle>,
) -> Result<()> {
    sealed.put(
        loc,
        &keys.chunk_enc,
        &keys.chunk_mac,
        &records::encode(&Chunk { data: data.to_vec(), prev })?,
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lockbox_store::DataServer;

    fn file() -> (SealedStore, FileRef) {
        (
            SealedStore::new(DataServer::new()),
            FileRef {
                header: Handle::random(),
                file_key: RawKey::generate(),
            },
        )
    }

    #[test]
    fn test_chain_roundtrip() {
        let (sealed, file_ref) = file();
        let chunks = vec![b"one".to_vec(), b"two".to_vec(), b"three".to_vec()];
        write_chain(&sealed, &file_ref, "alice", &chunks).unwrap();

        let contents = read_chain(&sealed, &file_ref).unwrap();
        assert_eq!(contents.header.owner, "alice");
        assert_eq!(contents.header.chunk_count, 3);
        assert_eq!(contents.chunks, chunks);
        assert_eq!(contents.into_bytes(), b"onetwothree");
    }

    #[test]
    fn test_single_empty_chunk() {
        let (sealed, file_ref) = file();
        write_chain(&sealed, &file_ref, "alice", &[Vec::new()]).unwrap();
        assert_eq!(read_chain(&sealed, &file_ref).unwrap().into_bytes(), b"");
    }

    #[test]
    fn test_empty_chain_rejected() {
        let (sealed, file_ref) = file();
        assert!(write_chain(&sealed, &file_ref, "alice", &[]).is_err());
    }

    #[test]
    fn test_missing_chunk_detected() {
        let (sealed, file_ref) = file();
        write_chain(
            &sealed,
            &file_ref,
            "alice",
            &[b"a".to_vec(), b"b".to_vec()],
        )
        .unwrap();

        let contents = read_chain(&sealed, &file_ref).unwrap();
        sealed.delete(contents.handles[0]);
        assert!(read_chain(&sealed, &file_ref).is_err());
    }

    #[test]
    fn test_wrong_file_key_detected() {
        let (sealed, file_ref) = file();
        write_chain(&sealed, &file_ref, "alice", &[b"data".to_vec()]).unwrap();

        let wrong = FileRef {
            header: file_ref.header,
            file_key: RawKey::generate(),
        };
        assert!(read_chain(&sealed, &wrong).is_err());
    }
}
