//! Sharing layer: invites, the capability tree, and revocation
//!
//! Every (user, filename) pair with access to a file owns one share
//! node; the owner's node roots the tree and records its direct
//! children. Sharing creates the recipient's node up front and delivers
//! its location and key through a signed, recipient-encrypted invite
//! dropped in a deterministic mailbox. Revocation rotates the file key,
//! rewrites every surviving node in place, and deletes the revoked
//! subtree, leaving revoked holders with records their keys no longer
//! open.

use crate::files::{read_chain, write_chain};
use crate::records::{
    self, ChildRef, FileRef, Invite, InvitePayload, NamespaceEntry, RawKey, ShareNode,
};
use crate::{LockboxError, Result, User};
use lockbox_crypto::{hashing, symmetric, EncryptionPublicKey, MacKey, SymKey, VerifyingKey};
use lockbox_store::{Handle, SealedStore};
use std::collections::HashSet;

/// Fan a node key out into the node's envelope keys
fn node_keys(node_key: &RawKey) -> (SymKey, MacKey) {
    (
        SymKey::derive(node_key.as_bytes(), "node-enc"),
        MacKey::derive(node_key.as_bytes(), "node-mac"),
    )
}

/// Fetch and verify a share node
pub(crate) fn read_node(sealed: &SealedStore, loc: Handle, node_key: &RawKey) -> Result<ShareNode> {
    let (enc, mac) = node_keys(node_key);
    records::decode(&sealed.get(loc, &enc, &mac)?)
}

/// Seal a share node at `loc`
pub(crate) fn write_node(
    sealed: &SealedStore,
    loc: Handle,
    node_key: &RawKey,
    node: &ShareNode,
) -> Result<()> {
    let (enc, mac) = node_keys(node_key);
    sealed.put(loc, &enc, &mac, &records::encode(node)?);
    Ok(())
}

/// The deterministic mailbox for an invite.
///
/// Keyed by a digest of the recipient's published verification key and
/// labeled with the full share context, so both endpoints can compute it
/// and different shares never collide. The location carries no secrets;
/// the invite inside is encrypted and signed.
fn mailbox_handle(recipient_verify_der: &[u8], sender: &str, filename: &str, recipient: &str) -> Handle {
    let digest = hashing::sha512(recipient_verify_der);
    let key = MacKey::derive(&digest[..16], "mailbox");
    let label = format!("{sender}:{filename}:{recipient}");
    Handle::derive(&key, label.as_bytes())
}

/// Purpose string for the symmetric half of an invite
const INVITE_ENC_PURPOSE: &str = "invite-enc";

impl User {
    /// Grant `recipient` access to `filename`.
    ///
    /// Any current holder may share onward; the new node hangs off the
    /// caller's own. Sharing again with the same recipient re-issues the
    /// invite for the existing node instead of growing the tree.
    pub fn share_file(&self, filename: &str, recipient: &str) -> Result<()> {
        tracing::debug!(user = %self.username, filename, recipient, "share");
        if recipient == self.username {
            return Err(LockboxError::BadArgument("cannot share a file with yourself".into()));
        }

        let (_, namespace) = self.load_namespace()?;
        let entry = namespace
            .files
            .get(filename)
            .ok_or_else(|| LockboxError::FileNotFound(filename.to_string()))?;
        let mut node = read_node(&self.sealed, entry.node, &entry.node_key)?;

        let recipient_enc_der = self
            .directory
            .get(&crate::identity::enc_key_name(recipient))
            .ok_or_else(|| LockboxError::UnknownUser(recipient.to_string()))?;
        let recipient_enc = EncryptionPublicKey::from_der(&recipient_enc_der)?;
        let recipient_verify_der = self
            .directory
            .get(&crate::identity::verify_key_name(recipient))
            .ok_or_else(|| LockboxError::UnknownUser(recipient.to_string()))?;

        // reuse the existing child node on a repeated share
        let (child_loc, child_key) = match node
            .children()
            .iter()
            .find(|child| child.username == recipient)
        {
            Some(existing) => (existing.node, existing.node_key),
            None => {
                let child_key = RawKey::generate();
                let child_loc = Handle::random();
                write_node(
                    &self.sealed,
                    child_loc,
                    &child_key,
                    &ShareNode::Recipient {
                        parent: entry.node,
                        file: *node.file(),
                        children: Vec::new(),
                    },
                )?;
                (child_loc, child_key)
            }
        };

        let mailbox = mailbox_handle(&recipient_verify_der, &self.username, filename, recipient);
        let invite = self.seal_invite(
            &recipient_enc,
            InvitePayload {
                filename: filename.to_string(),
                sender: self.username.clone(),
                recipient: recipient.to_string(),
                node: child_loc,
                node_key: child_key,
            },
        )?;
        self.sealed.raw().set(mailbox, records::encode(&invite)?);

        if !node.children().iter().any(|child| child.username == recipient) {
            node.children_mut().push(ChildRef {
                username: recipient.to_string(),
                node: child_loc,
                node_key: child_key,
                invite: mailbox,
            });
            write_node(&self.sealed, entry.node, &entry.node_key, &node)?;
        }
        Ok(())
    }

    /// Accept the share of `filename` offered by `sender`
    pub fn receive_file(&self, filename: &str, sender: &str) -> Result<()> {
        tracing::debug!(user = %self.username, filename, sender, "receive");
        let (ns_keys, mut namespace) = self.load_namespace()?;
        if let Some(existing) = namespace.files.get(filename) {
            // a binding that still authenticates blocks the name; one
            // killed by revocation may be replaced by a fresh invite
            if read_node(&self.sealed, existing.node, &existing.node_key).is_ok() {
                return Err(LockboxError::NameTaken(filename.to_string()));
            }
        }

        let sender_verify_der = self
            .directory
            .get(&crate::identity::verify_key_name(sender))
            .ok_or_else(|| LockboxError::UnknownUser(sender.to_string()))?;
        let sender_verify = VerifyingKey::from_der(&sender_verify_der)?;

        let mailbox = mailbox_handle(&self.verify_der, sender, filename, &self.username);
        let invite_bytes = self
            .sealed
            .raw()
            .get(mailbox)
            .ok_or_else(|| LockboxError::Integrity(format!("no invite from {sender} for {filename}")))?;
        let payload = self.open_invite(&invite_bytes, &sender_verify)?;

        if payload.sender != sender
            || payload.recipient != self.username
            || payload.filename != filename
        {
            return Err(LockboxError::Integrity("invite bound to a different share".into()));
        }

        // the granted capability must actually work before we bind it
        let node = read_node(&self.sealed, payload.node, &payload.node_key)?;
        if node.is_owner() {
            return Err(LockboxError::Integrity("invite grants an owner node".into()));
        }

        namespace.files.insert(
            filename.to_string(),
            NamespaceEntry { node: payload.node, node_key: payload.node_key },
        );
        self.store_namespace(&ns_keys, &namespace)?;

        // invites are one-shot
        self.sealed.raw().delete(mailbox);
        Ok(())
    }

    /// Withdraw `old_recipient`'s access to `filename`, and with it the
    /// access of everyone they shared onward to.
    ///
    /// Owner-only, and only for direct recipients; deeper descendants
    /// are revoked by revoking the direct child above them. The file is
    /// re-keyed, surviving nodes are rewritten in place under the new
    /// key, and the revoked subtree is deleted.
    pub fn revoke_file(&self, filename: &str, old_recipient: &str) -> Result<()> {
        tracing::debug!(user = %self.username, filename, old_recipient, "revoke");
        let (_, namespace) = self.load_namespace()?;
        let entry = namespace
            .files
            .get(filename)
            .ok_or_else(|| LockboxError::FileNotFound(filename.to_string()))?;
        let node = read_node(&self.sealed, entry.node, &entry.node_key)?;
        let ShareNode::Owner { file, children } = node else {
            return Err(LockboxError::NotOwner);
        };

        let revoked = children
            .iter()
            .find(|child| child.username == old_recipient)
            .cloned()
            .ok_or_else(|| LockboxError::NotSharedWith(old_recipient.to_string()))?;
        let survivors: Vec<ChildRef> = children
            .iter()
            .filter(|child| child.username != old_recipient)
            .cloned()
            .collect();

        // read phase: verify everything the rewrite depends on before
        // mutating a single record
        let contents = read_chain(&self.sealed, &file)?;
        let surviving_nodes = collect_subtree(&self.sealed, &survivors)?;

        // write phase: fresh key and content first, then flip the nodes
        let new_file = FileRef {
            header: Handle::random(),
            file_key: RawKey::generate(),
        };
        write_chain(&self.sealed, &new_file, &contents.header.owner, &contents.chunks)?;

        for (loc, node_key, mut survivor) in surviving_nodes {
            survivor.set_file(new_file);
            write_node(&self.sealed, loc, &node_key, &survivor)?;
        }

        write_node(
            &self.sealed,
            entry.node,
            &entry.node_key,
            &ShareNode::Owner { file: new_file, children: survivors },
        )?;

        // hygiene: drop everything the revoked subtree could still name.
        // Security does not depend on this; their keys are dead either way.
        self.delete_subtree(&revoked);
        self.sealed.delete(file.header);
        for &loc in &contents.handles {
            self.sealed.delete(loc);
        }
        Ok(())
    }

    /// Build the hybrid invite record: payload under a fresh symmetric
    /// key, that key under the recipient's public key, signature over
    /// the payload plaintext.
    fn seal_invite(&self, recipient_enc: &EncryptionPublicKey, payload: InvitePayload) -> Result<Invite> {
        let payload_bytes = records::encode(&payload)?;
        let invite_key = RawKey::generate();
        Ok(Invite {
            key_ct: recipient_enc.encrypt(invite_key.as_bytes())?,
            payload_ct: symmetric::encrypt(
                &SymKey::derive(invite_key.as_bytes(), INVITE_ENC_PURPOSE),
                &payload_bytes,
            ),
            signature: self.signing.sign(&payload_bytes)?,
        })
    }

    /// Decrypt and authenticate an invite record
    fn open_invite(&self, invite_bytes: &[u8], sender_verify: &VerifyingKey) -> Result<InvitePayload> {
        let invite: Invite = records::decode(invite_bytes)?;
        let invite_key = self.enc_private.decrypt(&invite.key_ct)?;
        let payload_bytes = symmetric::decrypt(
            &SymKey::derive(&invite_key, INVITE_ENC_PURPOSE),
            &invite.payload_ct,
        )?;
        sender_verify.verify(&payload_bytes, &invite.signature)?;
        records::decode(&payload_bytes)
    }

    /// Best-effort deletion of a revoked subtree's nodes and invites.
    /// Tolerates nodes the holder has garbled; refuses to loop.
    fn delete_subtree(&self, root: &ChildRef) {
        let mut visited: HashSet<Handle> = HashSet::new();
        let mut stack = vec![root.clone()];
        while let Some(child) = stack.pop() {
            if !visited.insert(child.node) {
                continue;
            }
            if let Ok(node) = read_node(&self.sealed, child.node, &child.node_key) {
                stack.extend(node.children().iter().cloned());
            }
            self.sealed.delete(child.node);
            self.sealed.raw().delete(child.invite);
        }
    }
}

/// Read and verify every node in the subtrees rooted at `roots`,
/// depth-first. Fails if any surviving holder's record does not
/// authenticate; refuses cyclic child lists.
fn collect_subtree(
    sealed: &SealedStore,
    roots: &[ChildRef],
) -> Result<Vec<(Handle, RawKey, ShareNode)>> {
    let mut out = Vec::new();
    let mut visited: HashSet<Handle> = HashSet::new();
    let mut stack: Vec<ChildRef> = roots.to_vec();
    while let Some(child) = stack.pop() {
        if !visited.insert(child.node) {
            return Err(LockboxError::Integrity("cycle in sharing tree".into()));
        }
        let node = read_node(sealed, child.node, &child.node_key)?;
        stack.extend(node.children().iter().cloned());
        out.push((child.node, child.node_key, node));
    }
    Ok(out)
}
