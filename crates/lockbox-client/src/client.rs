//! The client facade: [`Client`] binds a dataserver and key directory;
//! [`User`] is a live, authenticated session handle.

use crate::identity::{self, NamespaceKeys, Session};
use crate::records::{self, Namespace, RawKey};
use crate::Result;
use lockbox_crypto::{EncryptionPrivateKey, SigningKey};
use lockbox_store::{DataServer, KeyServer, SealedStore};

/// A Lockbox client bound to a dataserver and a key directory
#[derive(Clone)]
pub struct Client {
    data: DataServer,
    directory: KeyServer,
}

impl Client {
    /// Bind a client to its servers
    pub fn new(data: DataServer, directory: KeyServer) -> Self {
        Self { data, directory }
    }

    /// Register a new user and return a live session.
    ///
    /// Fails on empty credentials or a taken username.
    pub fn create_user(&self, username: &str, password: &str) -> Result<User> {
        tracing::debug!(username, "creating user");
        let sealed = SealedStore::new(self.data.clone());
        let session = identity::register(&sealed, &self.directory, username, password)?;
        Ok(User::new(session, sealed, self.directory.clone()))
    }

    /// Log an existing user in and return a live session.
    ///
    /// Wrong password, unknown user, and a tampered root record are
    /// indistinguishable: all fail the same way.
    pub fn authenticate_user(&self, username: &str, password: &str) -> Result<User> {
        tracing::debug!(username, "authenticating user");
        let sealed = SealedStore::new(self.data.clone());
        let session = identity::authenticate(&sealed, &self.directory, username, password)?;
        Ok(User::new(session, sealed, self.directory.clone()))
    }
}

/// An authenticated user session.
///
/// Holds the user's secrets in memory and nothing else: every operation
/// re-fetches and re-verifies the records it touches, so a session never
/// goes stale and a tampered store is caught on next use.
pub struct User {
    pub(crate) username: String,
    pub(crate) enc_private: EncryptionPrivateKey,
    pub(crate) signing: SigningKey,
    pub(crate) verify_der: Vec<u8>,
    pub(crate) master: RawKey,
    pub(crate) sealed: SealedStore,
    pub(crate) directory: KeyServer,
}

impl User {
    fn new(session: Session, sealed: SealedStore, directory: KeyServer) -> Self {
        Self {
            username: session.username,
            enc_private: session.enc_private,
            signing: session.signing,
            verify_der: session.verify_der,
            master: session.master,
            sealed,
            directory,
        }
    }

    /// The username this session authenticated as
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Fetch and verify the caller's namespace record
    pub(crate) fn load_namespace(&self) -> Result<(NamespaceKeys, Namespace)> {
        let keys = identity::namespace_keys(&self.master);
        let bytes = self.sealed.get(keys.loc, &keys.enc, &keys.mac)?;
        Ok((keys, records::decode(&bytes)?))
    }

    /// Re-seal the caller's namespace record
    pub(crate) fn store_namespace(&self, keys: &NamespaceKeys, namespace: &Namespace) -> Result<()> {
        self.sealed
            .put(keys.loc, &keys.enc, &keys.mac, &records::encode(namespace)?);
        Ok(())
    }
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("username", &self.username)
            .field("secrets", &"[REDACTED]")
            .finish()
    }
}
