//! Identity layer: password-rooted key hierarchies, registration, login
//!
//! Everything a user owns hangs off two secrets:
//!
//! - the **root key**, derived from `(username, password)` with PBKDF2;
//!   it locates and opens the root record, nothing else
//! - the **master key**, drawn at random at registration and stored in
//!   the root record; every other per-user key derives from it
//!
//! Splitting the two means a password change would only ever re-seal the
//! root record, never re-key the user's data.

use crate::records::{self, Namespace, RawKey, RootRecord};
use crate::{LockboxError, Result};
use lockbox_crypto::{
    kdf, EncryptionKeyPair, EncryptionPrivateKey, MacKey, SigningKey, SigningKeyPair, SymKey,
    VerifyingKey,
};
use lockbox_store::{Handle, KeyServer, SealedStore};

/// Key directory name for a user's encryption key
pub(crate) fn enc_key_name(username: &str) -> String {
    format!("{username}/enc")
}

/// Key directory name for a user's signature-verification key
pub(crate) fn verify_key_name(username: &str) -> String {
    format!("{username}/verify")
}

/// Location and keys of a user's root record, derived from credentials
pub(crate) struct RootKeys {
    pub loc: Handle,
    pub enc: SymKey,
    pub mac: MacKey,
}

pub(crate) fn root_keys(username: &str, password: &str) -> RootKeys {
    let salt = kdf::user_salt(username);
    let root = kdf::password_kdf(password, &salt);
    let loc_key = MacKey::derive(&root, "root-loc");
    RootKeys {
        loc: Handle::derive(&loc_key, b"root"),
        enc: SymKey::derive(&root, "root-enc"),
        mac: MacKey::derive(&root, "root-mac"),
    }
}

/// Location and keys of a user's namespace record, derived from the
/// master key
pub(crate) struct NamespaceKeys {
    pub loc: Handle,
    pub enc: SymKey,
    pub mac: MacKey,
}

pub(crate) fn namespace_keys(master: &RawKey) -> NamespaceKeys {
    let enc = SymKey::derive(master.as_bytes(), "namespace-enc");
    let mac = MacKey::derive(master.as_bytes(), "namespace-mac");
    let loc = Handle::derive(&mac, b"namespace");
    NamespaceKeys { loc, enc, mac }
}

/// The in-memory secrets of an authenticated user
pub(crate) struct Session {
    pub username: String,
    pub enc_private: EncryptionPrivateKey,
    pub signing: SigningKey,
    /// DER of the user's own verification key, as published in the
    /// directory; also keys the user's invite mailboxes
    pub verify_der: Vec<u8>,
    pub master: RawKey,
}

/// Register a new user: publish public keys, lay down the root record
/// and an empty namespace.
pub(crate) fn register(
    sealed: &SealedStore,
    directory: &KeyServer,
    username: &str,
    password: &str,
) -> Result<Session> {
    if username.is_empty() {
        return Err(LockboxError::BadArgument("username must not be empty".into()));
    }
    if password.is_empty() {
        return Err(LockboxError::BadArgument("password must not be empty".into()));
    }
    if directory.contains(&enc_key_name(username)) {
        return Err(LockboxError::UserExists(username.to_string()));
    }

    let enc_pair = EncryptionKeyPair::generate()?;
    let sign_pair = SigningKeyPair::generate()?;
    let verify_der = sign_pair.verifying_key().to_der()?;

    // the directory's one-shot writes arbitrate duplicate registration
    directory
        .set(&enc_key_name(username), enc_pair.public_key().to_der()?)
        .map_err(|_| LockboxError::UserExists(username.to_string()))?;
    directory
        .set(&verify_key_name(username), verify_der.clone())
        .map_err(|_| LockboxError::UserExists(username.to_string()))?;

    let master = RawKey::generate();
    let (_, enc_private) = enc_pair.into_keys();
    let (signing, _) = sign_pair.into_keys();

    let root = RootRecord {
        enc_key_der: enc_private.to_der()?,
        sign_key_der: signing.to_der()?,
        master_key: master,
    };
    let keys = root_keys(username, password);
    sealed.put(keys.loc, &keys.enc, &keys.mac, &records::encode(&root)?);

    let ns_keys = namespace_keys(&master);
    sealed.put(
        ns_keys.loc,
        &ns_keys.enc,
        &ns_keys.mac,
        &records::encode(&Namespace::default())?,
    );

    Ok(Session {
        username: username.to_string(),
        enc_private,
        signing,
        verify_der,
        master,
    })
}

/// Recover a user's secrets from their credentials.
///
/// Every failure (wrong password, unknown user, missing or corrupted
/// root record) collapses to [`LockboxError::AuthFailed`] so a caller
/// cannot probe which one it was.
pub(crate) fn authenticate(
    sealed: &SealedStore,
    directory: &KeyServer,
    username: &str,
    password: &str,
) -> Result<Session> {
    let keys = root_keys(username, password);
    let bytes = sealed
        .get(keys.loc, &keys.enc, &keys.mac)
        .map_err(|_| LockboxError::AuthFailed)?;
    let root: RootRecord = records::decode(&bytes).map_err(|_| LockboxError::AuthFailed)?;

    let enc_private =
        EncryptionPrivateKey::from_der(&root.enc_key_der).map_err(|_| LockboxError::AuthFailed)?;
    let signing =
        SigningKey::from_der(&root.sign_key_der).map_err(|_| LockboxError::AuthFailed)?;

    let verify_der = directory
        .get(&verify_key_name(username))
        .ok_or(LockboxError::AuthFailed)?;
    // the directory is trusted, but an unparsable key still ends the login
    VerifyingKey::from_der(&verify_der).map_err(|_| LockboxError::AuthFailed)?;

    Ok(Session {
        username: username.to_string(),
        enc_private,
        signing,
        verify_der: verify_der.to_vec(),
        master: root.master_key,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use lockbox_store::DataServer;

    fn servers() -> (SealedStore, KeyServer) {
        (SealedStore::new(DataServer::new()), KeyServer::new())
    }

    #[test]
    fn test_register_then_authenticate() {
        let (sealed, directory) = servers();
        let created = register(&sealed, &directory, "alice", "hunter2").unwrap();
        let authed = authenticate(&sealed, &directory, "alice", "hunter2").unwrap();
        assert_eq!(created.master, authed.master);
        assert_eq!(created.verify_der, authed.verify_der);
    }

    #[test]
    fn test_wrong_password_rejected() {
        let (sealed, directory) = servers();
        register(&sealed, &directory, "alice", "hunter2").unwrap();
        assert!(matches!(
            authenticate(&sealed, &directory, "alice", "hunter3"),
            Err(LockboxError::AuthFailed)
        ));
    }

    #[test]
    fn test_unknown_user_rejected() {
        let (sealed, directory) = servers();
        assert!(matches!(
            authenticate(&sealed, &directory, "nobody", "pw"),
            Err(LockboxError::AuthFailed)
        ));
    }

    #[test]
    fn test_empty_credentials_rejected() {
        let (sealed, directory) = servers();
        assert!(matches!(
            register(&sealed, &directory, "", "pw"),
            Err(LockboxError::BadArgument(_))
        ));
        assert!(matches!(
            register(&sealed, &directory, "alice", ""),
            Err(LockboxError::BadArgument(_))
        ));
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let (sealed, directory) = servers();
        register(&sealed, &directory, "alice", "pw").unwrap();
        assert!(matches!(
            register(&sealed, &directory, "alice", "other"),
            Err(LockboxError::UserExists(_))
        ));
    }

    #[test]
    fn test_root_keys_differ_per_user_and_password() {
        let a = root_keys("alice", "pw");
        let b = root_keys("bob", "pw");
        let c = root_keys("alice", "pw2");
        assert_ne!(a.loc, b.loc);
        assert_ne!(a.loc, c.loc);
    }
}
