//! Account lifecycle: registration, login, and namespace isolation

use lockbox_client::{Client, LockboxError};
use lockbox_store::{DataServer, KeyServer};

fn client() -> Client {
    // RUST_LOG-driven operation logs for failing runs
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
    Client::new(DataServer::new(), KeyServer::new())
}

#[test]
fn test_create_then_authenticate() {
    let client = client();
    client.create_user("alice", "pw1").unwrap();

    assert!(matches!(
        client.authenticate_user("alice", "pw2"),
        Err(LockboxError::AuthFailed)
    ));

    let alice = client.authenticate_user("alice", "pw1").unwrap();
    assert_eq!(alice.username(), "alice");
}

#[test]
fn test_empty_credentials_rejected() {
    let client = client();
    assert!(matches!(
        client.create_user("", "pw"),
        Err(LockboxError::BadArgument(_))
    ));
    assert!(matches!(
        client.create_user("alice", ""),
        Err(LockboxError::BadArgument(_))
    ));
}

#[test]
fn test_duplicate_username_rejected() {
    let client = client();
    client.create_user("alice", "pw").unwrap();
    assert!(matches!(
        client.create_user("alice", "different pw"),
        Err(LockboxError::UserExists(_))
    ));
    // the original registration still works
    client.authenticate_user("alice", "pw").unwrap();
}

#[test]
fn test_unknown_user_cannot_authenticate() {
    let client = client();
    assert!(client.authenticate_user("nobody", "pw").is_err());
}

#[test]
fn test_sessions_share_state() {
    let client = client();
    let first = client.create_user("alice", "pw").unwrap();
    first.upload_file("notes", b"from the first session").unwrap();

    // a later login sees everything the earlier session wrote
    let second = client.authenticate_user("alice", "pw").unwrap();
    assert_eq!(
        second.download_file("notes").unwrap(),
        b"from the first session"
    );

    second.append_file("notes", b", and more").unwrap();
    assert_eq!(
        first.download_file("notes").unwrap(),
        b"from the first session, and more"
    );
}

#[test]
fn test_same_filename_different_users_are_independent() {
    let client = client();
    let alice = client.create_user("alice", "pw").unwrap();
    let bob = client.create_user("bob", "pw").unwrap();

    alice.upload_file("notes", b"alice's notes").unwrap();
    bob.upload_file("notes", b"bob's notes").unwrap();

    assert_eq!(alice.download_file("notes").unwrap(), b"alice's notes");
    assert_eq!(bob.download_file("notes").unwrap(), b"bob's notes");

    // mutating one user's file leaves the other's untouched
    alice.upload_file("notes", b"rewritten").unwrap();
    alice.append_file("notes", b" twice").unwrap();
    assert_eq!(bob.download_file("notes").unwrap(), b"bob's notes");
}

#[test]
fn test_same_password_different_users_are_independent() {
    let client = client();
    let alice = client.create_user("alice", "shared password").unwrap();
    client.create_user("bob", "shared password").unwrap();

    alice.upload_file("secret", b"alice only").unwrap();

    let bob = client.authenticate_user("bob", "shared password").unwrap();
    assert!(matches!(
        bob.download_file("secret"),
        Err(LockboxError::FileNotFound(_))
    ));
}
