//! End-to-end tests for the login gate over a real Store.

#![allow(clippy::unwrap_used)] // Test code

mod support;

use std::sync::Arc;
use support::ScriptedApi;
use todo_sync_testing::InMemoryKeyValueStore;
use todos::auth::AUTH_KEY;
use todos::{AuthError, AuthState};

#[tokio::test]
async fn login_persists_session_for_next_start() {
    let store = InMemoryKeyValueStore::new();
    let api = Arc::new(ScriptedApi::default());
    let app = support::app(&store, &api);

    let user = app.login("user", "password").await.unwrap();

    assert_eq!(user.username, "user");
    assert_eq!(user.email, "user@example.com");
    let session = app.auth().await;
    assert!(session.is_authenticated);
    assert_eq!(session.token.as_deref(), Some("mock-jwt-token"));
    assert!(store.contains_key(AUTH_KEY));

    let restarted = support::app(&store, &api);
    assert_eq!(restarted.auth().await, AuthState::default());
    let restored = restarted.initialize_auth().await.unwrap();
    assert_eq!(restored, session);
    assert_eq!(restarted.auth().await, session);
}

#[tokio::test]
async fn wrong_password_is_rejected() {
    let store = InMemoryKeyValueStore::new();
    let api = Arc::new(ScriptedApi::default());
    let app = support::app(&store, &api);

    let error = app.login("user", "letmein").await.unwrap_err();

    assert_eq!(error, AuthError::InvalidCredentials);
    assert!(!app.auth().await.is_authenticated);
    assert!(!store.contains_key(AUTH_KEY));
}

#[tokio::test]
async fn logout_clears_session_and_record() {
    let store = InMemoryKeyValueStore::new();
    let api = Arc::new(ScriptedApi::default());
    let app = support::app(&store, &api);
    app.login("user", "password").await.unwrap();

    app.logout().await.unwrap();

    assert_eq!(app.auth().await, AuthState::default());
    assert!(!store.contains_key(AUTH_KEY));

    let restarted = support::app(&store, &api);
    assert_eq!(restarted.initialize_auth().await.unwrap(), AuthState::default());
}

#[tokio::test]
async fn initialize_without_record_stays_signed_out() {
    let store = InMemoryKeyValueStore::new();
    let api = Arc::new(ScriptedApi::default());
    let app = support::app(&store, &api);

    assert_eq!(app.initialize_auth().await.unwrap(), AuthState::default());
}

#[tokio::test]
async fn unreadable_record_falls_back_to_signed_out() {
    let store = InMemoryKeyValueStore::new();
    store.insert_raw(AUTH_KEY, "{ definitely not a session");
    let api = Arc::new(ScriptedApi::default());
    let app = support::app(&store, &api);

    assert_eq!(app.initialize_auth().await.unwrap(), AuthState::default());
    assert!(!app.auth().await.is_authenticated);
}

#[tokio::test]
async fn storage_failure_does_not_block_login() {
    let store = InMemoryKeyValueStore::new();
    store.fail_writes(true);
    let api = Arc::new(ScriptedApi::default());
    let app = support::app(&store, &api);

    app.login("user", "password").await.unwrap();

    assert!(app.auth().await.is_authenticated);
    assert!(!store.contains_key(AUTH_KEY));
}
