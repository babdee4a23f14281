//! Account flows against a stub hosted auth service.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use axum::http::StatusCode;
use secrecy::SecretString;

use marketplace_integration_tests::{API_KEY, AuthStub, CATALOG, config, spawn_catalog};
use marketplace_storefront::forms::{LoginForm, RegisterForm, ValidationError};
use marketplace_storefront::services::auth::AuthError;
use marketplace_storefront::storage::{KeyValueStore, MemoryStore, keys};
use marketplace_storefront::{AppError, Storefront};

struct Harness {
    session: Storefront,
    store: MemoryStore,
    _dir: tempfile::TempDir,
}

async fn harness(stub: &AuthStub) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let catalog = spawn_catalog(StatusCode::OK, CATALOG).await;
    let auth = stub.spawn().await;
    let store = MemoryStore::new();
    let session = Storefront::with_store(
        config(dir.path(), catalog, Some(auth)),
        Arc::new(store.clone()),
    )
    .unwrap();
    Harness {
        session,
        store,
        _dir: dir,
    }
}

fn login_form(email: &str, password: &str) -> LoginForm {
    LoginForm {
        email: email.to_string(),
        password: SecretString::from(password.to_string()),
    }
}

fn register_form(email: &str) -> RegisterForm {
    RegisterForm {
        name: "Kofi Mensah".to_string(),
        email: email.to_string(),
        password: SecretString::from("pa55word".to_string()),
        confirm_password: SecretString::from("pa55word".to_string()),
        location: "Accra, Ghana".to_string(),
    }
}

fn ama() -> AuthStub {
    AuthStub::default().with_account("Ama Owusu", "ama@example.com", "hunter22", "Kumasi, Ghana")
}

#[tokio::test]
async fn test_login_stores_profile() {
    let stub = ama();
    let mut h = harness(&stub).await;

    let account = h
        .session
        .login(login_form("ama@example.com", "hunter22"))
        .await
        .unwrap();
    assert_eq!(account.name, "Ama Owusu");
    assert_eq!(account.location, "Kumasi, Ghana");

    let stored: serde_json::Value =
        serde_json::from_str(&h.store.get(keys::USER).unwrap().unwrap()).unwrap();
    assert_eq!(
        stored,
        serde_json::json!({
            "name": "Ama Owusu",
            "email": "ama@example.com",
            "location": "Kumasi, Ghana",
            "isAuthenticated": true
        })
    );
    assert_eq!(stub.api_keys(), [API_KEY]);
}

#[tokio::test]
async fn test_wrong_password_is_rejected() {
    let stub = ama();
    let mut h = harness(&stub).await;

    let err = h
        .session
        .login(login_form("ama@example.com", "hunter23"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Auth(AuthError::InvalidCredentials)));
    assert_eq!(err.user_message(), "Invalid credentials");
    assert!(h.session.current_user().is_none());
    assert!(h.store.get(keys::USER).unwrap().is_none());
}

#[tokio::test]
async fn test_invalid_form_is_not_sent() {
    let stub = ama();
    let mut h = harness(&stub).await;

    let err = h
        .session
        .login(login_form("ama@example.com", ""))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::Auth(AuthError::Validation(ValidationError::MissingFields))
    ));
    assert!(stub.calls().is_empty());
}

#[tokio::test]
async fn test_register_then_login() {
    let stub = AuthStub::default();
    let mut h = harness(&stub).await;

    let email = h
        .session
        .register(register_form("kofi@example.com"))
        .await
        .unwrap();
    assert_eq!(email.as_str(), "kofi@example.com");
    assert!(stub.has_account("kofi@example.com"));
    assert!(h.session.current_user().is_none());

    h.session
        .login(login_form("kofi@example.com", "pa55word"))
        .await
        .unwrap();
    assert_eq!(h.session.account().unwrap().name, "Kofi Mensah");
    assert_eq!(stub.calls(), ["accounts:signUp", "accounts:signIn"]);
}

#[tokio::test]
async fn test_register_existing_email() {
    let stub = ama();
    let mut h = harness(&stub).await;

    let err = h
        .session
        .register(register_form("ama@example.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Auth(AuthError::AccountExists)));
}

#[tokio::test]
async fn test_rate_limited() {
    let stub = ama().rate_limited();
    let mut h = harness(&stub).await;

    let err = h
        .session
        .login(login_form("ama@example.com", "hunter22"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Auth(AuthError::RateLimited(7))));
    assert!(!err.is_unexpected());
}

#[tokio::test]
async fn test_logout_clears_profile() {
    let stub = ama();
    let mut h = harness(&stub).await;
    h.session
        .login(login_form("ama@example.com", "hunter22"))
        .await
        .unwrap();

    h.session.logout().await.unwrap();
    assert!(h.session.current_user().is_none());
    assert!(h.store.get(keys::USER).unwrap().is_none());
    assert_eq!(stub.calls(), ["accounts:signIn", "accounts:signOut"]);
}

#[tokio::test]
async fn test_logout_survives_backend_failure() {
    let stub = ama().failing_sign_out();
    let mut h = harness(&stub).await;
    h.session
        .login(login_form("ama@example.com", "hunter22"))
        .await
        .unwrap();

    h.session.logout().await.unwrap();
    assert!(h.session.current_user().is_none());
    assert!(h.store.get(keys::USER).unwrap().is_none());
}
