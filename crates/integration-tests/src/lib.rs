//! Integration tests for the Marketplace storefront.
//!
//! The catalog and the hosted auth service are replaced by `axum` stub
//! servers bound to an ephemeral local port, so the tests exercise the real
//! HTTP clients end to end without network access.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p marketplace-integration-tests
//! ```

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path as UrlPath, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use secrecy::SecretString;
use serde::Deserialize;
use serde_json::json;
use tokio::net::TcpListener;
use url::Url;

use marketplace_storefront::config::{AuthConfig, CatalogConfig, CatalogSource, StorefrontConfig};

/// API key the auth stub accepts.
pub const API_KEY: &str = "mk_live_9Qv3Lr7Tz2Wx8Np4Hs6Jd1Kc5";

/// Catalog served by [`spawn_catalog`].
pub const CATALOG: &str = r#"[
    {"id": 1, "name": "Kente Scarf", "price": 10, "image": "images/kente.jpg",
     "location": "Accra, Ghana", "category": "Fashion"},
    {"id": 2, "name": "Shea Butter", "price": 5, "image": "images/shea.jpg",
     "location": "Tamale, Ghana", "description": "Raw and unrefined"},
    {"id": 3, "name": "Bolga Basket", "price": 45.5, "image": "images/basket.jpg",
     "location": "Bolgatanga, Ghana", "category": "Home"}
]"#;

/// Serve `app` on an ephemeral local port.
///
/// # Panics
///
/// Panics if no local port can be bound.
#[allow(clippy::expect_used)]
pub async fn spawn(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub server");
    let addr = listener.local_addr().expect("stub server address");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

/// Serve a catalog at `/data/products.json` with the given status and body.
pub async fn spawn_catalog(status: StatusCode, body: &'static str) -> Url {
    let app = Router::new().route(
        "/data/products.json",
        get(move || async move { (status, [(header::CONTENT_TYPE, "application/json")], body) }),
    );
    let addr = spawn(app).await;
    url(&format!("http://{addr}/data/products.json"))
}

#[allow(clippy::expect_used)]
fn url(s: &str) -> Url {
    Url::parse(s).expect("stub URL")
}

// =============================================================================
// Auth stub
// =============================================================================

#[derive(Debug, Clone)]
struct Account {
    name: String,
    password: String,
    location: String,
}

#[derive(Debug, Default)]
struct AuthStubState {
    accounts: HashMap<String, Account>,
    calls: Vec<String>,
    api_keys: Vec<String>,
    rate_limited: bool,
    fail_sign_out: bool,
}

/// In-memory stand-in for the hosted auth service.
#[derive(Debug, Clone, Default)]
pub struct AuthStub {
    state: Arc<Mutex<AuthStubState>>,
}

#[derive(Deserialize)]
struct Credentials {
    email: String,
    #[serde(default)]
    password: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    location: String,
}

impl AuthStub {
    fn with_state<T>(&self, f: impl FnOnce(&mut AuthStubState) -> T) -> T {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }

    /// Pre-register an account.
    #[must_use]
    pub fn with_account(self, name: &str, email: &str, password: &str, location: &str) -> Self {
        self.with_state(|s| {
            s.accounts.insert(
                email.to_string(),
                Account {
                    name: name.to_string(),
                    password: password.to_string(),
                    location: location.to_string(),
                },
            );
        });
        self
    }

    /// Answer every request with 429.
    #[must_use]
    pub fn rate_limited(self) -> Self {
        self.with_state(|s| s.rate_limited = true);
        self
    }

    /// Answer sign-out with 503.
    #[must_use]
    pub fn failing_sign_out(self) -> Self {
        self.with_state(|s| s.fail_sign_out = true);
        self
    }

    /// Actions received so far, e.g. `["accounts:signUp", "accounts:signIn"]`.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.with_state(|s| s.calls.clone())
    }

    /// `x-api-key` header values received so far.
    #[must_use]
    pub fn api_keys(&self) -> Vec<String> {
        self.with_state(|s| s.api_keys.clone())
    }

    #[must_use]
    pub fn has_account(&self, email: &str) -> bool {
        self.with_state(|s| s.accounts.contains_key(email))
    }

    /// Serve the stub; returns the base URL to configure.
    pub async fn spawn(&self) -> Url {
        let app = Router::new()
            .route("/api/v1/{action}", post(handle_auth))
            .with_state(self.clone());
        let addr = spawn(app).await;
        url(&format!("http://{addr}/api"))
    }
}

async fn handle_auth(
    State(stub): State<AuthStub>,
    UrlPath(action): UrlPath<String>,
    headers: HeaderMap,
    Json(body): Json<Credentials>,
) -> Response {
    let key = headers
        .get("x-api-key")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    stub.with_state(|s| {
        s.calls.push(action.clone());
        s.api_keys.push(key.clone());

        if s.rate_limited {
            return (StatusCode::TOO_MANY_REQUESTS, [(header::RETRY_AFTER, "7")], "").into_response();
        }
        if key != API_KEY {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": {"message": "API_KEY_INVALID"}})),
            )
                .into_response();
        }

        match action.as_str() {
            "accounts:signIn" => match s.accounts.get(&body.email) {
                Some(account) if account.password == body.password => Json(json!({
                    "name": account.name,
                    "email": body.email,
                    "location": account.location,
                }))
                .into_response(),
                _ => (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({"error": {"message": "INVALID_LOGIN_CREDENTIALS"}})),
                )
                    .into_response(),
            },
            "accounts:signUp" => {
                if s.accounts.contains_key(&body.email) {
                    return (
                        StatusCode::CONFLICT,
                        Json(json!({"error": {"message": "EMAIL_EXISTS"}})),
                    )
                        .into_response();
                }
                s.accounts.insert(
                    body.email.clone(),
                    Account {
                        name: body.name.clone(),
                        password: body.password.clone(),
                        location: body.location.clone(),
                    },
                );
                StatusCode::OK.into_response()
            }
            "accounts:signOut" if s.fail_sign_out => {
                (StatusCode::SERVICE_UNAVAILABLE, "maintenance").into_response()
            }
            "accounts:signOut" => StatusCode::NO_CONTENT.into_response(),
            _ => StatusCode::NOT_FOUND.into_response(),
        }
    })
}

// =============================================================================
// Configuration
// =============================================================================

/// Session configuration pointing at stub collaborators.
#[must_use]
pub fn config(storage_dir: &Path, catalog: Url, auth: Option<Url>) -> StorefrontConfig {
    StorefrontConfig {
        storage_path: storage_dir.join("marketplace-storage.json"),
        catalog: CatalogConfig {
            source: CatalogSource::Http(catalog),
            cache_ttl: Duration::from_secs(60),
        },
        auth: auth.map(|base_url| AuthConfig {
            base_url,
            api_key: SecretString::from(API_KEY.to_string()),
        }),
        http_timeout: Duration::from_secs(5),
        sentry_dsn: None,
        sentry_environment: None,
    }
}
