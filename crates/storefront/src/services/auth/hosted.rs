//! HTTP client for the hosted auth service.
//!
//! # Endpoints
//!
//! - `POST {base}/v1/accounts:signIn` `{email, password}` → `{name, email, location}`
//! - `POST {base}/v1/accounts:signUp` `{name, email, password, location}` → 2xx
//! - `POST {base}/v1/accounts:signOut` `{email}` → 2xx
//!
//! Every request carries the `x-api-key` header. Nothing is retried.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use url::Url;

use marketplace_core::Email;

use super::{AuthBackend, AuthError, SignedInUser};
use crate::config::AuthConfig;
use crate::forms::Registration;

const API_KEY_HEADER: &str = "x-api-key";

/// Client for the hosted auth REST API.
#[derive(Clone)]
pub struct HostedAuthClient {
    client: reqwest::Client,
    base_url: Url,
    api_key: SecretString,
}

impl std::fmt::Debug for HostedAuthClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostedAuthClient")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

#[derive(Serialize)]
struct SignInRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct SignUpRequest<'a> {
    name: &'a str,
    email: &'a str,
    password: &'a str,
    location: &'a str,
}

#[derive(Serialize)]
struct SignOutRequest<'a> {
    email: &'a str,
}

#[derive(Deserialize)]
struct SignInResponse {
    name: String,
    email: String,
    location: String,
}

/// Error bodies come as either `{"error": {"message"}}` or `{"message"}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum ErrorBody {
    Nested { error: ErrorDetail },
    Flat { message: String },
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

impl HostedAuthClient {
    /// Create a client for the configured service.
    #[must_use]
    pub fn new(config: &AuthConfig, client: reqwest::Client) -> Self {
        let mut base_url = config.base_url.clone();
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Self {
            client,
            base_url,
            api_key: config.api_key.clone(),
        }
    }

    fn endpoint(&self, action: &str) -> Result<Url, AuthError> {
        self.base_url
            .join(&format!("v1/accounts:{action}"))
            .map_err(|e| AuthError::Parse(format!("invalid endpoint: {e}")))
    }

    async fn post<B: Serialize + Sync>(
        &self,
        action: &str,
        body: &B,
    ) -> Result<reqwest::Response, AuthError> {
        let url = self.endpoint(action)?;
        let response = self
            .client
            .post(url)
            .header(API_KEY_HEADER, self.api_key.expose_secret())
            .json(body)
            .send()
            .await?;
        Ok(response)
    }
}

/// Turn a non-success response into an `AuthError`.
async fn error_from_response(response: reqwest::Response, conflict: bool) -> AuthError {
    let status = response.status();

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(1);
        return AuthError::RateLimited(retry_after);
    }

    if conflict && status == reqwest::StatusCode::CONFLICT {
        return AuthError::AccountExists;
    }

    let body = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ErrorBody>(&body) {
        Ok(ErrorBody::Nested { error }) => error.message,
        Ok(ErrorBody::Flat { message }) => message,
        Err(_) => body.chars().take(200).collect(),
    };

    tracing::warn!(status = %status, message = %message, "Auth service returned non-success status");
    AuthError::Api {
        status: status.as_u16(),
        message,
    }
}

impl AuthBackend for HostedAuthClient {
    #[instrument(skip_all, fields(email = %email))]
    async fn sign_in(&self, email: &Email, password: &SecretString) -> Result<SignedInUser, AuthError> {
        let body = SignInRequest {
            email: email.as_str(),
            password: password.expose_secret(),
        };
        let response = self.post("signIn", &body).await?;
        let status = response.status();

        if matches!(
            status,
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN
        ) {
            return Err(AuthError::InvalidCredentials);
        }
        if !status.is_success() {
            return Err(error_from_response(response, false).await);
        }

        let text = response.text().await?;
        let parsed: SignInResponse =
            serde_json::from_str(&text).map_err(|e| AuthError::Parse(e.to_string()))?;
        let email = Email::parse(&parsed.email).map_err(|e| AuthError::Parse(e.to_string()))?;

        Ok(SignedInUser {
            name: parsed.name,
            email,
            location: parsed.location,
        })
    }

    #[instrument(skip_all, fields(email = %registration.email))]
    async fn sign_up(&self, registration: &Registration) -> Result<(), AuthError> {
        let body = SignUpRequest {
            name: &registration.name,
            email: registration.email.as_str(),
            password: registration.password.expose_secret(),
            location: &registration.location,
        };
        let response = self.post("signUp", &body).await?;
        if !response.status().is_success() {
            return Err(error_from_response(response, true).await);
        }
        Ok(())
    }

    #[instrument(skip_all, fields(email = %email))]
    async fn sign_out(&self, email: &Email) -> Result<(), AuthError> {
        let body = SignOutRequest {
            email: email.as_str(),
        };
        let response = self.post("signOut", &body).await?;
        if !response.status().is_success() {
            return Err(error_from_response(response, false).await);
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> HostedAuthClient {
        let config = AuthConfig {
            base_url: Url::parse(base).unwrap(),
            api_key: SecretString::from("k3y-V4lue".to_string()),
        };
        HostedAuthClient::new(&config, reqwest::Client::new())
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let client = client("https://auth.marketplace.test/api");
        assert_eq!(
            client.endpoint("signIn").unwrap().as_str(),
            "https://auth.marketplace.test/api/v1/accounts:signIn"
        );
    }

    #[test]
    fn test_endpoint_at_root() {
        let client = client("https://auth.marketplace.test");
        assert_eq!(
            client.endpoint("signOut").unwrap().as_str(),
            "https://auth.marketplace.test/v1/accounts:signOut"
        );
    }

    #[test]
    fn test_debug_redacts_key() {
        let debug_output = format!("{:?}", client("https://auth.marketplace.test"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("k3y-V4lue"));
    }

    #[test]
    fn test_error_body_shapes() {
        let nested: ErrorBody =
            serde_json::from_str(r#"{"error": {"message": "EMAIL_NOT_FOUND"}}"#).unwrap();
        assert!(matches!(nested, ErrorBody::Nested { ref error } if error.message == "EMAIL_NOT_FOUND"));

        let flat: ErrorBody = serde_json::from_str(r#"{"message": "bad"}"#).unwrap();
        assert!(matches!(flat, ErrorBody::Flat { ref message } if message == "bad"));
    }
}
