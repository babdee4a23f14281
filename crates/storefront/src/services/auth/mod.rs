//! Authentication service.
//!
//! Validates login and registration forms, delegates the credential check
//! to an [`AuthBackend`] and keeps the signed-in profile in storage under
//! the `user` key so the next session starts signed in.

mod error;
mod hosted;

use std::future::Future;

use secrecy::SecretString;

pub use error::AuthError;
pub use hosted::HostedAuthClient;

use marketplace_core::{Email, UserProfile};

use crate::error::{clear_sentry_user, set_sentry_user};
use crate::forms::{LoginForm, RegisterForm, Registration};
use crate::storage::{SharedStore, keys, load_json, save_json};

/// Account details returned by a successful sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedInUser {
    pub name: String,
    pub email: Email,
    pub location: String,
}

/// The service that actually checks credentials.
pub trait AuthBackend: Send + Sync {
    /// Check credentials and return the account's details.
    fn sign_in(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> impl Future<Output = Result<SignedInUser, AuthError>> + Send;

    /// Create an account.
    fn sign_up(
        &self,
        registration: &Registration,
    ) -> impl Future<Output = Result<(), AuthError>> + Send;

    /// End the account's remote session.
    fn sign_out(&self, email: &Email) -> impl Future<Output = Result<(), AuthError>> + Send;
}

/// Authentication service.
///
/// Holds the current profile in memory and mirrors it to storage.
pub struct AuthService<B> {
    backend: B,
    store: SharedStore,
    current: Option<UserProfile>,
}

impl<B: AuthBackend> AuthService<B> {
    /// Create a signed-out service. Call [`check_auth`](Self::check_auth)
    /// to pick up a stored profile.
    #[must_use]
    pub const fn new(backend: B, store: SharedStore) -> Self {
        Self {
            backend,
            store,
            current: None,
        }
    }

    /// Restore the stored profile, if any.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Storage` if the stored profile is malformed.
    pub fn check_auth(&mut self) -> Result<Option<&UserProfile>, AuthError> {
        let profile: Option<UserProfile> = load_json(&*self.store, keys::USER)?;
        self.current = profile.filter(|p| p.is_authenticated);

        if let Some(profile) = &self.current {
            tracing::debug!(email = %profile.email, "Restored signed-in profile");
            set_sentry_user(profile.email.as_str());
        }
        Ok(self.current.as_ref())
    }

    /// Sign in with the login form.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` for bad input (nothing is sent),
    /// the backend's error if the sign-in fails, or `AuthError::Storage`
    /// if the profile cannot be saved.
    pub async fn login(&mut self, form: LoginForm) -> Result<&UserProfile, AuthError> {
        let credentials = form.validate()?;
        let user = self
            .backend
            .sign_in(&credentials.email, &credentials.password)
            .await?;

        let profile = UserProfile::signed_in(user.name, user.email, user.location);
        save_json(&*self.store, keys::USER, &profile)?;
        set_sentry_user(profile.email.as_str());
        tracing::info!(email = %profile.email, "User signed in");

        Ok(self.current.insert(profile))
    }

    /// Create an account from the registration form.
    ///
    /// Registration does not sign the user in.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` for bad input (nothing is sent) or
    /// the backend's error if sign-up fails.
    pub async fn register(&self, form: RegisterForm) -> Result<Email, AuthError> {
        let registration = form.validate()?;
        self.backend.sign_up(&registration).await?;
        tracing::info!(email = %registration.email, "Account registered");
        Ok(registration.email)
    }

    /// Sign out and forget the stored profile.
    ///
    /// A backend failure is logged; local state is cleared regardless.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Storage` if the stored profile cannot be removed.
    pub async fn logout(&mut self) -> Result<(), AuthError> {
        if let Some(profile) = self.current.take() {
            if let Err(e) = self.backend.sign_out(&profile.email).await {
                tracing::warn!(error = %e, email = %profile.email, "Remote sign-out failed");
            }
            tracing::info!(email = %profile.email, "User signed out");
        }

        self.store.remove(keys::USER)?;
        clear_sentry_user();
        Ok(())
    }

    /// The signed-in profile, if any.
    #[must_use]
    pub const fn current_user(&self) -> Option<&UserProfile> {
        self.current.as_ref()
    }

    /// Whether a user is signed in.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::{Arc, Mutex};

    use secrecy::ExposeSecret;

    use super::*;
    use crate::forms::ValidationError;
    use crate::storage::{KeyValueStore, MemoryStore};

    /// Backend accepting a single account.
    #[derive(Default)]
    struct FakeBackend {
        calls: Mutex<Vec<&'static str>>,
        fail_sign_out: bool,
    }

    impl FakeBackend {
        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl AuthBackend for FakeBackend {
        async fn sign_in(
            &self,
            email: &Email,
            password: &SecretString,
        ) -> Result<SignedInUser, AuthError> {
            self.calls.lock().unwrap().push("sign_in");
            if email.as_str() == "ama@example.com" && password.expose_secret() == "hunter22" {
                Ok(SignedInUser {
                    name: "Ama Owusu".to_string(),
                    email: email.clone(),
                    location: "Kumasi, Ghana".to_string(),
                })
            } else {
                Err(AuthError::InvalidCredentials)
            }
        }

        async fn sign_up(&self, registration: &Registration) -> Result<(), AuthError> {
            self.calls.lock().unwrap().push("sign_up");
            if registration.email.as_str() == "ama@example.com" {
                Err(AuthError::AccountExists)
            } else {
                Ok(())
            }
        }

        async fn sign_out(&self, _email: &Email) -> Result<(), AuthError> {
            self.calls.lock().unwrap().push("sign_out");
            if self.fail_sign_out {
                Err(AuthError::Api {
                    status: 503,
                    message: "unavailable".to_string(),
                })
            } else {
                Ok(())
            }
        }
    }

    fn login_form(email: &str, password: &str) -> LoginForm {
        LoginForm {
            email: email.to_string(),
            password: SecretString::from(password.to_string()),
        }
    }

    fn service(backend: FakeBackend) -> (AuthService<FakeBackend>, MemoryStore) {
        let store = MemoryStore::new();
        (AuthService::new(backend, Arc::new(store.clone())), store)
    }

    #[tokio::test]
    async fn test_login_persists_profile() {
        let (mut auth, store) = service(FakeBackend::default());

        let profile = auth
            .login(login_form("ama@example.com", "hunter22"))
            .await
            .unwrap();
        assert_eq!(profile.name, "Ama Owusu");
        assert!(profile.is_authenticated);
        assert!(auth.is_authenticated());

        let stored: serde_json::Value =
            serde_json::from_str(&store.get(keys::USER).unwrap().unwrap()).unwrap();
        assert_eq!(stored["email"], "ama@example.com");
        assert_eq!(stored["isAuthenticated"], true);
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let (mut auth, store) = service(FakeBackend::default());

        let err = auth
            .login(login_form("ama@example.com", "wrong"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
        assert!(!auth.is_authenticated());
        assert!(store.get(keys::USER).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_invalid_form_never_reaches_backend() {
        let (mut auth, _store) = service(FakeBackend::default());

        let err = auth.login(login_form("", "hunter22")).await.unwrap_err();
        assert!(matches!(
            err,
            AuthError::Validation(ValidationError::MissingFields)
        ));
        assert!(auth.backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_register_does_not_sign_in() {
        let (auth, store) = service(FakeBackend::default());

        let form = RegisterForm {
            name: "Kofi Mensah".to_string(),
            email: "kofi@example.com".to_string(),
            password: SecretString::from("pa55word".to_string()),
            confirm_password: SecretString::from("pa55word".to_string()),
            location: "Accra, Ghana".to_string(),
        };
        let email = auth.register(form).await.unwrap();
        assert_eq!(email.as_str(), "kofi@example.com");
        assert!(!auth.is_authenticated());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_register_existing_account() {
        let (auth, _store) = service(FakeBackend::default());

        let form = RegisterForm {
            name: "Ama Owusu".to_string(),
            email: "ama@example.com".to_string(),
            password: SecretString::from("pa55word".to_string()),
            confirm_password: SecretString::from("pa55word".to_string()),
            location: "Kumasi, Ghana".to_string(),
        };
        assert!(matches!(
            auth.register(form).await.unwrap_err(),
            AuthError::AccountExists
        ));
    }

    #[tokio::test]
    async fn test_check_auth_restores_profile() {
        let (mut auth, store) = service(FakeBackend::default());
        auth.login(login_form("ama@example.com", "hunter22"))
            .await
            .unwrap();

        let mut next = AuthService::new(FakeBackend::default(), Arc::new(store));
        let profile = next.check_auth().unwrap().unwrap();
        assert_eq!(profile.email.as_str(), "ama@example.com");
        assert!(next.is_authenticated());
    }

    #[test]
    fn test_check_auth_rejects_malformed_profile() {
        let (mut auth, store) = service(FakeBackend::default());
        store.set(keys::USER, "{\"name\": 3}").unwrap();

        assert!(matches!(
            auth.check_auth().unwrap_err(),
            AuthError::Storage(_)
        ));
    }

    #[tokio::test]
    async fn test_logout_clears_even_if_backend_fails() {
        let backend = FakeBackend {
            fail_sign_out: true,
            ..FakeBackend::default()
        };
        let (mut auth, store) = service(backend);
        auth.login(login_form("ama@example.com", "hunter22"))
            .await
            .unwrap();

        auth.logout().await.unwrap();
        assert!(!auth.is_authenticated());
        assert!(store.get(keys::USER).unwrap().is_none());
        assert_eq!(auth.backend.calls(), ["sign_in", "sign_out"]);
    }
}
