//! Authentication error types.

use thiserror::Error;

use crate::forms::ValidationError;
use crate::storage::StorageError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Form input rejected before contacting the backend.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Wrong email or password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Sign-up for an email that already has an account.
    #[error("account already exists")]
    AccountExists,

    /// Auth service asked us to slow down.
    #[error("rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Auth service returned an unexpected status.
    #[error("auth API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Auth service response could not be decoded.
    #[error("parse error: {0}")]
    Parse(String),

    /// Profile could not be saved or the stored profile is malformed.
    #[error("profile storage error: {0}")]
    Storage(#[from] StorageError),

    /// No auth service is configured for this session.
    #[error("authentication is not configured")]
    NotConfigured,
}

impl AuthError {
    /// Whether this error indicates a fault rather than a user mistake.
    #[must_use]
    pub const fn is_unexpected(&self) -> bool {
        !matches!(
            self,
            Self::Validation(_) | Self::InvalidCredentials | Self::AccountExists | Self::RateLimited(_)
        )
    }

    /// Message safe to show the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(err) => err.to_string(),
            Self::InvalidCredentials => "Invalid credentials".to_string(),
            Self::AccountExists => "An account with this email already exists".to_string(),
            Self::RateLimited(secs) => format!("Too many attempts, try again in {secs} seconds"),
            Self::NotConfigured => "Sign-in is not available".to_string(),
            Self::Api { .. } | Self::Http(_) | Self::Parse(_) => {
                "Could not reach the sign-in service".to_string()
            }
            Self::Storage(_) => "Your account details could not be saved".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_mistakes_are_expected() {
        assert!(!AuthError::InvalidCredentials.is_unexpected());
        assert!(!AuthError::AccountExists.is_unexpected());
        assert!(!AuthError::Validation(ValidationError::MissingFields).is_unexpected());
        assert!(AuthError::NotConfigured.is_unexpected());
        assert!(
            AuthError::Api {
                status: 500,
                message: "boom".to_string()
            }
            .is_unexpected()
        );
    }

    #[test]
    fn test_user_message_hides_api_details() {
        let err = AuthError::Api {
            status: 502,
            message: "upstream exploded".to_string(),
        };
        assert_eq!(err.user_message(), "Could not reach the sign-in service");
        assert_eq!(
            AuthError::Validation(ValidationError::PasswordMismatch).user_message(),
            "Passwords do not match"
        );
    }
}
