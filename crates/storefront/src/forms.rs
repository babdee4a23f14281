//! Form input validation.
//!
//! Every form is checked before any state is touched: a rejected form
//! never reaches the auth backend, the cart or storage.

use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use marketplace_core::{Email, EmailError};

/// Reasons a form submission is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// At least one required field is blank.
    #[error("Please fill in all fields")]
    MissingFields,

    /// Registration password and confirmation differ.
    #[error("Passwords do not match")]
    PasswordMismatch,

    /// Email is present but malformed.
    #[error("Invalid email address: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Listing price is not a non-negative number.
    #[error("Invalid price: {0}")]
    InvalidPrice(String),
}

fn required(value: &str) -> Result<&str, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ValidationError::MissingFields)
    } else {
        Ok(trimmed)
    }
}

fn required_secret(value: &SecretString) -> Result<(), ValidationError> {
    if value.expose_secret().is_empty() {
        Err(ValidationError::MissingFields)
    } else {
        Ok(())
    }
}

// =============================================================================
// Login
// =============================================================================

/// Raw login form input.
#[derive(Debug, Clone)]
pub struct LoginForm {
    pub email: String,
    pub password: SecretString,
}

/// Login input that passed validation.
#[derive(Debug, Clone)]
pub struct LoginCredentials {
    pub email: Email,
    pub password: SecretString,
}

impl LoginForm {
    /// Check required fields and email shape.
    ///
    /// # Errors
    ///
    /// Returns `MissingFields` for blank input, `InvalidEmail` otherwise.
    pub fn validate(self) -> Result<LoginCredentials, ValidationError> {
        let email = required(&self.email)?;
        required_secret(&self.password)?;
        Ok(LoginCredentials {
            email: Email::parse(email)?,
            password: self.password,
        })
    }
}

// =============================================================================
// Registration
// =============================================================================

/// Raw registration form input.
#[derive(Debug, Clone)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: SecretString,
    pub confirm_password: SecretString,
    pub location: String,
}

/// Registration input that passed validation.
#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub email: Email,
    pub password: SecretString,
    pub location: String,
}

impl RegisterForm {
    /// Check required fields, password confirmation and email shape, in
    /// that order.
    ///
    /// # Errors
    ///
    /// Returns the first failing check as a `ValidationError`.
    pub fn validate(self) -> Result<Registration, ValidationError> {
        let name = required(&self.name)?.to_string();
        let email = required(&self.email)?.to_string();
        required_secret(&self.password)?;
        required_secret(&self.confirm_password)?;
        let location = required(&self.location)?.to_string();

        if self.password.expose_secret() != self.confirm_password.expose_secret() {
            return Err(ValidationError::PasswordMismatch);
        }

        Ok(Registration {
            name,
            email: Email::parse(&email)?,
            password: self.password,
            location,
        })
    }
}

// =============================================================================
// Product listing
// =============================================================================

/// Raw "list a product" form input.
#[derive(Debug, Clone, Default)]
pub struct ListingForm {
    pub name: String,
    pub description: String,
    pub price: String,
    pub category: String,
    pub location: String,
}

/// A product listing that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingDraft {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub category: String,
    pub location: String,
}

impl ListingForm {
    /// Check required fields and parse the price.
    ///
    /// # Errors
    ///
    /// Returns `MissingFields` for blank input and `InvalidPrice` for a
    /// price that is not a non-negative decimal.
    pub fn validate(self) -> Result<ListingDraft, ValidationError> {
        let name = required(&self.name)?.to_string();
        let description = required(&self.description)?.to_string();
        let price_text = required(&self.price)?;
        let category = required(&self.category)?.to_string();
        let location = required(&self.location)?.to_string();

        let price: Decimal = price_text
            .parse()
            .map_err(|_| ValidationError::InvalidPrice(price_text.to_string()))?;
        if price.is_sign_negative() && !price.is_zero() {
            return Err(ValidationError::InvalidPrice(price_text.to_string()));
        }

        Ok(ListingDraft {
            name,
            description,
            price,
            category,
            location,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn secret(s: &str) -> SecretString {
        SecretString::from(s.to_string())
    }

    fn register_form() -> RegisterForm {
        RegisterForm {
            name: "Ama Owusu".to_string(),
            email: "ama@example.com".to_string(),
            password: secret("hunter22"),
            confirm_password: secret("hunter22"),
            location: "Kumasi, Ghana".to_string(),
        }
    }

    #[test]
    fn test_login_requires_both_fields() {
        let form = LoginForm {
            email: "  ".to_string(),
            password: secret("pw"),
        };
        assert_eq!(form.validate().unwrap_err(), ValidationError::MissingFields);

        let form = LoginForm {
            email: "ama@example.com".to_string(),
            password: secret(""),
        };
        assert_eq!(form.validate().unwrap_err(), ValidationError::MissingFields);
    }

    #[test]
    fn test_login_rejects_bad_email() {
        let form = LoginForm {
            email: "ama".to_string(),
            password: secret("pw"),
        };
        assert!(matches!(
            form.validate().unwrap_err(),
            ValidationError::InvalidEmail(_)
        ));
    }

    #[test]
    fn test_login_valid() {
        let form = LoginForm {
            email: " ama@example.com ".to_string(),
            password: secret("pw"),
        };
        let creds = form.validate().unwrap();
        assert_eq!(creds.email.as_str(), "ama@example.com");
        assert_eq!(creds.password.expose_secret(), "pw");
    }

    #[test]
    fn test_register_valid() {
        let registration = register_form().validate().unwrap();
        assert_eq!(registration.name, "Ama Owusu");
        assert_eq!(registration.location, "Kumasi, Ghana");
    }

    #[test]
    fn test_register_missing_field() {
        let form = RegisterForm {
            location: String::new(),
            ..register_form()
        };
        assert_eq!(form.validate().unwrap_err(), ValidationError::MissingFields);
    }

    #[test]
    fn test_register_password_mismatch() {
        let form = RegisterForm {
            confirm_password: secret("hunter23"),
            ..register_form()
        };
        assert_eq!(
            form.validate().unwrap_err(),
            ValidationError::PasswordMismatch
        );
    }

    #[test]
    fn test_register_checks_mismatch_before_email() {
        let form = RegisterForm {
            email: "not-an-email".to_string(),
            confirm_password: secret("other"),
            ..register_form()
        };
        assert_eq!(
            form.validate().unwrap_err(),
            ValidationError::PasswordMismatch
        );
    }

    #[test]
    fn test_listing_valid() {
        let form = ListingForm {
            name: "Kente Scarf".to_string(),
            description: "Hand woven".to_string(),
            price: "29.99".to_string(),
            category: "Fashion".to_string(),
            location: "Accra, Ghana".to_string(),
        };
        let draft = form.validate().unwrap();
        assert_eq!(draft.price, Decimal::new(2999, 2));
    }

    #[test]
    fn test_listing_rejects_bad_price() {
        let base = ListingForm {
            name: "Kente Scarf".to_string(),
            description: "Hand woven".to_string(),
            price: "abc".to_string(),
            category: "Fashion".to_string(),
            location: "Accra, Ghana".to_string(),
        };
        assert!(matches!(
            base.clone().validate().unwrap_err(),
            ValidationError::InvalidPrice(_)
        ));

        let negative = ListingForm {
            price: "-1".to_string(),
            ..base
        };
        assert!(matches!(
            negative.validate().unwrap_err(),
            ValidationError::InvalidPrice(_)
        ));
    }

    #[test]
    fn test_listing_missing_fields() {
        assert_eq!(
            ListingForm::default().validate().unwrap_err(),
            ValidationError::MissingFields
        );
    }
}
