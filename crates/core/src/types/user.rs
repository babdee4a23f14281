//! Account profile kept on the device between sessions.

use serde::{Deserialize, Serialize};

use super::email::Email;

/// The signed-in user's profile.
///
/// Stored as `{"name", "email", "location", "isAuthenticated"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub name: String,
    pub email: Email,
    /// Free-form location, e.g. "Accra, Ghana".
    pub location: String,
    pub is_authenticated: bool,
}

impl UserProfile {
    /// Build a profile for a user who just signed in.
    #[must_use]
    pub const fn signed_in(name: String, email: Email, location: String) -> Self {
        Self {
            name,
            email,
            location,
            is_authenticated: true,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_json_shape() {
        let profile = UserProfile::signed_in(
            "Ama Owusu".to_string(),
            Email::parse("ama@example.com").unwrap(),
            "Kumasi, Ghana".to_string(),
        );
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": "Ama Owusu",
                "email": "ama@example.com",
                "location": "Kumasi, Ghana",
                "isAuthenticated": true
            })
        );
    }

    #[test]
    fn test_profile_rejects_invalid_email() {
        let json = r#"{"name":"A","email":"nope","location":"B","isAuthenticated":true}"#;
        assert!(serde_json::from_str::<UserProfile>(json).is_err());
    }
}
