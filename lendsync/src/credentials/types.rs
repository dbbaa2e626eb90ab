//! Credential value types.

use serde::{Deserialize, Serialize};

/// Token pair as held in storage.
///
/// Tokens are opaque strings - nothing here inspects or validates their
/// contents. Absent tokens represent "unauthenticated".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

impl Credentials {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: Some(access_token.into()),
            refresh_token: Some(refresh_token.into()),
        }
    }

    /// Check if an access token is present.
    #[inline]
    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    /// Check if a refresh token is present.
    #[inline]
    pub fn has_refresh_token(&self) -> bool {
        self.refresh_token.is_some()
    }
}

/// Partial update applied to stored credentials.
///
/// `None` fields keep their current stored value, so a refresh response
/// that omits a new refresh token does not wipe the existing one.
#[derive(Debug, Clone, Default)]
pub struct CredentialUpdate {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

impl CredentialUpdate {
    /// Update carrying a new access token and, when issued, a new refresh
    /// token.
    pub fn tokens(access_token: impl Into<String>, refresh_token: Option<String>) -> Self {
        Self {
            access_token: Some(access_token.into()),
            refresh_token,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_credentials_are_unauthenticated() {
        let credentials = Credentials::default();
        assert!(!credentials.is_authenticated());
        assert!(!credentials.has_refresh_token());
    }

    #[test]
    fn test_new_credentials() {
        let credentials = Credentials::new("access", "refresh");
        assert!(credentials.is_authenticated());
        assert!(credentials.has_refresh_token());
    }
}
