//! Linked account identity.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Provider identifier for Google accounts.
pub const GOOGLE_PROVIDER: &str = "google";

/// A provider account linked to a local user.
///
/// The `(user, provider, account_id)` triple identifies the account; the
/// email is display-only and may be missing when the linking flow did not
/// report one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LinkedAccount {
    /// The local user owning this account.
    pub user: String,
    /// The provider name (e.g. `"google"`).
    pub provider: String,
    /// The provider-side account identifier (Google `sub`).
    pub account_id: String,
    /// The account's email address, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl LinkedAccount {
    /// Creates a Google account linked to `user`.
    pub fn google(user: impl Into<String>, account_id: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            provider: GOOGLE_PROVIDER.to_string(),
            account_id: account_id.into(),
            email: None,
        }
    }

    /// Builder method to set the email address.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Returns the storage key for this account: `user/provider/account_id`.
    ///
    /// `%` and `/` inside a part are percent-encoded, so distinct accounts
    /// never share a key.
    pub fn key(&self) -> String {
        format!(
            "{}/{}/{}",
            escape_key_part(&self.user),
            escape_key_part(&self.provider),
            escape_key_part(&self.account_id)
        )
    }

    /// Returns the label shown to the user: the email if known, else the id.
    pub fn display_name(&self) -> &str {
        self.email.as_deref().unwrap_or(&self.account_id)
    }
}

impl fmt::Display for LinkedAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.provider, self.display_name())
    }
}

fn escape_key_part(part: &str) -> String {
    part.replace('%', "%25").replace('/', "%2F")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_includes_all_identity_parts() {
        let account = LinkedAccount::google("alice", "1234").with_email("alice@example.com");
        assert_eq!(account.key(), "alice/google/1234");
    }

    #[test]
    fn key_separators_inside_parts_do_not_collide() {
        let a = LinkedAccount::google("alice", "x/google/y");
        let b = LinkedAccount::google("alice/google/x", "y");
        assert_ne!(a.key(), b.key());
        assert_eq!(a.key(), "alice/google/x%2Fgoogle%2Fy");

        let c = LinkedAccount::google("alice", "x%2Fy");
        let d = LinkedAccount::google("alice", "x/y");
        assert_ne!(c.key(), d.key());
    }

    #[test]
    fn display_prefers_email() {
        let account = LinkedAccount::google("alice", "1234");
        assert_eq!(account.display_name(), "1234");
        assert_eq!(account.to_string(), "google:1234");

        let account = account.with_email("alice@example.com");
        assert_eq!(account.display_name(), "alice@example.com");
        assert_eq!(account.to_string(), "google:alice@example.com");
    }

    #[test]
    fn email_is_optional_in_json() {
        let account: LinkedAccount = serde_json::from_str(
            r#"{"user":"bob","provider":"google","account_id":"42"}"#,
        )
        .unwrap();
        assert!(account.email.is_none());

        let json = serde_json::to_string(&account).unwrap();
        assert!(!json.contains("email"));
    }
}
