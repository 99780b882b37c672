//! # Session Token
//!
//! The credential returned by a successful login. The UI shell owns its
//! persistence; the submission pipeline only reads the subject id and the
//! token to attach them to outgoing requests.
//!
//! The serialized field names (`phone`, `email`, `token`, `tempPassword`)
//! match what the login action returns, so a login reply can be stored as-is.
//! Backends are not required to issue a token: a session without one still
//! identifies the account, but nothing is attached to submissions.

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

/// An authenticated session.
///
/// Custom `Debug` redacts the token.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionToken {
    /// Primary subject identifier (the account phone number).
    #[serde(rename = "phone")]
    pub subject_id: String,
    /// Secondary identifier (the account email), when known.
    #[serde(rename = "email", default, skip_serializing_if = "Option::is_none")]
    pub secondary_id: Option<String>,
    /// Opaque bearer token issued by the backend, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<Zeroizing<String>>,
    /// Set when the account logged in with a temporary password and must
    /// choose a new one.
    #[serde(rename = "tempPassword", default)]
    pub temporary: bool,
}

impl SessionToken {
    /// Create a session token. An empty `token` means none was issued.
    pub fn new(
        subject_id: impl Into<String>,
        secondary_id: Option<String>,
        token: impl Into<String>,
        temporary: bool,
    ) -> Self {
        Self {
            subject_id: subject_id.into(),
            secondary_id,
            token: Some(token.into())
                .filter(|t| !t.is_empty())
                .map(Zeroizing::new),
            temporary,
        }
    }

    /// The account phone number.
    pub fn subject_id(&self) -> &str {
        &self.subject_id
    }

    /// The bearer token, when the backend issued one.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref().map(String::as_str)
    }
}

impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionToken")
            .field("subject_id", &self.subject_id)
            .field("secondary_id", &self.secondary_id)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("temporary", &self.temporary)
            .finish()
    }
}
