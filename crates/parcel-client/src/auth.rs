//! Typed client for the backend's account actions.
//!
//! | Action | Body | Reply |
//! |--------|------|-------|
//! | `processLogin` | `phone, password` | `{success, message?, phone?, email?, token?, tempPassword?}` |
//! | `createAccount` | `phone, password, email` | `{success, message?}` |
//! | `initiatePasswordReset` | `phone, email` | `{success, message?}` |
//! | `forcePasswordReset` | `phone, newPassword, token?` | `{success, message?}` |
//!
//! Inputs are checked with the same [`Validators`] as the declaration form
//! before anything is sent. Unlike the declaration gateway, transport
//! failures are returned as errors: account actions have no confirmation
//! step, so the caller simply reports them and lets the user retry.

use std::sync::Arc;

use parcel_core::{SessionToken, ValidationError, Validators};
use serde::{Deserialize, Serialize};

use crate::error::GatewayError;
use crate::transport::Transport;

/// Errors from account actions.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// An input failed client-side validation; nothing was sent.
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    /// The call did not produce a usable reply.
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    /// The backend refused the action.
    #[error("{action} refused: {message}")]
    Refused {
        /// The backend action name.
        action: &'static str,
        /// The backend's message, or a fallback when it gave none.
        message: String,
    },
}

/// Generic `{success, message}` reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ActionReply {
    /// Whether the backend performed the action.
    #[serde(default)]
    pub success: bool,
    /// Human-readable status from the backend.
    #[serde(default)]
    pub message: Option<String>,
}

/// Reply to `processLogin`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginReply {
    /// Whether the credentials were accepted.
    #[serde(default)]
    pub success: bool,
    /// Refusal reason, or a greeting.
    #[serde(default)]
    pub message: Option<String>,
    /// Canonical account phone; falls back to the phone that was sent.
    #[serde(default)]
    pub phone: Option<String>,
    /// Account email.
    #[serde(default)]
    pub email: Option<String>,
    /// Session token. Not every backend issues one.
    #[serde(default)]
    pub token: Option<String>,
    /// Logged in with a temporary password.
    #[serde(default)]
    pub temp_password: bool,
}

#[derive(Serialize)]
struct LoginBody<'a> {
    phone: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct CreateAccountBody<'a> {
    phone: &'a str,
    password: &'a str,
    email: &'a str,
}

#[derive(Serialize)]
struct ResetBody<'a> {
    phone: &'a str,
    email: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ForceResetBody<'a> {
    phone: &'a str,
    new_password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    token: Option<&'a str>,
}

/// Client for the account actions.
#[derive(Debug, Clone)]
pub struct AuthClient {
    transport: Transport,
    validators: Arc<Validators>,
}

impl AuthClient {
    pub(crate) fn new(transport: Transport, validators: Arc<Validators>) -> Self {
        Self {
            transport,
            validators,
        }
    }

    /// Log in and return the issued session.
    ///
    /// Only emptiness is checked locally: a login must work even for
    /// accounts created under older, weaker rules.
    pub async fn login(&self, phone: &str, password: &str) -> Result<SessionToken, AuthError> {
        const ACTION: &str = "processLogin";
        let phone = phone.trim();
        if phone.is_empty() {
            return Err(ValidationError::Required { field: "phone" }.into());
        }
        if password.is_empty() {
            return Err(ValidationError::Required { field: "password" }.into());
        }

        let reply: LoginReply = self
            .transport
            .post_action(ACTION, &LoginBody { phone, password })
            .await?;

        if !reply.success {
            return Err(refused(ACTION, reply.message));
        }

        let session = SessionToken::new(
            reply.phone.unwrap_or_else(|| phone.to_string()),
            reply.email,
            reply.token.unwrap_or_default(),
            reply.temp_password,
        );
        tracing::info!(
            phone,
            temporary = session.temporary,
            has_token = session.token().is_some(),
            "login succeeded"
        );
        Ok(session)
    }

    /// Register a new account.
    pub async fn create_account(
        &self,
        phone: &str,
        password: &str,
        email: &str,
    ) -> Result<ActionReply, AuthError> {
        const ACTION: &str = "createAccount";
        let phone = self.validators.parse_phone(phone)?;
        self.validators.check_password(password)?;
        let email = self.validators.parse_email(email)?;

        let reply: ActionReply = self
            .transport
            .post_action(
                ACTION,
                &CreateAccountBody {
                    phone: &phone,
                    password,
                    email: &email,
                },
            )
            .await?;
        accept(ACTION, reply)
    }

    /// Ask the backend to email password-reset instructions.
    pub async fn initiate_password_reset(
        &self,
        phone: &str,
        email: &str,
    ) -> Result<ActionReply, AuthError> {
        const ACTION: &str = "initiatePasswordReset";
        let phone = self.validators.parse_phone(phone)?;
        let email = self.validators.parse_email(email)?;

        let reply: ActionReply = self
            .transport
            .post_action(
                ACTION,
                &ResetBody {
                    phone: &phone,
                    email: &email,
                },
            )
            .await?;
        accept(ACTION, reply)
    }

    /// Replace a temporary password for the session's account.
    pub async fn force_password_reset(
        &self,
        session: &SessionToken,
        new_password: &str,
    ) -> Result<ActionReply, AuthError> {
        const ACTION: &str = "forcePasswordReset";
        self.validators.check_password(new_password)?;

        let reply: ActionReply = self
            .transport
            .post_action(
                ACTION,
                &ForceResetBody {
                    phone: session.subject_id(),
                    new_password,
                    token: session.token(),
                },
            )
            .await?;
        accept(ACTION, reply)
    }
}

fn refused(action: &'static str, message: Option<String>) -> AuthError {
    AuthError::Refused {
        action,
        message: message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| "unknown error".into()),
    }
}

fn accept(action: &'static str, reply: ActionReply) -> Result<ActionReply, AuthError> {
    if reply.success {
        Ok(reply)
    } else {
        Err(refused(action, reply.message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_reply_tolerates_missing_fields() {
        let reply: LoginReply = serde_json::from_str(r#"{"success":false}"#).unwrap();
        assert!(!reply.success);
        assert!(reply.token.is_none());
        assert!(!reply.temp_password);
    }

    #[test]
    fn refused_uses_fallback_message() {
        let err = refused("createAccount", Some("  ".into()));
        assert_eq!(err.to_string(), "createAccount refused: unknown error");
    }

    #[test]
    fn accept_passes_successful_replies_through() {
        let reply = ActionReply {
            success: true,
            message: Some("ok".into()),
        };
        assert_eq!(accept("createAccount", reply.clone()).unwrap(), reply);
    }
}
