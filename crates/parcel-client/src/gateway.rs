//! # Declaration Gateway
//!
//! The boundary between the submission pipeline and the backend.
//!
//! | Call | Wire | Reply |
//! |------|------|-------|
//! | [`Gateway::submit`] | `POST action=submitParcelDeclaration` | `{success, message?, trackingNumber?}` |
//! | [`Gateway::poll`]   | `GET ?action=verifyParcel&trackingNumber=..` | `{exists, confirmed?, error?}` |
//!
//! ## Error Handling
//!
//! Nothing escapes the gateway as an error. Transport failures (network
//! unreachable, timeout, non-2xx status, malformed body) are normalised into
//! [`SubmitReply::Unreachable`] or a [`PollReply`] with `error` set, because
//! the caller must treat them as ambiguous rather than failed.
//!
//! ## Retry
//!
//! None. Each call talks to the wire once; confirmation polling is the
//! coordinator's job.

use async_trait::async_trait;
use parcel_core::{DeclarationPayload, SessionToken, TrackingNumber};
use serde::{Deserialize, Serialize};

use crate::error::TransportFailure;
use crate::transport::Transport;

/// Action name for declaration submission.
pub const SUBMIT_ACTION: &str = "submitParcelDeclaration";
/// Action name for confirmation polling.
pub const VERIFY_ACTION: &str = "verifyParcel";

/// Normalised result of a submission call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitReply {
    /// The backend reported success.
    Accepted {
        /// Tracking number echoed by the backend, if any.
        tracking_number: Option<String>,
        /// Informational message, if any.
        message: Option<String>,
    },
    /// The backend refused the declaration (e.g. duplicate tracking number).
    Rejected {
        /// Backend-supplied reason.
        message: String,
    },
    /// No usable reply was received; the write may or may not have landed.
    Unreachable(TransportFailure),
}

impl SubmitReply {
    /// Whether the backend accepted the submission.
    pub fn accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }

    /// Human-readable message for the reply, if any.
    pub fn message(&self) -> Option<String> {
        match self {
            Self::Accepted { message, .. } => message.clone(),
            Self::Rejected { message } => Some(message.clone()),
            Self::Unreachable(failure) => Some(failure.to_string()),
        }
    }
}

/// Normalised result of a confirmation poll. Absent booleans are `false`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PollReply {
    /// The backend has a record for the tracking number.
    #[serde(default)]
    pub exists: bool,
    /// The record is persisted and confirmed.
    #[serde(default)]
    pub confirmed: bool,
    /// Backend- or transport-reported problem, if any.
    #[serde(default)]
    pub error: Option<String>,
}

impl PollReply {
    /// A negative reply standing in for a poll that got no usable answer.
    pub fn unreachable(failure: &TransportFailure) -> Self {
        Self {
            exists: false,
            confirmed: false,
            error: Some(failure.to_string()),
        }
    }
}

/// Transport abstraction used by the submission coordinator.
///
/// Implementations must be `Send + Sync` so they can be shared behind an
/// `Arc`; the trait is object-safe. Implementations hold no mutable state
/// between calls.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Send one declaration. Called at most once per payload.
    async fn submit(&self, payload: &DeclarationPayload) -> SubmitReply;

    /// Ask whether a declaration has been persisted.
    async fn poll(&self, tracking_number: &TrackingNumber) -> PollReply;
}

// -- Wire types ---------------------------------------------------------------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmitBody<'a> {
    #[serde(flatten)]
    payload: &'a DeclarationPayload,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_phone: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    token: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    tracking_number: Option<String>,
}

// -- Client -------------------------------------------------------------------

/// HTTP implementation of [`Gateway`].
///
/// Carries the session (if any) whose subject id and token are attached to
/// every submission. A session without a token attaches nothing. The
/// session is read, never modified.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    transport: Transport,
    session: Option<SessionToken>,
}

impl HttpGateway {
    pub(crate) fn new(transport: Transport, session: Option<SessionToken>) -> Self {
        Self { transport, session }
    }

    /// The session attached to submissions.
    pub fn session(&self) -> Option<&SessionToken> {
        self.session.as_ref()
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn submit(&self, payload: &DeclarationPayload) -> SubmitReply {
        let credentials = self
            .session
            .as_ref()
            .and_then(|s| s.token().map(|token| (s.subject_id(), token)));
        let body = SubmitBody {
            payload,
            user_phone: credentials.map(|(phone, _)| phone),
            token: credentials.map(|(_, token)| token),
        };

        match self
            .transport
            .post_action::<_, SubmitResponse>(SUBMIT_ACTION, &body)
            .await
        {
            Ok(resp) if resp.success => SubmitReply::Accepted {
                tracking_number: resp.tracking_number,
                message: resp.message,
            },
            Ok(resp) => SubmitReply::Rejected {
                message: resp
                    .message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| "declaration rejected by backend".into()),
            },
            Err(e) => {
                tracing::warn!(
                    tracking_number = %payload.tracking_number(),
                    "declaration submit got no usable reply: {e}"
                );
                SubmitReply::Unreachable(TransportFailure::from(&e))
            }
        }
    }

    async fn poll(&self, tracking_number: &TrackingNumber) -> PollReply {
        match self
            .transport
            .get_action::<PollReply>(VERIFY_ACTION, &[("trackingNumber", tracking_number.as_str())])
            .await
        {
            Ok(reply) => reply,
            Err(e) => {
                tracing::debug!(%tracking_number, "verification poll failed: {e}");
                PollReply::unreachable(&TransportFailure::from(&e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poll_reply_defaults_missing_fields_to_false() {
        let reply: PollReply = serde_json::from_str(r#"{"exists":true}"#).unwrap();
        assert!(reply.exists);
        assert!(!reply.confirmed);
        assert!(reply.error.is_none());

        let empty: PollReply = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, PollReply::default());
    }

    #[test]
    fn submit_reply_views() {
        let accepted = SubmitReply::Accepted {
            tracking_number: None,
            message: Some("saved".into()),
        };
        assert!(accepted.accepted());
        assert_eq!(accepted.message().as_deref(), Some("saved"));

        let unreachable = SubmitReply::Unreachable(TransportFailure::Timeout);
        assert!(!unreachable.accepted());
        assert_eq!(unreachable.message().as_deref(), Some("request timed out"));
    }

    #[test]
    fn unreachable_poll_is_negative() {
        let reply = PollReply::unreachable(&TransportFailure::HttpStatus(503));
        assert!(!reply.exists);
        assert!(!reply.confirmed);
        assert!(reply.error.unwrap().contains("503"));
    }

    #[test]
    fn gateway_is_object_safe() {
        fn _assert(_: &dyn Gateway) {}
    }
}
