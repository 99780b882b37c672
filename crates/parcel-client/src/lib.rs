//! # parcel-client: Typed client for the parcel declaration backend
//!
//! The backend is a single action-dispatched endpoint. This crate provides:
//! - **Declarations** via [`HttpGateway`] (`submitParcelDeclaration`, `verifyParcel`)
//! - **Accounts** via [`AuthClient`] (`processLogin`, `createAccount`,
//!   `initiatePasswordReset`, `forcePasswordReset`)
//!
//! ## Architecture
//!
//! All clients share one `reqwest::Client` with the configured request
//! timeout, and one transport that speaks the action envelope. The
//! [`Gateway`] trait is the seam the submission coordinator depends on, so
//! tests can substitute an in-memory implementation.

pub mod auth;
pub mod config;
pub mod error;
pub mod gateway;
pub(crate) mod transport;

pub use auth::{ActionReply, AuthClient, AuthError};
pub use config::ClientConfig;
pub use error::{GatewayError, TransportFailure};
pub use gateway::{Gateway, HttpGateway, PollReply, SubmitReply};

use std::sync::Arc;
use std::time::Duration;

use parcel_core::{SessionToken, Validators};

/// Top-level backend client. Hands out per-concern clients sharing one
/// connection pool.
#[derive(Debug, Clone)]
pub struct ParcelClient {
    transport: transport::Transport,
    config: ClientConfig,
}

impl ParcelClient {
    /// Create a client from configuration.
    pub fn new(config: ClientConfig) -> Result<Self, GatewayError> {
        config.check()?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GatewayError::Http {
                action: "client_init".into(),
                source: e,
            })?;

        Ok(Self {
            transport: transport::Transport::new(http, config.endpoint_url.clone()),
            config,
        })
    }

    /// The configuration this client was built from.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// A declaration gateway attaching `session` to submissions.
    pub fn declarations(&self, session: Option<SessionToken>) -> HttpGateway {
        HttpGateway::new(self.transport.clone(), session)
    }

    /// An account-actions client validating inputs with `validators`.
    pub fn auth(&self, validators: Arc<Validators>) -> AuthClient {
        AuthClient::new(self.transport.clone(), validators)
    }
}
