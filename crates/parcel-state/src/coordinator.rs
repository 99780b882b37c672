//! # Submission Coordinator
//!
//! Drives one declaration attempt from raw form values to a terminal
//! outcome.
//!
//! ## Phases
//!
//! IDLE → VALIDATING → ENCODING → SUBMITTING → VERIFYING → CONFIRMED | PENDING
//!
//! Any of VALIDATING, ENCODING or SUBMITTING may end in REJECTED instead.
//! Terminal phases are sticky: a finished coordinator refuses to run again.
//!
//! ## Ambiguous submissions
//!
//! A submission that gets no usable reply (network error, timeout, bad
//! status, garbled body) may still have been written by the backend. It is
//! treated like an accepted submission and verified by polling. Only an
//! explicit backend refusal ends the attempt as REJECTED.
//!
//! ## Polling
//!
//! At most `PollPolicy::attempts` polls, strictly sequential, with
//! `PollPolicy::interval` between consecutive polls. The first poll is sent
//! as soon as the submission returns. `confirmed=true` ends the attempt as
//! CONFIRMED; running out of attempts ends it as PENDING.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use parcel_client::{ClientConfig, Gateway, SubmitReply};
use parcel_core::{
    DeclarationForm, Encoder, SessionToken, SubmissionOutcome, TrackingNumber, Validators,
};
use serde::Serialize;
use thiserror::Error;
use tracing::Instrument;
use uuid::Uuid;

// ─── Phase ───────────────────────────────────────────────────────────

/// The phase of a submission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Phase {
    /// Not started.
    Idle,
    /// Checking every field.
    Validating,
    /// Reading and encoding attachments.
    Encoding,
    /// Waiting for the submission reply.
    Submitting,
    /// Polling for confirmation.
    Verifying,
    /// Backend confirmed the declaration (terminal).
    Confirmed,
    /// Submitted, confirmation not observed in time (terminal).
    Pending,
    /// Refused locally or by the backend (terminal).
    Rejected,
}

impl Phase {
    /// Whether this phase is terminal (no further transitions).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Confirmed | Self::Pending | Self::Rejected)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Idle => "IDLE",
            Self::Validating => "VALIDATING",
            Self::Encoding => "ENCODING",
            Self::Submitting => "SUBMITTING",
            Self::Verifying => "VERIFYING",
            Self::Confirmed => "CONFIRMED",
            Self::Pending => "PENDING",
            Self::Rejected => "REJECTED",
        };
        f.write_str(s)
    }
}

// ─── Errors ──────────────────────────────────────────────────────────

/// Errors from driving a coordinator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoordinatorError {
    /// The coordinator already produced an outcome.
    #[error("submission attempt {attempt_id} already finished as {phase}")]
    AlreadyFinished {
        /// The attempt identifier.
        attempt_id: Uuid,
        /// The terminal phase reached.
        phase: Phase,
    },
}

// ─── Context ─────────────────────────────────────────────────────────

/// Bounds for confirmation polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Maximum number of polls.
    pub attempts: u32,
    /// Delay between consecutive polls.
    pub interval: Duration,
}

impl PollPolicy {
    /// Policy with the given bounds.
    pub fn new(attempts: u32, interval: Duration) -> Self {
        Self { attempts, interval }
    }
}

impl From<&ClientConfig> for PollPolicy {
    fn from(config: &ClientConfig) -> Self {
        Self {
            attempts: config.poll_attempts,
            interval: Duration::from_millis(config.poll_interval_ms),
        }
    }
}

/// Everything an attempt needs besides the gateway, passed in explicitly.
#[derive(Debug, Clone)]
pub struct SubmissionContext {
    /// Field validators, shared with the form.
    pub validators: Arc<Validators>,
    /// Confirmation polling bounds.
    pub poll: PollPolicy,
    /// Logged-in session. Its phone fills a blank phone field.
    pub session: Option<SessionToken>,
}

/// Record of a phase transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhaseTransition {
    /// Phase before the transition.
    pub from: Phase,
    /// Phase after the transition.
    pub to: Phase,
    /// When the transition occurred.
    pub timestamp: DateTime<Utc>,
}

// ─── Coordinator ─────────────────────────────────────────────────────

/// Runs one declaration attempt.
///
/// One coordinator per attempt. The gateway is shared; nothing else is.
pub struct SubmissionCoordinator {
    gateway: Arc<dyn Gateway>,
    context: SubmissionContext,
    attempt_id: Uuid,
    phase: Phase,
    transitions: Vec<PhaseTransition>,
    outcome: Option<SubmissionOutcome>,
}

impl std::fmt::Debug for SubmissionCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubmissionCoordinator")
            .field("attempt_id", &self.attempt_id)
            .field("phase", &self.phase)
            .field("outcome", &self.outcome)
            .finish_non_exhaustive()
    }
}

impl SubmissionCoordinator {
    /// A fresh coordinator in IDLE.
    pub fn new(gateway: Arc<dyn Gateway>, context: SubmissionContext) -> Self {
        Self {
            gateway,
            context,
            attempt_id: Uuid::new_v4(),
            phase: Phase::Idle,
            transitions: Vec::new(),
            outcome: None,
        }
    }

    /// Identifier attached to every log line of this attempt.
    pub fn attempt_id(&self) -> Uuid {
        self.attempt_id
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Every transition so far, oldest first.
    pub fn transitions(&self) -> &[PhaseTransition] {
        &self.transitions
    }

    /// The outcome, once terminal.
    pub fn outcome(&self) -> Option<&SubmissionOutcome> {
        self.outcome.as_ref()
    }

    /// Run the attempt to completion.
    ///
    /// Always returns an outcome on the first call. Validation and encoding
    /// failures are outcomes, not errors.
    pub async fn run(&mut self, form: &DeclarationForm) -> Result<SubmissionOutcome, CoordinatorError> {
        if self.phase != Phase::Idle {
            return Err(CoordinatorError::AlreadyFinished {
                attempt_id: self.attempt_id,
                phase: self.phase,
            });
        }
        let span = tracing::info_span!("submission", attempt_id = %self.attempt_id);
        Ok(self.drive(form).instrument(span).await)
    }

    async fn drive(&mut self, form: &DeclarationForm) -> SubmissionOutcome {
        self.transition(Phase::Validating);
        let form = self.with_session_phone(form);
        let validators = Arc::clone(&self.context.validators);
        let validated = match validators.validate_declaration(&form) {
            Ok(v) => v,
            Err(e) => {
                tracing::info!(error = %e, "declaration failed validation");
                return self.finish(SubmissionOutcome::Rejected(e.to_string()));
            }
        };

        self.transition(Phase::Encoding);
        let encoder = Encoder::new(validators.rules());
        let files = match try_join_all(form.attachments.iter().map(|a| encoder.encode(a))).await {
            Ok(files) => files,
            Err(e) => {
                tracing::info!(error = %e, "attachment encoding failed");
                return self.finish(SubmissionOutcome::Rejected(e.to_string()));
            }
        };
        let payload = validated.into_payload(files);
        let tracking_number = payload.tracking_number().clone();

        self.transition(Phase::Submitting);
        match self.gateway.submit(&payload).await {
            SubmitReply::Rejected { message } => {
                tracing::info!(%tracking_number, %message, "backend rejected declaration");
                return self.finish(SubmissionOutcome::Rejected(message));
            }
            SubmitReply::Accepted { message, .. } => {
                tracing::info!(%tracking_number, message = message.as_deref().unwrap_or(""), "backend accepted declaration");
            }
            SubmitReply::Unreachable(failure) => {
                tracing::warn!(%tracking_number, %failure, "submission outcome unknown, verifying");
            }
        }

        self.transition(Phase::Verifying);
        if self.verify(&tracking_number).await {
            self.finish(SubmissionOutcome::Confirmed(tracking_number))
        } else {
            self.finish(SubmissionOutcome::Pending(tracking_number))
        }
    }

    /// Poll until confirmed or out of attempts.
    async fn verify(&self, tracking_number: &TrackingNumber) -> bool {
        let PollPolicy { attempts, interval } = self.context.poll;
        for attempt in 1..=attempts {
            if attempt > 1 {
                tokio::time::sleep(interval).await;
            }
            let reply = self.gateway.poll(tracking_number).await;
            tracing::debug!(
                attempt,
                attempts,
                exists = reply.exists,
                confirmed = reply.confirmed,
                error = reply.error.as_deref().unwrap_or(""),
                "verification poll"
            );
            if reply.confirmed {
                return true;
            }
        }
        false
    }

    fn with_session_phone(&self, form: &DeclarationForm) -> DeclarationForm {
        let mut form = form.clone();
        if form.phone.trim().is_empty() {
            if let Some(session) = &self.context.session {
                form.phone = session.subject_id().to_string();
            }
        }
        form
    }

    fn finish(&mut self, outcome: SubmissionOutcome) -> SubmissionOutcome {
        let phase = match &outcome {
            SubmissionOutcome::Confirmed(_) => Phase::Confirmed,
            SubmissionOutcome::Pending(_) => Phase::Pending,
            SubmissionOutcome::Rejected(_) => Phase::Rejected,
        };
        self.transition(phase);
        self.outcome = Some(outcome.clone());
        outcome
    }

    fn transition(&mut self, to: Phase) {
        tracing::info!(from = %self.phase, %to, "submission phase");
        self.transitions.push(PhaseTransition {
            from: self.phase,
            to,
            timestamp: Utc::now(),
        });
        self.phase = to;
    }
}
