//! # parcel-state: Submission State Machines
//!
//! - **Form** (`form.rs`): [`SubmissionState`], the INCOMPLETE/READY gate
//!   over per-field verdicts that the UI shell consults while the user
//!   edits.
//! - **Coordinator** (`coordinator.rs`): [`SubmissionCoordinator`], which
//!   takes one attempt through validation, encoding, submission and bounded
//!   confirmation polling to a [`SubmissionOutcome`](parcel_core::SubmissionOutcome).
//!
//! Phases are plain enums with a recorded transition history. The
//! coordinator owns its phase; nothing is shared between attempts except
//! the gateway.

pub mod coordinator;
pub mod form;

pub use coordinator::{
    CoordinatorError, Phase, PhaseTransition, PollPolicy, SubmissionContext, SubmissionCoordinator,
};
pub use form::{Field, FieldValue, Readiness, SubmissionState};
