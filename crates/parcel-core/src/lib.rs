//! # parcel-core: Foundational Types for the Parcel Declaration Client
//!
//! Everything the submission pipeline needs that does not touch the network:
//!
//! - **Rules** (`rules.rs`): the versioned [`ValidationRules`] table.
//! - **Validators** (`validators.rs`): pure field predicates compiled from
//!   the rules table.
//! - **Categories** (`category.rs`): the fixed item catalogue and its starred
//!   subset.
//! - **Declarations** (`declaration.rs`): raw form, validated declaration,
//!   immutable payload and terminal outcome types.
//! - **Encoder** (`encoder.rs`): attachment to base64 conversion.
//! - **Session** (`session.rs`): the opaque login credential.
//!
//! ## Crate Policy
//!
//! - No network I/O. Filesystem access is limited to loading a rules file
//!   (`ValidationRules::from_path`), reading attachment metadata, and reading
//!   attachment contents in the encoder.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod category;
pub mod declaration;
pub mod encoder;
pub mod error;
pub mod rules;
pub mod session;
pub mod validators;

pub use category::{ItemCategory, CATALOGUE};
pub use declaration::{
    AttachmentContent, AttachmentDescriptor, AttachmentSource, DeclarationForm,
    DeclarationPayload, SubmissionOutcome, TrackingNumber, ValidatedDeclaration,
};
pub use encoder::Encoder;
pub use error::{EncodingError, RulesError, ValidationError};
pub use rules::{PhoneFormat, ValidationRules, RULES_VERSION};
pub use session::SessionToken;
pub use validators::{Validators, Verdict};
