//! # parcel-cli: Command-Line Shell for the Parcel Declaration Client
//!
//! Provides the `parcel` binary. It plays the part of the UI shell: it
//! collects raw field values, shows per-field feedback, owns the session
//! file, and reports outcomes.
//!
//! ## Subcommands
//!
//! - `parcel login | register | recover | reset-password | logout | whoami`
//! - `parcel categories`
//! - `parcel declare`: submit a declaration and wait for confirmation.
//! - `parcel verify`: check a declaration once.
//!
//! ```bash
//! export PARCEL_ENDPOINT_URL=https://backend.example/exec
//! parcel login --phone 0123456789 --password 'Secret12'
//! parcel declare --tracking-number SPX123456 --item-description "Phone case" \
//!     --quantity 1 --price 25 --collection-point Gadong --category "Mobile Phones" \
//!     --attach receipt.pdf
//! ```
//!
//! ## Crate Policy
//!
//! - Argument parsing lives here; validation, submission and polling live
//!   in the library crates.
//! - Handlers return the process exit code; `anyhow` errors are reported by
//!   `main` and exit with 1.

pub mod account;
pub mod declare;
pub mod session_store;
pub mod settings;
