//! # Error Types
//!
//! Errors raised by the foundational layer. All errors use `thiserror`.
//!
//! - [`ValidationError`] is field-level and always recoverable by editing
//!   the offending input. Its `Display` text is the message shown to the user.
//! - [`EncodingError`] covers attachment read/transform failures and is
//!   recoverable by reselecting files.
//! - [`RulesError`] is raised when a validation rules table cannot be loaded.

use thiserror::Error;

/// A client-detected problem with a single form field.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A required field was left blank.
    #[error("{field} is required")]
    Required {
        /// Human-readable field label.
        field: &'static str,
    },

    /// Phone number matches none of the configured formats.
    #[error("phone number {0:?} does not match any accepted format")]
    InvalidPhone(String),

    /// Password does not satisfy the strength policy.
    #[error("password must be at least {min_length} characters and contain an uppercase letter and a digit")]
    WeakPassword {
        /// Configured minimum length.
        min_length: usize,
    },

    /// Email address is not of the `local@domain.tld` shape.
    #[error("email address {0:?} is not valid")]
    InvalidEmail(String),

    /// Tracking number is too short or contains disallowed characters.
    #[error("tracking number {value:?} must be at least {min_length} characters of letters, digits or hyphens")]
    InvalidTrackingNumber {
        /// The rejected input.
        value: String,
        /// Configured minimum length.
        min_length: usize,
    },

    /// Quantity is not an integer within bounds.
    #[error("quantity must be a whole number between {min} and {max}")]
    InvalidQuantity {
        /// Lower bound (inclusive).
        min: u32,
        /// Upper bound (inclusive).
        max: u32,
    },

    /// Price is not a finite number within bounds.
    #[error("price must be a number between {min} and {max}")]
    InvalidPrice {
        /// Lower bound (inclusive).
        min: f64,
        /// Upper bound (inclusive).
        max: f64,
    },

    /// Free-text field exceeds its maximum length.
    #[error("{field} must be at most {max_length} characters")]
    TooLong {
        /// Human-readable field label.
        field: &'static str,
        /// Configured maximum length.
        max_length: usize,
    },

    /// Category is not in the catalogue.
    #[error("unknown item category {0:?}")]
    UnknownCategory(String),

    /// A starred category was submitted with too few or too many files.
    #[error("category {category:?} requires between 1 and {max} proof-of-purchase attachments, got {count}")]
    AttachmentCount {
        /// The starred category.
        category: String,
        /// Number of files selected.
        count: usize,
        /// Configured maximum.
        max: usize,
    },

    /// An individual attachment is larger than the configured limit.
    #[error("attachment {name:?} is {size_bytes} bytes; the limit is {max_bytes} bytes")]
    AttachmentTooLarge {
        /// Attachment file name.
        name: String,
        /// Actual size.
        size_bytes: u64,
        /// Configured limit.
        max_bytes: u64,
    },

    /// An individual attachment has a MIME type outside the allowed set.
    #[error("attachment {name:?} has unsupported type {mime_type}")]
    AttachmentType {
        /// Attachment file name.
        name: String,
        /// Detected MIME type.
        mime_type: String,
    },
}

/// Failure to turn a selected file into an [`AttachmentDescriptor`](crate::AttachmentDescriptor).
#[derive(Error, Debug)]
pub enum EncodingError {
    /// The file could not be read.
    #[error("failed to read attachment {name:?}: {source}")]
    Read {
        /// Attachment file name.
        name: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The content read is larger than the configured limit.
    #[error("attachment {name:?} grew to {size_bytes} bytes, above the {max_bytes} byte limit")]
    TooLarge {
        /// Attachment file name.
        name: String,
        /// Bytes actually read.
        size_bytes: u64,
        /// Configured limit.
        max_bytes: u64,
    },

    /// The MIME type is not accepted.
    #[error("attachment {name:?} has unsupported type {mime_type}")]
    UnsupportedType {
        /// Attachment file name.
        name: String,
        /// Detected MIME type.
        mime_type: String,
    },

    /// The encoded text is not valid base64.
    #[error("attachment {name:?} is not valid base64: {source}")]
    Decode {
        /// Attachment file name.
        name: String,
        /// Underlying decoder error.
        source: base64::DecodeError,
    },
}

/// Failure to load or compile a validation rules table.
#[derive(Error, Debug)]
pub enum RulesError {
    /// Rules file could not be read.
    #[error("failed to read rules file {path}: {source}")]
    Io {
        /// Path that was read.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Rules file is not valid JSON.
    #[error("invalid JSON rules: {0}")]
    Json(#[from] serde_json::Error),

    /// Rules file is not valid YAML.
    #[error("invalid YAML rules: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Rules declare a version this build does not understand.
    #[error("unsupported rules version {found}; expected {expected}")]
    UnsupportedVersion {
        /// Version found in the file.
        found: u32,
        /// Version this build supports.
        expected: u32,
    },

    /// A rule is internally inconsistent (e.g. min greater than max).
    #[error("inconsistent rule {rule}: {reason}")]
    Inconsistent {
        /// Name of the offending rule.
        rule: &'static str,
        /// Description of the problem.
        reason: String,
    },

    /// A configured pattern failed to compile.
    #[error("invalid pattern for {rule}: {source}")]
    Pattern {
        /// Name of the offending rule.
        rule: &'static str,
        /// Regex compilation error.
        source: regex::Error,
    },
}
