//! # Attachment Encoder
//!
//! Turns a selected [`AttachmentSource`] into an [`AttachmentDescriptor`]
//! carrying the whole file as standard padded base64. Content is read fully
//! into memory; there is no streaming.
//!
//! Each call is independent: a failed read affects only that attachment.
//! Aborting the submission on the first failure is the caller's decision.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::declaration::{AttachmentContent, AttachmentDescriptor, AttachmentSource};
use crate::error::EncodingError;
use crate::rules::ValidationRules;

/// Name used when sanitising leaves nothing usable.
const FALLBACK_NAME: &str = "attachment";

/// Encodes attachments under the size and type limits of a rules table.
#[derive(Debug, Clone)]
pub struct Encoder {
    max_bytes: u64,
    allowed_mime_types: Vec<String>,
}

impl Encoder {
    /// Build an encoder enforcing the attachment limits of `rules`.
    pub fn new(rules: &ValidationRules) -> Self {
        Self {
            max_bytes: rules.max_attachment_bytes,
            allowed_mime_types: rules.allowed_mime_types.clone(),
        }
    }

    /// Read and encode one attachment.
    ///
    /// The size limit is checked against the bytes actually read, since the
    /// file may have changed after it was selected.
    pub async fn encode(
        &self,
        source: &AttachmentSource,
    ) -> Result<AttachmentDescriptor, EncodingError> {
        if !self
            .allowed_mime_types
            .iter()
            .any(|m| m.eq_ignore_ascii_case(&source.mime_type))
        {
            return Err(EncodingError::UnsupportedType {
                name: source.name.clone(),
                mime_type: source.mime_type.clone(),
            });
        }

        let bytes = match &source.content {
            AttachmentContent::File(path) => {
                tokio::fs::read(path)
                    .await
                    .map_err(|e| EncodingError::Read {
                        name: source.name.clone(),
                        source: e,
                    })?
            }
            AttachmentContent::Memory(bytes) => bytes.clone(),
        };

        let size_bytes = bytes.len() as u64;
        if size_bytes > self.max_bytes {
            return Err(EncodingError::TooLarge {
                name: source.name.clone(),
                size_bytes,
                max_bytes: self.max_bytes,
            });
        }

        let name = sanitize_file_name(&source.name);
        tracing::debug!(
            attachment = %name,
            mime_type = %source.mime_type,
            size_bytes,
            "encoded attachment"
        );

        Ok(AttachmentDescriptor {
            name,
            mime_type: source.mime_type.to_ascii_lowercase(),
            size_bytes,
            encoded_data: STANDARD.encode(&bytes),
        })
    }
}

/// Recover the original bytes of an encoded attachment.
pub fn decode(descriptor: &AttachmentDescriptor) -> Result<Vec<u8>, EncodingError> {
    STANDARD
        .decode(descriptor.encoded_data.as_bytes())
        .map_err(|e| EncodingError::Decode {
            name: descriptor.name.clone(),
            source: e,
        })
}

/// Restrict a file name to `[A-Za-z0-9._-]`, replacing anything else with
/// `_`. Names that sanitise to nothing but dots and underscores become
/// `attachment`.
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.chars().all(|c| c == '.' || c == '_') {
        FALLBACK_NAME.to_string()
    } else {
        cleaned
    }
}
