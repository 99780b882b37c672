//! # Declaration Types
//!
//! The values that flow through the submission pipeline:
//!
//! ```text
//! DeclarationForm ──validate──▶ ValidatedDeclaration ──+ attachments──▶ DeclarationPayload
//!   (raw strings)                 (typed, canonical)      (encoded)       (sent once)
//! ```
//!
//! A [`DeclarationPayload`] can only be produced from a
//! [`ValidatedDeclaration`], so nothing unvalidated reaches the wire.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::category::ItemCategory;

/// A canonical (trimmed, upper-cased) parcel tracking number.
///
/// Construct through [`Validators::parse_tracking_number`](crate::Validators::parse_tracking_number),
/// which applies the configured length rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TrackingNumber(String);

impl TrackingNumber {
    pub(crate) fn from_canonical(value: String) -> Self {
        Self(value)
    }

    /// Access the canonical string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackingNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TrackingNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Where the bytes of a selected attachment live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachmentContent {
    /// A file on disk, read in full at encoding time.
    File(PathBuf),
    /// Bytes already held in memory.
    Memory(Vec<u8>),
}

/// A file the user selected, before encoding.
///
/// Metadata is captured at selection time so the attachment rule can be
/// checked without reading the content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentSource {
    /// Original file name as selected.
    pub name: String,
    /// MIME type (guessed from the extension for files on disk).
    pub mime_type: String,
    /// Size reported at selection time.
    pub size_bytes: u64,
    /// Content location.
    pub content: AttachmentContent,
}

impl AttachmentSource {
    /// Describe a file on disk. The MIME type is guessed from the extension.
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let metadata = tokio::fs::metadata(path).await?;
        if !metadata.is_file() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("{} is not a regular file", path.display()),
            ));
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let mime_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Ok(Self {
            name,
            mime_type,
            size_bytes: metadata.len(),
            content: AttachmentContent::File(path.to_path_buf()),
        })
    }

    /// Describe in-memory content.
    pub fn from_bytes(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            size_bytes: bytes.len() as u64,
            content: AttachmentContent::Memory(bytes),
        }
    }
}

/// An attachment converted to transport-safe text. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentDescriptor {
    /// Sanitised file name.
    pub name: String,
    /// MIME type.
    pub mime_type: String,
    /// Size of the original content in bytes.
    #[serde(rename = "size")]
    pub size_bytes: u64,
    /// Standard padded base64 of the full content.
    #[serde(rename = "data")]
    pub encoded_data: String,
}

/// Raw field values as collected by the UI shell.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeclarationForm {
    /// Tracking number as typed.
    pub tracking_number: String,
    /// Contact phone number as typed.
    pub phone: String,
    /// Free-text description of the contents.
    pub item_description: String,
    /// Item count as typed.
    pub quantity: String,
    /// Declared value as typed.
    pub price: String,
    /// Pickup location chosen by the user.
    pub collection_point: String,
    /// Category label as selected.
    pub item_category: String,
    /// Selected attachments.
    pub attachments: Vec<AttachmentSource>,
}

/// A declaration whose fields passed every validator, awaiting encoded
/// attachments.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedDeclaration {
    /// Canonical tracking number.
    pub tracking_number: TrackingNumber,
    /// Phone number with separators removed.
    pub phone: String,
    /// Trimmed description.
    pub item_description: String,
    /// Parsed quantity.
    pub quantity: u32,
    /// Parsed price.
    pub price: f64,
    /// Trimmed collection point.
    pub collection_point: String,
    /// Catalogue entry.
    pub item_category: &'static ItemCategory,
}

impl ValidatedDeclaration {
    /// Attach the encoded files and freeze the payload.
    pub fn into_payload(self, attachments: Vec<AttachmentDescriptor>) -> DeclarationPayload {
        DeclarationPayload {
            tracking_number: self.tracking_number,
            phone: self.phone,
            item_description: self.item_description,
            quantity: self.quantity,
            price: self.price,
            collection_point: self.collection_point,
            item_category: self.item_category.label,
            attachments,
        }
    }
}

/// The immutable body of one submission attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclarationPayload {
    tracking_number: TrackingNumber,
    phone: String,
    item_description: String,
    quantity: u32,
    price: f64,
    collection_point: String,
    item_category: &'static str,
    #[serde(rename = "files")]
    attachments: Vec<AttachmentDescriptor>,
}

impl DeclarationPayload {
    /// Canonical tracking number.
    pub fn tracking_number(&self) -> &TrackingNumber {
        &self.tracking_number
    }

    /// Contact phone number.
    pub fn phone(&self) -> &str {
        &self.phone
    }

    /// Declared quantity.
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Declared price.
    pub fn price(&self) -> f64 {
        self.price
    }

    /// Category label.
    pub fn item_category(&self) -> &str {
        self.item_category
    }

    /// Encoded attachments.
    pub fn attachments(&self) -> &[AttachmentDescriptor] {
        &self.attachments
    }
}

/// Terminal result of one submission attempt, consumed by the UI shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// The backend confirmed the record exists.
    Confirmed(TrackingNumber),
    /// The submission may have landed but was not confirmed in time.
    Pending(TrackingNumber),
    /// The submission was refused, locally or by the backend.
    Rejected(String),
}

impl SubmissionOutcome {
    /// Tracking number for confirmed and pending outcomes.
    pub fn tracking_number(&self) -> Option<&TrackingNumber> {
        match self {
            Self::Confirmed(tn) | Self::Pending(tn) => Some(tn),
            Self::Rejected(_) => None,
        }
    }

    /// Whether the user should be told the submission failed.
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }
}

impl fmt::Display for SubmissionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Confirmed(tn) => write!(f, "Declaration {tn} confirmed"),
            Self::Pending(tn) => write!(
                f,
                "Declaration {tn} received; confirmation pending, check back later"
            ),
            Self::Rejected(reason) => write!(f, "Submission failed: {reason}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category;

    fn validated() -> ValidatedDeclaration {
        ValidatedDeclaration {
            tracking_number: TrackingNumber::from_canonical("SPX-12345".into()),
            phone: "0123456789".into(),
            item_description: "Phone case".into(),
            quantity: 2,
            price: 19.9,
            collection_point: "Gadong".into(),
            item_category: category::find("Clothing").unwrap(),
        }
    }

    #[test]
    fn payload_serializes_with_wire_field_names() {
        let payload = validated().into_payload(vec![AttachmentDescriptor {
            name: "receipt.png".into(),
            mime_type: "image/png".into(),
            size_bytes: 3,
            encoded_data: "AQID".into(),
        }]);
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["trackingNumber"], "SPX-12345");
        assert_eq!(json["itemCategory"], "Clothing");
        assert_eq!(json["collectionPoint"], "Gadong");
        assert_eq!(json["quantity"], 2);
        assert_eq!(json["files"][0]["mimeType"], "image/png");
        assert_eq!(json["files"][0]["size"], 3);
        assert_eq!(json["files"][0]["data"], "AQID");
    }

    #[test]
    fn outcome_exposes_tracking_number_unless_rejected() {
        let tn = TrackingNumber::from_canonical("ABCDE".into());
        assert_eq!(
            SubmissionOutcome::Pending(tn.clone()).tracking_number(),
            Some(&tn)
        );
        let rejected = SubmissionOutcome::Rejected("duplicate tracking number".into());
        assert!(rejected.tracking_number().is_none());
        assert!(rejected.is_rejected());
        assert!(rejected.to_string().contains("duplicate tracking number"));
    }

    #[test]
    fn from_bytes_records_size() {
        let src = AttachmentSource::from_bytes("a.pdf", "application/pdf", vec![0; 42]);
        assert_eq!(src.size_bytes, 42);
    }

    #[tokio::test]
    async fn from_path_guesses_mime_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("receipt.jpg");
        std::fs::write(&path, [0xFF, 0xD8, 0xFF]).unwrap();
        let src = AttachmentSource::from_path(&path).await.unwrap();
        assert_eq!(src.name, "receipt.jpg");
        assert_eq!(src.mime_type, "image/jpeg");
        assert_eq!(src.size_bytes, 3);
    }

    #[tokio::test]
    async fn from_path_rejects_directories() {
        let dir = tempfile::tempdir().unwrap();
        assert!(AttachmentSource::from_path(dir.path()).await.is_err());
    }
}
