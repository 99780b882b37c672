//! # Field Validators
//!
//! Pure predicates for every declaration and account field. No I/O, no
//! side effects; the same input always yields the same verdict.
//!
//! Each field has two views:
//!
//! - a `parse_*`/`check_*` method returning `Result<_, ValidationError>`
//!   with the canonical typed value, used by the submission pipeline;
//! - a [`Verdict`] method (`phone`, `password`, ...) returning
//!   `{valid, message}`, used by UI shells for per-field feedback.
//!
//! The empty string is always invalid. Pristine (never touched) fields and
//! invalid fields are not distinguished.

use regex::Regex;
use serde::Serialize;

use crate::category::{self, ItemCategory};
use crate::declaration::{AttachmentSource, DeclarationForm, TrackingNumber, ValidatedDeclaration};
use crate::error::{RulesError, ValidationError};
use crate::rules::ValidationRules;

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

/// Outcome of validating one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    /// Whether the field is acceptable.
    pub valid: bool,
    /// Why not, when invalid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Verdict {
    /// A passing verdict.
    pub fn ok() -> Self {
        Self {
            valid: true,
            message: None,
        }
    }

    /// A failing verdict carrying the error's message.
    pub fn fail(error: &ValidationError) -> Self {
        Self {
            valid: false,
            message: Some(error.to_string()),
        }
    }
}

impl<T> From<Result<T, ValidationError>> for Verdict {
    fn from(result: Result<T, ValidationError>) -> Self {
        match result {
            Ok(_) => Self::ok(),
            Err(e) => Self::fail(&e),
        }
    }
}

/// Validators compiled from a [`ValidationRules`] table.
#[derive(Debug, Clone)]
pub struct Validators {
    rules: ValidationRules,
    phone: Regex,
    email: Regex,
    tracking: Regex,
}

impl Validators {
    /// Check and compile a rules table.
    pub fn new(rules: ValidationRules) -> Result<Self, RulesError> {
        rules.check()?;

        let alternatives: Vec<String> = rules
            .phone_formats
            .iter()
            .map(|f| {
                let prefixes: Vec<String> = f.prefixes.iter().map(|p| regex::escape(p)).collect();
                format!(
                    "(?:{})[0-9]{{{},{}}}",
                    prefixes.join("|"),
                    f.min_subscriber_digits,
                    f.max_subscriber_digits
                )
            })
            .collect();
        let phone = Regex::new(&format!("^(?:{})$", alternatives.join("|")))
            .map_err(|e| RulesError::Pattern {
                rule: "phoneFormats",
                source: e,
            })?;

        let email = Regex::new(EMAIL_PATTERN).map_err(|e| RulesError::Pattern {
            rule: "email",
            source: e,
        })?;

        let tracking = Regex::new(&format!("^[A-Z0-9-]{{{},}}$", rules.tracking_min_length))
            .map_err(|e| RulesError::Pattern {
                rule: "trackingMinLength",
                source: e,
            })?;

        Ok(Self {
            rules,
            phone,
            email,
            tracking,
        })
    }

    /// The rules this instance was compiled from.
    pub fn rules(&self) -> &ValidationRules {
        &self.rules
    }

    // ── Result views ─────────────────────────────────────────────────

    /// Validate a phone number, returning it with separators removed.
    pub fn parse_phone(&self, raw: &str) -> Result<String, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Required { field: "phone" });
        }
        let normalized: String = trimmed
            .strip_prefix('+')
            .unwrap_or(trimmed)
            .chars()
            .filter(|c| *c != ' ' && *c != '-')
            .collect();
        if self.phone.is_match(&normalized) {
            Ok(normalized)
        } else {
            Err(ValidationError::InvalidPhone(trimmed.to_string()))
        }
    }

    /// Check password strength. Passwords are never trimmed.
    pub fn check_password(&self, raw: &str) -> Result<(), ValidationError> {
        if raw.is_empty() {
            return Err(ValidationError::Required { field: "password" });
        }
        let long_enough = raw.chars().count() >= self.rules.password_min_length;
        let has_upper = raw.chars().any(|c| c.is_ascii_uppercase());
        let has_digit = raw.chars().any(|c| c.is_ascii_digit());
        if long_enough && has_upper && has_digit {
            Ok(())
        } else {
            Err(ValidationError::WeakPassword {
                min_length: self.rules.password_min_length,
            })
        }
    }

    /// Validate an email address, returning it trimmed.
    pub fn parse_email(&self, raw: &str) -> Result<String, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Required { field: "email" });
        }
        if self.email.is_match(trimmed) {
            Ok(trimmed.to_string())
        } else {
            Err(ValidationError::InvalidEmail(trimmed.to_string()))
        }
    }

    /// Validate and canonicalise a tracking number (trimmed, upper-cased).
    pub fn parse_tracking_number(&self, raw: &str) -> Result<TrackingNumber, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Required {
                field: "tracking number",
            });
        }
        let canonical = trimmed.to_ascii_uppercase();
        if self.tracking.is_match(&canonical) {
            Ok(TrackingNumber::from_canonical(canonical))
        } else {
            Err(ValidationError::InvalidTrackingNumber {
                value: trimmed.to_string(),
                min_length: self.rules.tracking_min_length,
            })
        }
    }

    /// Parse an integer quantity within the configured bounds.
    pub fn parse_quantity(&self, raw: &str) -> Result<u32, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Required { field: "quantity" });
        }
        let err = ValidationError::InvalidQuantity {
            min: self.rules.quantity_min,
            max: self.rules.quantity_max,
        };
        let value: u32 = trimmed.parse().map_err(|_| err.clone())?;
        if (self.rules.quantity_min..=self.rules.quantity_max).contains(&value) {
            Ok(value)
        } else {
            Err(err)
        }
    }

    /// Parse a finite price within the configured bounds.
    pub fn parse_price(&self, raw: &str) -> Result<f64, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Required { field: "price" });
        }
        let err = ValidationError::InvalidPrice {
            min: self.rules.price_min,
            max: self.rules.price_max,
        };
        let value: f64 = trimmed.parse().map_err(|_| err.clone())?;
        if value.is_finite() && value >= self.rules.price_min && value <= self.rules.price_max {
            Ok(value)
        } else {
            Err(err)
        }
    }

    /// Resolve a category label against the catalogue.
    pub fn parse_category(&self, raw: &str) -> Result<&'static ItemCategory, ValidationError> {
        if raw.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "item category",
            });
        }
        category::find(raw).ok_or_else(|| ValidationError::UnknownCategory(raw.trim().to_string()))
    }

    /// Validate the item description.
    pub fn parse_item_description(&self, raw: &str) -> Result<String, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Required {
                field: "item description",
            });
        }
        if trimmed.chars().count() > self.rules.description_max_length {
            return Err(ValidationError::TooLong {
                field: "item description",
                max_length: self.rules.description_max_length,
            });
        }
        Ok(trimmed.to_string())
    }

    /// Validate the collection point.
    pub fn parse_collection_point(&self, raw: &str) -> Result<String, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Required {
                field: "collection point",
            });
        }
        Ok(trimmed.to_string())
    }

    /// Check the attachment set against the category.
    ///
    /// Starred categories need `1..=max_attachments` files. Every file,
    /// starred or not, must respect the size limit and the MIME allow-list.
    pub fn check_attachments(
        &self,
        category_label: &str,
        files: &[AttachmentSource],
    ) -> Result<(), ValidationError> {
        if let Some(cat) = category::find(category_label).filter(|c| c.starred) {
            if files.is_empty() || files.len() > self.rules.max_attachments {
                return Err(ValidationError::AttachmentCount {
                    category: cat.label.to_string(),
                    count: files.len(),
                    max: self.rules.max_attachments,
                });
            }
        }
        for file in files {
            if file.size_bytes > self.rules.max_attachment_bytes {
                return Err(ValidationError::AttachmentTooLarge {
                    name: file.name.clone(),
                    size_bytes: file.size_bytes,
                    max_bytes: self.rules.max_attachment_bytes,
                });
            }
            if !self.rules.allows_mime_type(&file.mime_type) {
                return Err(ValidationError::AttachmentType {
                    name: file.name.clone(),
                    mime_type: file.mime_type.clone(),
                });
            }
        }
        Ok(())
    }

    /// Run every declaration validator in form order and return the first
    /// failure, or the typed declaration.
    pub fn validate_declaration(
        &self,
        form: &DeclarationForm,
    ) -> Result<ValidatedDeclaration, ValidationError> {
        let tracking_number = self.parse_tracking_number(&form.tracking_number)?;
        let phone = self.parse_phone(&form.phone)?;
        let item_description = self.parse_item_description(&form.item_description)?;
        let quantity = self.parse_quantity(&form.quantity)?;
        let price = self.parse_price(&form.price)?;
        let collection_point = self.parse_collection_point(&form.collection_point)?;
        let item_category = self.parse_category(&form.item_category)?;
        self.check_attachments(item_category.label, &form.attachments)?;

        Ok(ValidatedDeclaration {
            tracking_number,
            phone,
            item_description,
            quantity,
            price,
            collection_point,
            item_category,
        })
    }

    // ── Verdict views ────────────────────────────────────────────────

    /// Phone verdict.
    pub fn phone(&self, raw: &str) -> Verdict {
        self.parse_phone(raw).into()
    }

    /// Password verdict.
    pub fn password(&self, raw: &str) -> Verdict {
        self.check_password(raw).into()
    }

    /// Email verdict.
    pub fn email(&self, raw: &str) -> Verdict {
        self.parse_email(raw).into()
    }

    /// Tracking number verdict.
    pub fn tracking_number(&self, raw: &str) -> Verdict {
        self.parse_tracking_number(raw).into()
    }

    /// Quantity verdict.
    pub fn quantity(&self, raw: &str) -> Verdict {
        self.parse_quantity(raw).into()
    }

    /// Price verdict.
    pub fn price(&self, raw: &str) -> Verdict {
        self.parse_price(raw).into()
    }

    /// Category verdict.
    pub fn category(&self, raw: &str) -> Verdict {
        self.parse_category(raw).into()
    }

    /// Item-description verdict.
    pub fn item_description(&self, raw: &str) -> Verdict {
        self.parse_item_description(raw).into()
    }

    /// Collection-point verdict.
    pub fn collection_point(&self, raw: &str) -> Verdict {
        self.parse_collection_point(raw).into()
    }

    /// Attachment-set verdict.
    pub fn attachments(&self, category_label: &str, files: &[AttachmentSource]) -> Verdict {
        self.check_attachments(category_label, files).into()
    }
}
