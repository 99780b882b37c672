//! # Submission Readiness Gate
//!
//! Tracks the raw value and verdict of every declaration field as the user
//! edits them, and reports whether the form as a whole may be submitted.
//!
//! ## States
//!
//! INCOMPLETE ⇄ READY
//!
//! The form is READY iff every field is valid, including the attachment
//! rule. Every edit re-validates the edited field and may flip the state.
//! Changing the category re-evaluates the attachment rule, since the
//! starred categories need proof of purchase.
//!
//! Blank fields are invalid from the start; there is no separate "pristine"
//! state.

use std::sync::Arc;

use parcel_core::{AttachmentSource, DeclarationForm, Validators, Verdict};
use serde::Serialize;

/// A text field of the declaration form, in form order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    /// Courier tracking number.
    TrackingNumber,
    /// Contact phone of the recipient.
    Phone,
    /// Free-text description of the contents.
    ItemDescription,
    /// Number of items.
    Quantity,
    /// Declared value.
    Price,
    /// Where the parcel will be picked up.
    CollectionPoint,
    /// Catalogue label.
    ItemCategory,
}

impl Field {
    /// Every text field, in form order.
    pub const ALL: [Field; 7] = [
        Field::TrackingNumber,
        Field::Phone,
        Field::ItemDescription,
        Field::Quantity,
        Field::Price,
        Field::CollectionPoint,
        Field::ItemCategory,
    ];

    fn index(self) -> usize {
        self as usize
    }

    /// Label shown next to per-field feedback.
    pub fn label(&self) -> &'static str {
        match self {
            Self::TrackingNumber => "tracking number",
            Self::Phone => "phone",
            Self::ItemDescription => "item description",
            Self::Quantity => "quantity",
            Self::Price => "price",
            Self::CollectionPoint => "collection point",
            Self::ItemCategory => "item category",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Raw input of one field together with its latest verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldValue {
    /// Value exactly as entered.
    pub raw: String,
    /// Whether `raw` passed its validator.
    pub valid: bool,
    /// Validator message when invalid.
    pub message: Option<String>,
}

impl FieldValue {
    fn judged(raw: String, verdict: Verdict) -> Self {
        Self {
            raw,
            valid: verdict.valid,
            message: verdict.message,
        }
    }
}

/// Whether the form may be submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Readiness {
    /// At least one field is invalid.
    Incomplete,
    /// Every field, and the attachment rule, is satisfied.
    Ready,
}

impl std::fmt::Display for Readiness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Incomplete => f.write_str("INCOMPLETE"),
            Self::Ready => f.write_str("READY"),
        }
    }
}

/// Incrementally validated declaration form.
#[derive(Debug, Clone)]
pub struct SubmissionState {
    validators: Arc<Validators>,
    fields: [FieldValue; Field::ALL.len()],
    attachments: Vec<AttachmentSource>,
    attachment_verdict: Verdict,
    readiness: Readiness,
}

impl SubmissionState {
    /// An empty form. Every text field starts blank and therefore invalid.
    pub fn new(validators: Arc<Validators>) -> Self {
        let fields = Field::ALL.map(|f| FieldValue::judged(String::new(), judge(&validators, f, "")));
        let mut state = Self {
            validators,
            fields,
            attachments: Vec::new(),
            attachment_verdict: Verdict::ok(),
            readiness: Readiness::Incomplete,
        };
        state.reevaluate_attachments();
        state
    }

    /// A form pre-filled from raw values.
    pub fn from_form(validators: Arc<Validators>, form: &DeclarationForm) -> Self {
        let mut state = Self::new(validators);
        state.update(Field::TrackingNumber, form.tracking_number.as_str());
        state.update(Field::Phone, form.phone.as_str());
        state.update(Field::ItemDescription, form.item_description.as_str());
        state.update(Field::Quantity, form.quantity.as_str());
        state.update(Field::Price, form.price.as_str());
        state.update(Field::CollectionPoint, form.collection_point.as_str());
        state.update(Field::ItemCategory, form.item_category.as_str());
        state.set_attachments(form.attachments.clone());
        state
    }

    /// Record a new raw value for `field` and re-validate it.
    pub fn update(&mut self, field: Field, raw: impl Into<String>) -> &FieldValue {
        let raw = raw.into();
        let verdict = judge(&self.validators, field, &raw);
        self.fields[field.index()] = FieldValue::judged(raw, verdict);
        if field == Field::ItemCategory {
            self.reevaluate_attachments();
        }
        self.refresh_readiness();
        &self.fields[field.index()]
    }

    /// Replace the attachment selection and re-check the attachment rule.
    pub fn set_attachments(&mut self, files: Vec<AttachmentSource>) -> &Verdict {
        self.attachments = files;
        self.reevaluate_attachments();
        self.refresh_readiness();
        &self.attachment_verdict
    }

    /// Current value and verdict of `field`.
    pub fn field(&self, field: Field) -> &FieldValue {
        &self.fields[field.index()]
    }

    /// Verdict of the attachment rule for the current category.
    pub fn attachment_verdict(&self) -> &Verdict {
        &self.attachment_verdict
    }

    /// Current attachment selection.
    pub fn attachments(&self) -> &[AttachmentSource] {
        &self.attachments
    }

    /// Current readiness.
    pub fn readiness(&self) -> Readiness {
        self.readiness
    }

    /// True iff every field and the attachment rule are satisfied.
    ///
    /// Pure: repeated calls without edits agree.
    pub fn is_submittable(&self) -> bool {
        self.readiness == Readiness::Ready
    }

    /// Invalid text fields with their messages, in form order.
    pub fn invalid_fields(&self) -> Vec<(Field, &str)> {
        Field::ALL
            .iter()
            .zip(&self.fields)
            .filter(|(_, v)| !v.valid)
            .map(|(f, v)| (*f, v.message.as_deref().unwrap_or("invalid")))
            .collect()
    }

    /// The first problem in form order, attachments last.
    pub fn first_error(&self) -> Option<String> {
        if let Some((_, message)) = self.invalid_fields().into_iter().next() {
            return Some(message.to_string());
        }
        if !self.attachment_verdict.valid {
            return Some(
                self.attachment_verdict
                    .message
                    .clone()
                    .unwrap_or_else(|| "attachments are invalid".into()),
            );
        }
        None
    }

    /// The raw values as a form for the coordinator.
    pub fn to_form(&self) -> DeclarationForm {
        let raw = |f: Field| self.fields[f.index()].raw.clone();
        DeclarationForm {
            tracking_number: raw(Field::TrackingNumber),
            phone: raw(Field::Phone),
            item_description: raw(Field::ItemDescription),
            quantity: raw(Field::Quantity),
            price: raw(Field::Price),
            collection_point: raw(Field::CollectionPoint),
            item_category: raw(Field::ItemCategory),
            attachments: self.attachments.clone(),
        }
    }

    fn reevaluate_attachments(&mut self) {
        let category = &self.fields[Field::ItemCategory.index()].raw;
        self.attachment_verdict = self.validators.attachments(category, &self.attachments);
    }

    fn refresh_readiness(&mut self) {
        let ready = self.attachment_verdict.valid && self.fields.iter().all(|v| v.valid);
        let next = if ready {
            Readiness::Ready
        } else {
            Readiness::Incomplete
        };
        if next != self.readiness {
            tracing::debug!(from = %self.readiness, to = %next, "form readiness changed");
            self.readiness = next;
        }
    }
}

fn judge(v: &Validators, field: Field, raw: &str) -> Verdict {
    match field {
        Field::TrackingNumber => v.tracking_number(raw),
        Field::Phone => v.phone(raw),
        Field::ItemDescription => v.item_description(raw),
        Field::Quantity => v.quantity(raw),
        Field::Price => v.price(raw),
        Field::CollectionPoint => v.collection_point(raw),
        Field::ItemCategory => v.category(raw),
    }
}
