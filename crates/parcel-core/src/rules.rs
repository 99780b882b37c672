//! # Validation Rules Table
//!
//! Thresholds and formats used by the field validators. The table is
//! versioned configuration rather than literals scattered across call
//! sites, so the accepted phone formats or tracking-number length can be
//! pinned per deployment and tested.
//!
//! [`ValidationRules::default`] is the pinned v1 table. A deployment may
//! override any subset of it from a JSON or YAML file; missing keys keep
//! their default value.
//!
//! ```yaml
//! version: 1
//! trackingMinLength: 6
//! phoneFormats:
//!   - name: local
//!     prefixes: ["01"]
//!     minSubscriberDigits: 8
//!     maxSubscriberDigits: 9
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::RulesError;

/// The rules version understood by this build.
pub const RULES_VERSION: u32 = 1;

/// One accepted national phone number format.
///
/// A number matches when, after stripping spaces, hyphens and a leading
/// `+`, it starts with one of `prefixes` and is followed by between
/// `min_subscriber_digits` and `max_subscriber_digits` digits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhoneFormat {
    /// Label used in diagnostics (e.g. "local", "international").
    pub name: String,
    /// Digit-only prefixes that introduce this format.
    pub prefixes: Vec<String>,
    /// Minimum number of digits after the prefix.
    pub min_subscriber_digits: usize,
    /// Maximum number of digits after the prefix.
    pub max_subscriber_digits: usize,
}

/// Thresholds and formats for every validated field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ValidationRules {
    /// Table version; must equal [`RULES_VERSION`].
    pub version: u32,
    /// Accepted phone formats, tried in order.
    pub phone_formats: Vec<PhoneFormat>,
    /// Minimum password length.
    pub password_min_length: usize,
    /// Minimum tracking number length after trimming.
    pub tracking_min_length: usize,
    /// Smallest accepted quantity.
    pub quantity_min: u32,
    /// Largest accepted quantity.
    pub quantity_max: u32,
    /// Smallest accepted declared price.
    pub price_min: f64,
    /// Largest accepted declared price.
    pub price_max: f64,
    /// Maximum length of the item description.
    pub description_max_length: usize,
    /// Maximum number of attachments for a starred category.
    pub max_attachments: usize,
    /// Maximum size of a single attachment, in bytes.
    pub max_attachment_bytes: u64,
    /// MIME types accepted for attachments.
    pub allowed_mime_types: Vec<String>,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            version: RULES_VERSION,
            phone_formats: vec![
                PhoneFormat {
                    name: "local".into(),
                    prefixes: vec!["01".into()],
                    min_subscriber_digits: 8,
                    max_subscriber_digits: 9,
                },
                PhoneFormat {
                    name: "international".into(),
                    prefixes: vec!["601".into()],
                    min_subscriber_digits: 8,
                    max_subscriber_digits: 9,
                },
            ],
            password_min_length: 6,
            tracking_min_length: 5,
            quantity_min: 1,
            quantity_max: 999,
            price_min: 0.0,
            price_max: 100_000.0,
            description_max_length: 500,
            max_attachments: 3,
            max_attachment_bytes: 5 * 1024 * 1024,
            allowed_mime_types: vec![
                "image/jpeg".into(),
                "image/png".into(),
                "image/gif".into(),
                "image/webp".into(),
                "application/pdf".into(),
            ],
        }
    }
}

impl ValidationRules {
    /// Parse a rules table from JSON text.
    pub fn from_json(text: &str) -> Result<Self, RulesError> {
        let rules: Self = serde_json::from_str(text)?;
        rules.check()?;
        Ok(rules)
    }

    /// Parse a rules table from YAML text.
    pub fn from_yaml(text: &str) -> Result<Self, RulesError> {
        let rules: Self = serde_yaml::from_str(text)?;
        rules.check()?;
        Ok(rules)
    }

    /// Load a rules table from disk. Files ending in `.yaml` or `.yml` are
    /// parsed as YAML, everything else as JSON.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, RulesError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| RulesError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );
        if is_yaml {
            Self::from_yaml(&text)
        } else {
            Self::from_json(&text)
        }
    }

    /// Whether `mime_type` is in the allowed set (case-insensitive).
    pub fn allows_mime_type(&self, mime_type: &str) -> bool {
        self.allowed_mime_types
            .iter()
            .any(|m| m.eq_ignore_ascii_case(mime_type))
    }

    /// Reject tables that are internally inconsistent.
    pub fn check(&self) -> Result<(), RulesError> {
        if self.version != RULES_VERSION {
            return Err(RulesError::UnsupportedVersion {
                found: self.version,
                expected: RULES_VERSION,
            });
        }
        if self.phone_formats.is_empty() {
            return Err(RulesError::Inconsistent {
                rule: "phoneFormats",
                reason: "at least one phone format is required".into(),
            });
        }
        for format in &self.phone_formats {
            if format.min_subscriber_digits > format.max_subscriber_digits {
                return Err(RulesError::Inconsistent {
                    rule: "phoneFormats",
                    reason: format!("format {:?} has min digits above max digits", format.name),
                });
            }
            let bad_prefix = format.prefixes.is_empty()
                || format
                    .prefixes
                    .iter()
                    .any(|p| p.is_empty() || !p.chars().all(|c| c.is_ascii_digit()));
            if bad_prefix {
                return Err(RulesError::Inconsistent {
                    rule: "phoneFormats",
                    reason: format!("format {:?} needs non-empty digit-only prefixes", format.name),
                });
            }
        }
        if self.tracking_min_length == 0 {
            return Err(RulesError::Inconsistent {
                rule: "trackingMinLength",
                reason: "must be at least 1".into(),
            });
        }
        if self.quantity_min > self.quantity_max {
            return Err(RulesError::Inconsistent {
                rule: "quantity",
                reason: format!("min {} exceeds max {}", self.quantity_min, self.quantity_max),
            });
        }
        if !(self.price_min.is_finite() && self.price_max.is_finite())
            || self.price_min > self.price_max
        {
            return Err(RulesError::Inconsistent {
                rule: "price",
                reason: format!("invalid range {}..={}", self.price_min, self.price_max),
            });
        }
        if self.max_attachments == 0 {
            return Err(RulesError::Inconsistent {
                rule: "maxAttachments",
                reason: "starred categories need room for at least one attachment".into(),
            });
        }
        if self.allowed_mime_types.is_empty() {
            return Err(RulesError::Inconsistent {
                rule: "allowedMimeTypes",
                reason: "at least one MIME type must be allowed".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rules_are_consistent() {
        let rules = ValidationRules::default();
        rules.check().unwrap();
        assert_eq!(rules.password_min_length, 6);
        assert_eq!(rules.tracking_min_length, 5);
        assert_eq!((rules.quantity_min, rules.quantity_max), (1, 999));
        assert_eq!(rules.max_attachments, 3);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let rules = ValidationRules::from_json(r#"{"version":1,"trackingMinLength":8}"#).unwrap();
        assert_eq!(rules.tracking_min_length, 8);
        assert_eq!(rules.quantity_max, 999);
        assert_eq!(rules.phone_formats.len(), 2);
    }

    #[test]
    fn yaml_phone_table_replaces_defaults() {
        let yaml = r#"
version: 1
phoneFormats:
  - name: local
    prefixes: ["07"]
    minSubscriberDigits: 7
    maxSubscriberDigits: 7
"#;
        let rules = ValidationRules::from_yaml(yaml).unwrap();
        assert_eq!(rules.phone_formats.len(), 1);
        assert_eq!(rules.phone_formats[0].prefixes, vec!["07".to_string()]);
    }

    #[test]
    fn unknown_version_is_rejected() {
        let err = ValidationRules::from_json(r#"{"version":2}"#).unwrap_err();
        assert!(matches!(
            err,
            RulesError::UnsupportedVersion { found: 2, expected: 1 }
        ));
    }

    #[test]
    fn inverted_quantity_range_is_rejected() {
        let err = ValidationRules::from_json(r#"{"quantityMin":10,"quantityMax":2}"#).unwrap_err();
        assert!(matches!(err, RulesError::Inconsistent { rule: "quantity", .. }));
    }

    #[test]
    fn non_digit_phone_prefix_is_rejected() {
        let json = r#"{"phoneFormats":[{"name":"x","prefixes":["+6"],"minSubscriberDigits":1,"maxSubscriberDigits":2}]}"#;
        assert!(ValidationRules::from_json(json).is_err());
    }

    #[test]
    fn from_path_picks_parser_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let yaml_path = dir.path().join("rules.yaml");
        std::fs::write(&yaml_path, "version: 1\npriceMax: 500\n").unwrap();
        let rules = ValidationRules::from_path(&yaml_path).unwrap();
        assert_eq!(rules.price_max, 500.0);

        let json_path = dir.path().join("rules.json");
        std::fs::write(&json_path, r#"{"maxAttachments":2}"#).unwrap();
        let rules = ValidationRules::from_path(&json_path).unwrap();
        assert_eq!(rules.max_attachments, 2);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = ValidationRules::from_path("/nonexistent/rules.json").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/rules.json"));
    }

    #[test]
    fn mime_type_check_ignores_case() {
        let rules = ValidationRules::default();
        assert!(rules.allows_mime_type("IMAGE/PNG"));
        assert!(!rules.allows_mime_type("text/html"));
    }
}
