//! Property maps and the property resolution contract.
//!
//! A [`PropertyResolver`](crate::resolve::PropertyResolver) turns a raw
//! property map into typed values plus a list of [`PropertyError`]s. Errors
//! carry a structured [`PropertyErrorKind`] so the validator never has to
//! parse message text. Collaborators that only produce text can still be
//! plugged in through [`PropertyError::from_message`], which applies the
//! textual classification the inventory's own error messages follow.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Raw property values keyed by attribute name.
///
/// Ordered by key, which keeps validation output deterministic.
pub type PropertyMap = serde_json::Map<String, Value>;

/// Look up a property by case-insensitive name.
pub fn property<'a>(properties: &'a PropertyMap, name: &str) -> Option<&'a Value> {
    properties
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value)
}

/// Look up a property and render it as text.
///
/// Strings are returned as-is, numbers and booleans are formatted, and
/// null, empty strings, arrays and objects count as absent.
pub fn property_text(properties: &PropertyMap, name: &str) -> Option<String> {
    match property(properties, name)? {
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Whether a property is present with a non-empty value.
pub fn has_property(properties: &PropertyMap, name: &str) -> bool {
    match property(properties, name) {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(_) => true,
    }
}

/// How strictly absent required fields are treated during resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolveMode {
    /// Partial input: only explicitly emptied required fields are errors.
    #[default]
    Partial,
    /// Full object: every absent required field is an error.
    Complete,
}

/// A property value matched to its attribute and coerced to its type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedProperty {
    /// Canonical attribute name from metadata.
    pub attribute: String,
    pub value: Value,
}

/// Failure category of a single property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PropertyErrorKind {
    RequiredFieldMissing,
    UnknownProperty,
    InvalidDate,
    InvalidDateTime,
    InvalidSelectOption { valid_options: Vec<String> },
    InvalidReference,
    Other,
}

/// A per-property resolution failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyError {
    pub field: String,
    #[serde(flatten)]
    pub kind: PropertyErrorKind,
    pub message: String,
}

impl PropertyError {
    pub fn new(field: impl Into<String>, kind: PropertyErrorKind, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            kind,
            message: message.into(),
        }
    }

    pub fn required_missing(field: &str) -> Self {
        Self::new(
            field,
            PropertyErrorKind::RequiredFieldMissing,
            format!("required field '{field}' is missing"),
        )
    }

    pub fn unknown_property(field: &str) -> Self {
        Self::new(
            field,
            PropertyErrorKind::UnknownProperty,
            format!("unknown property '{field}' for this object type"),
        )
    }

    pub fn invalid_date(field: &str, value: &str) -> Self {
        Self::new(
            field,
            PropertyErrorKind::InvalidDate,
            format!("invalid date format for '{field}': expected YYYY-MM-DD, got '{value}'"),
        )
    }

    pub fn invalid_datetime(field: &str, value: &str) -> Self {
        Self::new(
            field,
            PropertyErrorKind::InvalidDateTime,
            format!(
                "invalid datetime format for '{field}': expected YYYY-MM-DDTHH:MM:SSZ, got '{value}'"
            ),
        )
    }

    pub fn invalid_option(field: &str, value: &str, valid_options: &[String]) -> Self {
        Self::new(
            field,
            PropertyErrorKind::InvalidSelectOption {
                valid_options: valid_options.to_vec(),
            },
            format!(
                "invalid option '{value}' for '{field}'. Valid options: {}",
                valid_options.join(", ")
            ),
        )
    }

    pub fn invalid_reference(field: &str, value: &str) -> Self {
        Self::new(
            field,
            PropertyErrorKind::InvalidReference,
            format!("invalid reference '{value}' for '{field}': expected an object key like ABC-123"),
        )
    }

    /// Classify a free-text error from a collaborator that has no
    /// structured error kinds.
    ///
    /// The wording matched here is the wording the inventory uses; the
    /// constructors above produce messages that classify back to the same
    /// kind.
    pub fn from_message(field: impl Into<String>, message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_lowercase();

        let kind = if lower.contains("required field") || lower.contains("is required") {
            PropertyErrorKind::RequiredFieldMissing
        } else if lower.contains("datetime") || lower.contains("date-time") || lower.contains("date time") {
            PropertyErrorKind::InvalidDateTime
        } else if lower.contains("date format") || lower.contains("invalid date") {
            PropertyErrorKind::InvalidDate
        } else if lower.contains("valid options") || lower.contains("invalid option") {
            PropertyErrorKind::InvalidSelectOption {
                valid_options: extract_valid_options(&message),
            }
        } else if lower.contains("reference") {
            PropertyErrorKind::InvalidReference
        } else if lower.contains("unknown property")
            || lower.contains("unknown attribute")
            || lower.contains("not found")
        {
            PropertyErrorKind::UnknownProperty
        } else {
            PropertyErrorKind::Other
        };

        let mut field = field.into();
        if field.is_empty() {
            field = quoted_field(&message).unwrap_or_default();
        }

        Self {
            field,
            kind,
            message,
        }
    }
}

/// Options listed after `Valid options:` in an error message.
fn extract_valid_options(message: &str) -> Vec<String> {
    let Some(start) = message
        .find("Valid options:")
        .or_else(|| message.find("valid options:"))
    else {
        return Vec::new();
    };
    message[start + "valid options:".len()..]
        .split(',')
        .map(|opt| opt.trim().trim_end_matches('.').to_string())
        .filter(|opt| !opt.is_empty())
        .collect()
}

/// The first `'quoted'` token in a message.
fn quoted_field(message: &str) -> Option<String> {
    let start = message.find('\'')? + 1;
    let len = message[start..].find('\'')?;
    Some(message[start..start + len].to_string())
}

/// Output of a property resolution pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyResolution {
    pub resolved: Vec<ResolvedProperty>,
    pub errors: Vec<PropertyError>,
}
