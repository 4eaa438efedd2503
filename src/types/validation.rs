//! Validation verdict types.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::ResolvedProperty;

/// Error taxonomy surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationCode {
    RequiredFieldMissing,
    UnknownProperty,
    InvalidDateFormat,
    InvalidDatetimeFormat,
    InvalidSelectOption,
    InvalidReference,
    PropertyError,
    AssetTagTooShort,
}

impl ValidationCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationCode::RequiredFieldMissing => "REQUIRED_FIELD_MISSING",
            ValidationCode::UnknownProperty => "UNKNOWN_PROPERTY",
            ValidationCode::InvalidDateFormat => "INVALID_DATE_FORMAT",
            ValidationCode::InvalidDatetimeFormat => "INVALID_DATETIME_FORMAT",
            ValidationCode::InvalidSelectOption => "INVALID_SELECT_OPTION",
            ValidationCode::InvalidReference => "INVALID_REFERENCE",
            ValidationCode::PropertyError => "PROPERTY_ERROR",
            ValidationCode::AssetTagTooShort => "ASSET_TAG_TOO_SHORT",
        }
    }
}

impl fmt::Display for ValidationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Non-blocking advisories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WarningCode {
    MissingRecommendedField,
    GenericName,
    TestSerialNumber,
    DeviceOwnershipMismatch,
}

impl WarningCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            WarningCode::MissingRecommendedField => "MISSING_RECOMMENDED_FIELD",
            WarningCode::GenericName => "GENERIC_NAME",
            WarningCode::TestSerialNumber => "TEST_SERIAL_NUMBER",
            WarningCode::DeviceOwnershipMismatch => "DEVICE_OWNERSHIP_MISMATCH",
        }
    }
}

impl fmt::Display for WarningCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A blocking problem with one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub field: String,
    pub code: ValidationCode,
    pub message: String,
    /// What the caller should do about it.
    pub suggestion: String,
    /// Populated for `INVALID_SELECT_OPTION`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub valid_options: Vec<String>,
}

/// An advisory about one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationWarning {
    pub field: String,
    pub code: WarningCode,
    pub message: String,
    pub suggestion: String,
}

/// Outcome of validating a property map against an object type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub object_type_id: String,
    pub resolved: Vec<ResolvedProperty>,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationWarning>,
    /// Required, non-system attributes.
    pub required_fields: Vec<String>,
    /// Editable, non-required attributes.
    pub optional_fields: Vec<String>,
}

impl ValidationResult {
    /// Record a blocking error; the result is no longer valid.
    pub fn push_error(&mut self, issue: ValidationIssue) {
        self.valid = false;
        self.errors.push(issue);
    }

    pub fn push_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// Whether an error with this code was raised for `field` (case-insensitive).
    pub fn has_error(&self, field: &str, code: ValidationCode) -> bool {
        self.errors
            .iter()
            .any(|e| e.code == code && e.field.eq_ignore_ascii_case(field))
    }

    pub fn errors_with_code(&self, code: ValidationCode) -> impl Iterator<Item = &ValidationIssue> {
        self.errors.iter().filter(move |e| e.code == code)
    }
}
