//! Business rules and best-practice checks.
//!
//! Each rule is a named check that inspects the raw properties (and the
//! object type's attributes) and pushes errors or warnings onto the result.
//! The validator runs every rule in registry order after the generic
//! resolution pass.

use serde_json::Value;

use crate::types::{
    AttributeMetadata, PropertyMap, ValidationCode, ValidationIssue, ValidationResult,
    ValidationWarning, WarningCode, find_attribute, has_property, property, property_text,
};

/// Minimum length of an `asset_tag`.
pub const MIN_ASSET_TAG_LEN: usize = 3;

/// Fields every tracked asset should carry when the object type offers them.
pub const RECOMMENDED_FIELDS: [&str; 3] = ["asset_tag", "serial_number", "model_name"];

/// Names too generic to identify an asset.
pub const GENERIC_NAMES: [&str; 5] = ["test", "laptop", "computer", "device", "asset"];

/// What a rule gets to look at.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub attributes: &'a [AttributeMetadata],
    pub properties: &'a PropertyMap,
}

/// A named validation rule.
#[derive(Debug, Clone, Copy)]
pub struct BusinessRule {
    pub name: &'static str,
    pub check: fn(&RuleContext<'_>, &mut ValidationResult),
}

impl BusinessRule {
    pub const fn new(name: &'static str, check: fn(&RuleContext<'_>, &mut ValidationResult)) -> Self {
        Self { name, check }
    }
}

/// The built-in rules, in evaluation order.
pub fn default_rules() -> Vec<BusinessRule> {
    vec![
        BusinessRule::new("asset_tag_length", asset_tag_length),
        BusinessRule::new("test_serial_number", test_serial_number),
        BusinessRule::new("device_ownership", device_ownership),
        BusinessRule::new("recommended_fields", recommended_fields),
        BusinessRule::new("generic_name", generic_name),
    ]
}

// ── Business rules ──────────────────────────────────────────────────────

fn asset_tag_length(ctx: &RuleContext<'_>, result: &mut ValidationResult) {
    // Only an absent or null tag is skipped; a blank one is too short.
    let tag = match property(ctx.properties, "asset_tag") {
        None | Some(Value::Null) => return,
        Some(Value::String(s)) => s.trim().to_string(),
        Some(other) => other.to_string(),
    };
    if tag.chars().count() < MIN_ASSET_TAG_LEN {
        result.push_error(ValidationIssue {
            field: "asset_tag".into(),
            code: ValidationCode::AssetTagTooShort,
            message: format!(
                "asset tag '{tag}' is too short (minimum {MIN_ASSET_TAG_LEN} characters)"
            ),
            suggestion: format!(
                "Use an asset tag of at least {MIN_ASSET_TAG_LEN} characters, e.g. IT-0042"
            ),
            valid_options: Vec::new(),
        });
    }
}

fn test_serial_number(ctx: &RuleContext<'_>, result: &mut ValidationResult) {
    let Some(serial) = property_text(ctx.properties, "serial_number") else {
        return;
    };
    if serial.to_lowercase().contains("test") {
        result.push_warning(ValidationWarning {
            field: "serial_number".into(),
            code: WarningCode::TestSerialNumber,
            message: format!("serial number '{serial}' looks like test data"),
            suggestion: "Use the manufacturer serial number printed on the device".into(),
        });
    }
}

fn device_ownership(ctx: &RuleContext<'_>, result: &mut ValidationResult) {
    let device = property_text(ctx.properties, "device_type");
    let ownership = property_text(ctx.properties, "ownership_type");
    let (Some(device), Some(ownership)) = (device, ownership) else {
        return;
    };
    if device.trim().eq_ignore_ascii_case("virtual") && ownership.trim().eq_ignore_ascii_case("byod") {
        result.push_warning(ValidationWarning {
            field: "ownership_type".into(),
            code: WarningCode::DeviceOwnershipMismatch,
            message: "virtual devices are rarely employee-owned (BYOD)".into(),
            suggestion: "Check device_type and ownership_type; virtual machines are usually company owned".into(),
        });
    }
}

// ── Best practices ──────────────────────────────────────────────────────

fn recommended_fields(ctx: &RuleContext<'_>, result: &mut ValidationResult) {
    for field in RECOMMENDED_FIELDS {
        let Some(attribute) = find_attribute(ctx.attributes, field) else {
            continue;
        };
        if attribute.editable && !attribute.system && !has_property(ctx.properties, field) {
            result.push_warning(ValidationWarning {
                field: attribute.name.clone(),
                code: WarningCode::MissingRecommendedField,
                message: format!("recommended field '{}' is not set", attribute.name),
                suggestion: format!("Set '{}' so the asset can be identified and audited", attribute.name),
            });
        }
    }
}

fn generic_name(ctx: &RuleContext<'_>, result: &mut ValidationResult) {
    let Some(name) = property_text(ctx.properties, "name") else {
        return;
    };
    let trimmed = name.trim();
    if GENERIC_NAMES.iter().any(|g| g.eq_ignore_ascii_case(trimmed)) {
        result.push_warning(ValidationWarning {
            field: "name".into(),
            code: WarningCode::GenericName,
            message: format!("name '{trimmed}' is too generic to identify the asset"),
            suggestion: "Include the model or owner, e.g. 'MacBook Pro - J. Smith'".into(),
        });
    }
}
