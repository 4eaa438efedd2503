//! Integration tests for object validation through an [`InventorySession`].

mod common;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use assetgate::{
    AssetgateError, AttributeMetadata, BusinessRule, PropertyError, PropertyMap,
    PropertyResolution, PropertyResolver, ResolveMode, Result, RuleContext, ValidationCode,
    ValidationIssue, ValidationResult, WarningCode,
};
use common::{InMemorySource, SITE, WORKSPACE, props, session};

fn complete_laptop() -> PropertyMap {
    props(json!({
        "name": "MacBook Pro - J. Smith",
        "serial_number": "C02XK1ZJJG5H",
        "asset_tag": "IT-0042",
        "model_name": "MacBook Pro 14",
        "purchase_date": "2024-03-15",
        "device_type": "Physical",
        "ownership_type": "Company Owned"
    }))
}

// =============================================================================
// Generic validation
// =============================================================================

#[tokio::test]
async fn well_formed_laptop_is_valid_without_warnings() {
    let (session, _, _) = session();

    let result = session
        .validate_for_create("Laptops", &complete_laptop())
        .await
        .unwrap();

    assert!(result.valid, "{:?}", result.errors);
    assert!(result.warnings.is_empty(), "{:?}", result.warnings);
    assert_eq!(result.object_type_id, "12");
    assert_eq!(result.resolved.len(), 7);
}

#[tokio::test]
async fn object_type_can_be_addressed_by_id() {
    let (session, source, _) = session();

    let result = session.validate("12", &complete_laptop()).await.unwrap();
    assert!(result.valid);
    assert_eq!(source.list_calls(), 0, "IDs resolve without listing");
}

#[tokio::test]
async fn every_error_class_is_coded() {
    let (session, _, _) = session();
    let properties = props(json!({
        "name": "Build box",
        "colour": "silver",
        "purchase_date": "15/03/2024",
        "last_audit": "last tuesday",
        "device_type": "Cloud",
        "owner": "j.smith"
    }));

    let result = session.validate("Laptops", &properties).await.unwrap();

    assert!(!result.valid);
    let code_of = |field: &str| {
        result
            .errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.code)
            .unwrap_or_else(|| panic!("no error for {field}: {:?}", result.errors))
    };
    assert_eq!(code_of("colour"), ValidationCode::UnknownProperty);
    assert_eq!(code_of("purchase_date"), ValidationCode::InvalidDateFormat);
    assert_eq!(code_of("last_audit"), ValidationCode::InvalidDatetimeFormat);
    assert_eq!(code_of("device_type"), ValidationCode::InvalidSelectOption);
    assert_eq!(code_of("owner"), ValidationCode::InvalidReference);
    assert!(result.errors.iter().all(|e| !e.suggestion.is_empty()));
}

#[tokio::test]
async fn validation_is_deterministic() {
    let (session, _, _) = session();
    let properties = props(json!({
        "name": "asset",
        "asset_tag": "X",
        "serial_number": "test-123",
        "colour": "silver",
        "device_type": "Virtual",
        "ownership_type": "BYOD"
    }));

    let first = session.validate("Laptops", &properties).await.unwrap();
    for _ in 0..5 {
        assert_eq!(session.validate("Laptops", &properties).await.unwrap(), first);
    }
}

// =============================================================================
// Create / update
// =============================================================================

#[tokio::test]
async fn create_without_serial_number_has_one_required_error() {
    let (session, _, _) = session();
    let mut properties = complete_laptop();
    properties.remove("serial_number");

    let result = session
        .validate_for_create("Laptops", &properties)
        .await
        .unwrap();

    assert!(!result.valid);
    let missing: Vec<&ValidationIssue> = result
        .errors_with_code(ValidationCode::RequiredFieldMissing)
        .collect();
    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0].field, "serial_number");
}

#[tokio::test]
async fn create_matches_required_fields_case_insensitively() {
    let (session, _, _) = session();
    let mut properties = complete_laptop();
    let serial = properties.remove("serial_number").unwrap();
    properties.insert("Serial_Number".into(), serial);

    let result = session
        .validate_for_create("Laptops", &properties)
        .await
        .unwrap();
    assert!(result.valid, "{:?}", result.errors);
}

#[tokio::test]
async fn update_checks_only_supplied_fields() {
    let (session, _, _) = session();

    let ok = session
        .validate_for_update("Laptops", &props(json!({"asset_status": "retired"})))
        .await
        .unwrap();
    assert!(ok.valid, "{:?}", ok.errors);

    let bad = session
        .validate_for_update("Laptops", &props(json!({"asset_status": "Lost"})))
        .await
        .unwrap();
    assert!(!bad.valid);
    assert_eq!(
        bad.errors[0].valid_options,
        ["In Stock", "In Use", "Retired"]
    );
}

// =============================================================================
// Business rules
// =============================================================================

#[tokio::test]
async fn asset_tag_length_boundary() {
    let (session, _, _) = session();

    let mut short = complete_laptop();
    short.insert("asset_tag".into(), json!("AB"));
    let result = session.validate("Laptops", &short).await.unwrap();
    assert!(result.has_error("asset_tag", ValidationCode::AssetTagTooShort));

    let mut exact = complete_laptop();
    exact.insert("asset_tag".into(), json!("ABC"));
    let result = session.validate("Laptops", &exact).await.unwrap();
    assert!(result.errors_with_code(ValidationCode::AssetTagTooShort).next().is_none());

    for blank in ["", "  "] {
        let mut empty = complete_laptop();
        empty.insert("asset_tag".into(), json!(blank));
        let result = session.validate("Laptops", &empty).await.unwrap();
        assert!(!result.valid);
        assert!(result.has_error("asset_tag", ValidationCode::AssetTagTooShort), "{blank:?}");
    }
}

#[tokio::test]
async fn suspicious_values_warn_but_stay_valid() {
    let (session, _, _) = session();
    let mut properties = complete_laptop();
    properties.insert("serial_number".into(), json!("SN-Test-0001"));
    properties.insert("device_type".into(), json!("Virtual"));
    properties.insert("ownership_type".into(), json!("BYOD"));
    properties.insert("name".into(), json!("Computer"));

    let result = session.validate("Laptops", &properties).await.unwrap();

    assert!(result.valid, "{:?}", result.errors);
    let mut codes: Vec<_> = result.warnings.iter().map(|w| w.code.as_str()).collect();
    codes.sort();
    assert_eq!(
        codes,
        ["DEVICE_OWNERSHIP_MISMATCH", "GENERIC_NAME", "TEST_SERIAL_NUMBER"]
    );
}

#[tokio::test]
async fn missing_recommended_fields_warn() {
    let (session, _, _) = session();
    let properties = props(json!({"name": "MacBook Pro - J. Smith", "serial_number": "C02XK1"}));

    let result = session.validate("Laptops", &properties).await.unwrap();
    let fields: Vec<_> = result
        .warnings
        .iter()
        .filter(|w| w.code == WarningCode::MissingRecommendedField)
        .map(|w| w.field.as_str())
        .collect();
    assert_eq!(fields, ["asset_tag", "model_name"]);
}

#[tokio::test]
async fn session_rules_extend_the_registry() {
    fn leased_needs_owner(ctx: &RuleContext<'_>, result: &mut ValidationResult) {
        let leased = assetgate::types::property_text(ctx.properties, "ownership_type")
            .is_some_and(|o| o == "Leased");
        if leased && !assetgate::types::has_property(ctx.properties, "owner") {
            result.push_error(assetgate::validate::issue_for(&PropertyError::required_missing(
                "owner",
            )));
        }
    }

    let session = assetgate::Assetgate::builder()
        .workspace(WORKSPACE, SITE)
        .source(Arc::new(InMemorySource::it_assets()))
        .rule(BusinessRule::new("leased_needs_owner", leased_needs_owner))
        .build()
        .unwrap();

    let mut properties = complete_laptop();
    properties.insert("ownership_type".into(), json!("Leased"));
    let result = session.validate("Laptops", &properties).await.unwrap();
    assert!(result.has_error("owner", ValidationCode::RequiredFieldMissing));
}

// =============================================================================
// Failure handling
// =============================================================================

#[tokio::test]
async fn unknown_object_type_fails_the_call() {
    let (session, _, _) = session();
    let err = session
        .validate("Printers", &complete_laptop())
        .await
        .unwrap_err();
    assert!(matches!(err, AssetgateError::Metadata { .. }), "{err}");
}

/// Resolver that only speaks in message text.
struct TextualResolver;

#[async_trait]
impl PropertyResolver for TextualResolver {
    async fn resolve(
        &self,
        _object_type_id: &str,
        _attributes: &[AttributeMetadata],
        _properties: &PropertyMap,
        _mode: ResolveMode,
    ) -> Result<PropertyResolution> {
        Ok(PropertyResolution {
            resolved: Vec::new(),
            errors: vec![
                PropertyError::from_message("", "Invalid date format for 'purchase_date'"),
                PropertyError::from_message(
                    "device_type",
                    "'Cloud' is not valid. Valid options: Physical, Virtual",
                ),
                PropertyError::from_message("owner", "Object reference could not be resolved"),
            ],
        })
    }
}

#[tokio::test]
async fn textual_resolver_errors_are_classified() {
    let session = assetgate::Assetgate::builder()
        .workspace(WORKSPACE, SITE)
        .source(Arc::new(InMemorySource::it_assets()))
        .property_resolver(Arc::new(TextualResolver))
        .build()
        .unwrap();

    let result = session.validate("Laptops", &complete_laptop()).await.unwrap();
    let codes: Vec<_> = result.errors.iter().map(|e| (e.field.as_str(), e.code)).collect();
    assert_eq!(
        codes,
        [
            ("purchase_date", ValidationCode::InvalidDateFormat),
            ("device_type", ValidationCode::InvalidSelectOption),
            ("owner", ValidationCode::InvalidReference),
        ]
    );
    assert_eq!(result.errors[1].valid_options, ["Physical", "Virtual"]);
}
