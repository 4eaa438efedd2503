//! Object validation.
//!
//! [`ObjectValidator`] checks a property map against the live attribute
//! metadata of an object type:
//!
//! 1. fetch metadata (failure aborts the call)
//! 2. resolve properties through the [`PropertyResolver`]
//! 3. turn every resolution error into a coded [`ValidationIssue`]
//! 4. run the business rule registry ([`rules`])
//!
//! Validation problems never surface as `Err`; they are entries in the
//! returned [`ValidationResult`].

pub mod rules;

use std::sync::Arc;

use crate::Result;
use crate::logging::Logger;
use crate::metadata::AttributeMetadataResolver;
use crate::resolve::PropertyResolver;
use crate::telemetry;
use crate::types::{
    AttributeMetadata, PropertyError, PropertyErrorKind, PropertyMap, ResolveMode, ValidationCode,
    ValidationIssue, ValidationResult, has_property,
};

pub use rules::{BusinessRule, RuleContext, default_rules};

/// Field name used for issues that don't belong to a single property.
pub const OBJECT_FIELD: &str = "*";

/// Validates property maps against object type metadata.
pub struct ObjectValidator {
    metadata: AttributeMetadataResolver,
    resolver: Arc<dyn PropertyResolver>,
    rules: Vec<BusinessRule>,
    logger: Arc<dyn Logger>,
}

impl std::fmt::Debug for ObjectValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectValidator")
            .field("rules", &self.rules.iter().map(|r| r.name).collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl ObjectValidator {
    /// Validator with the built-in rules.
    pub fn new(
        metadata: AttributeMetadataResolver,
        resolver: Arc<dyn PropertyResolver>,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            metadata,
            resolver,
            rules: default_rules(),
            logger,
        }
    }

    /// Append a rule after the built-in ones.
    pub fn with_rule(mut self, rule: BusinessRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(&self) -> &[BusinessRule] {
        &self.rules
    }

    /// Generic validation of a (possibly partial) property map.
    pub async fn validate(&self, object_type: &str, properties: &PropertyMap) -> Result<ValidationResult> {
        let (result, _) = self.check(object_type, properties).await?;
        Ok(self.finish("validate", result))
    }

    /// Validation for a new object: every required field must be present.
    pub async fn validate_for_create(
        &self,
        object_type: &str,
        properties: &PropertyMap,
    ) -> Result<ValidationResult> {
        let (mut result, attributes) = self.check(object_type, properties).await?;

        for attribute in attributes.iter().filter(|a| a.required && !a.system) {
            if has_property(properties, &attribute.name)
                || result.has_error(&attribute.name, ValidationCode::RequiredFieldMissing)
            {
                continue;
            }
            result.push_error(issue_for(&PropertyError::required_missing(&attribute.name)));
        }

        Ok(self.finish("create", result))
    }

    /// Validation for an update: only the supplied fields are checked.
    pub async fn validate_for_update(
        &self,
        object_type: &str,
        properties: &PropertyMap,
    ) -> Result<ValidationResult> {
        let (result, _) = self.check(object_type, properties).await?;
        Ok(self.finish("update", result))
    }

    async fn check(
        &self,
        object_type: &str,
        properties: &PropertyMap,
    ) -> Result<(ValidationResult, Vec<AttributeMetadata>)> {
        let (entity, attributes) = self.metadata.attributes(object_type).await?;

        let mut result = ValidationResult {
            valid: true,
            object_type_id: entity.id.clone(),
            required_fields: attributes
                .iter()
                .filter(|a| a.required && !a.system)
                .map(|a| a.name.clone())
                .collect(),
            optional_fields: attributes
                .iter()
                .filter(|a| a.editable && !a.required)
                .map(|a| a.name.clone())
                .collect(),
            ..Default::default()
        };

        match self
            .resolver
            .resolve(&entity.id, &attributes, properties, ResolveMode::Partial)
            .await
        {
            Ok(resolution) => {
                result.resolved = resolution.resolved;
                for error in &resolution.errors {
                    result.push_error(issue_for(error));
                }
            }
            Err(e) => {
                self.logger
                    .error(&format!("property resolution failed for object type {}: {e}", entity.id));
                result.push_error(ValidationIssue {
                    field: OBJECT_FIELD.to_string(),
                    code: ValidationCode::PropertyError,
                    message: format!("property resolution failed: {e}"),
                    suggestion: "Retry the request; if it keeps failing, check the inventory connection".into(),
                    valid_options: Vec::new(),
                });
            }
        }

        let ctx = RuleContext {
            attributes: &attributes,
            properties,
        };
        for rule in &self.rules {
            (rule.check)(&ctx, &mut result);
        }

        Ok((result, attributes))
    }

    fn finish(&self, operation: &'static str, result: ValidationResult) -> ValidationResult {
        let outcome = if result.valid { "valid" } else { "invalid" };
        metrics::counter!(telemetry::VALIDATIONS_TOTAL, "operation" => operation, "outcome" => outcome)
            .increment(1);
        self.logger.debug(&format!(
            "{operation} validation of object type {}: {outcome}, {} errors, {} warnings",
            result.object_type_id,
            result.errors.len(),
            result.warnings.len()
        ));
        result
    }
}

/// Map a resolution error to a coded issue with a suggestion.
pub fn issue_for(error: &PropertyError) -> ValidationIssue {
    let field = error.field.as_str();
    let (code, suggestion, valid_options) = match &error.kind {
        PropertyErrorKind::RequiredFieldMissing => (
            ValidationCode::RequiredFieldMissing,
            format!("Provide a value for '{field}'"),
            Vec::new(),
        ),
        PropertyErrorKind::UnknownProperty => (
            ValidationCode::UnknownProperty,
            format!("Remove '{field}' or check its spelling against the object type's attributes"),
            Vec::new(),
        ),
        PropertyErrorKind::InvalidDate => (
            ValidationCode::InvalidDateFormat,
            "Use the YYYY-MM-DD format, e.g. 2024-01-31".to_string(),
            Vec::new(),
        ),
        PropertyErrorKind::InvalidDateTime => (
            ValidationCode::InvalidDatetimeFormat,
            "Use an ISO 8601 timestamp, e.g. 2024-01-31T09:00:00Z".to_string(),
            Vec::new(),
        ),
        PropertyErrorKind::InvalidSelectOption { valid_options } => (
            ValidationCode::InvalidSelectOption,
            if valid_options.is_empty() {
                format!("Use one of the options configured for '{field}'")
            } else {
                format!("Use one of: {}", valid_options.join(", "))
            },
            valid_options.clone(),
        ),
        PropertyErrorKind::InvalidReference => (
            ValidationCode::InvalidReference,
            "Reference the related object by its key, e.g. ITAM-123".to_string(),
            Vec::new(),
        ),
        PropertyErrorKind::Other => (
            ValidationCode::PropertyError,
            format!("Check the value supplied for '{field}'"),
            Vec::new(),
        ),
    };

    ValidationIssue {
        field: error.field.clone(),
        code,
        message: error.message.clone(),
        suggestion,
        valid_options,
    }
}
