//! Completion of partial objects.
//!
//! [`CompletionEngine::complete`] takes whatever the caller has so far, fills
//! in defaults the metadata allows, lists what is still missing, and checks
//! whether the result is creatable. Progress is returned even when the
//! object is still incomplete.

use std::sync::Arc;

use serde_json::Value;

use crate::Result;
use crate::logging::Logger;
use crate::metadata::AttributeMetadataResolver;
use crate::resolve::PropertyResolver;
use crate::telemetry;
use crate::types::{
    AttributeMetadata, CompletionResult, CompletionSuggestion, Confidence, DataType,
    DefaultApplication, PropertyErrorKind, PropertyMap, ResolveMode, SuggestionPriority,
    find_attribute, has_property, property_text,
};

/// Maximum length of an asset tag derived from the object name.
pub const DERIVED_ASSET_TAG_LEN: usize = 20;

/// Fields that get `important` priority when missing.
const IMPORTANT_FIELDS: [&str; 3] = ["serial_number", "model_name", "purchase_date"];

/// Fills defaults into partial property maps and reports what is missing.
pub struct CompletionEngine {
    metadata: AttributeMetadataResolver,
    resolver: Arc<dyn PropertyResolver>,
    logger: Arc<dyn Logger>,
}

impl std::fmt::Debug for CompletionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionEngine").finish_non_exhaustive()
    }
}

impl CompletionEngine {
    pub fn new(
        metadata: AttributeMetadataResolver,
        resolver: Arc<dyn PropertyResolver>,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            metadata,
            resolver,
            logger,
        }
    }

    /// Complete `partial` against the metadata of `object_type`.
    ///
    /// Only a metadata fetch failure is an `Err`. A failing property
    /// resolver is reported through [`CompletionResult::resolution_error`].
    pub async fn complete(&self, object_type: &str, partial: &PropertyMap) -> Result<CompletionResult> {
        let mut completed = partial.clone();
        let (entity, attributes) = self.metadata.attributes(object_type).await?;

        let applied_defaults = apply_defaults(&attributes, &mut completed);
        let suggestions = suggestions(&attributes, &completed);

        let mut result = CompletionResult {
            object_type_id: entity.id.clone(),
            applied_defaults,
            suggestions,
            ..Default::default()
        };

        match self
            .resolver
            .resolve(&entity.id, &attributes, &completed, ResolveMode::Complete)
            .await
        {
            Ok(resolution) => {
                for error in resolution.errors {
                    if error.kind == PropertyErrorKind::RequiredFieldMissing
                        && !result.missing_critical.contains(&error.field)
                    {
                        result.missing_critical.push(error.field);
                    }
                }
                result.resolved = resolution.resolved;
            }
            Err(e) => {
                self.logger
                    .error(&format!("property resolution failed for object type {}: {e}", entity.id));
                result.missing_critical = attributes
                    .iter()
                    .filter(|a| a.required && !a.system && !has_property(&completed, &a.name))
                    .map(|a| a.name.clone())
                    .collect();
                result.resolution_error = Some(e.to_string());
            }
        }

        result.success = result.missing_critical.is_empty() && result.resolution_error.is_none();
        result.completed_properties = completed;

        let outcome = if result.success { "complete" } else { "incomplete" };
        metrics::counter!(telemetry::COMPLETIONS_TOTAL, "outcome" => outcome).increment(1);
        self.logger.debug(&format!(
            "completion of object type {}: {outcome}, {} defaults applied, {} fields missing",
            result.object_type_id,
            result.applied_defaults.len(),
            result.missing_critical.len()
        ));

        Ok(result)
    }
}

// ── Defaults ────────────────────────────────────────────────────────────

/// Fill defaults for fields the metadata defines and `completed` lacks.
fn apply_defaults(attributes: &[AttributeMetadata], completed: &mut PropertyMap) -> Vec<DefaultApplication> {
    let mut applied = Vec::new();

    if let Some(attribute) = missing(attributes, completed, "asset_status") {
        let values = if attribute.options().is_empty() {
            attributes
                .iter()
                .find(|a| a.data_type == DataType::Status && !a.status_values.is_empty())
                .map(|a| a.status_values.as_slice())
                .unwrap_or_default()
        } else {
            attribute.options()
        };
        if let Some(first) = values.first() {
            applied.push(default_of(
                attribute,
                first,
                "first status value of the object type",
                Confidence::Medium,
            ));
        }
    }

    if let Some(attribute) = missing(attributes, completed, "device_type") {
        let options = attribute.options();
        if let Some(physical) = options.iter().find(|o| o.eq_ignore_ascii_case("physical")) {
            applied.push(default_of(
                attribute,
                physical,
                "most assets are physical devices",
                Confidence::High,
            ));
        } else if let Some(first) = options.first() {
            applied.push(default_of(attribute, first, "first available option", Confidence::Low));
        }
    }

    if let Some(attribute) = missing(attributes, completed, "ownership_type") {
        let options = attribute.options();
        if let Some(company) = options.iter().find(|o| o.to_lowercase().contains("company")) {
            applied.push(default_of(
                attribute,
                company,
                "assets are company owned unless stated otherwise",
                Confidence::Medium,
            ));
        } else if let Some(first) = options.first() {
            applied.push(default_of(attribute, first, "first available option", Confidence::Low));
        }
    }

    if let Some(attribute) = missing(attributes, completed, "asset_tag")
        && let Some(name) = property_text(completed, "name")
    {
        let tag = derive_asset_tag(&name);
        if !tag.is_empty() {
            applied.push(default_of(attribute, &tag, "derived from the object name", Confidence::Low));
        }
    }

    for default in &applied {
        // A blank value under a differently cased key is replaced, not shadowed.
        completed.retain(|key, _| !key.eq_ignore_ascii_case(&default.field));
        completed.insert(default.field.clone(), Value::String(default.value.clone()));
    }
    applied
}

fn default_of(attribute: &AttributeMetadata, value: &str, reason: &str, confidence: Confidence) -> DefaultApplication {
    DefaultApplication {
        field: attribute.name.clone(),
        value: value.to_string(),
        reason: reason.to_string(),
        confidence,
    }
}

/// The attribute `name`, if the metadata defines it and `completed` lacks it.
fn missing<'a>(
    attributes: &'a [AttributeMetadata],
    completed: &PropertyMap,
    name: &str,
) -> Option<&'a AttributeMetadata> {
    find_attribute(attributes, name).filter(|a| !a.system && !has_property(completed, name))
}

/// Uppercase, spaces to hyphens, truncated to [`DERIVED_ASSET_TAG_LEN`] chars.
pub fn derive_asset_tag(name: &str) -> String {
    name.trim()
        .to_uppercase()
        .replace(' ', "-")
        .chars()
        .take(DERIVED_ASSET_TAG_LEN)
        .collect()
}

// ── Suggestions ─────────────────────────────────────────────────────────

fn suggestions(attributes: &[AttributeMetadata], completed: &PropertyMap) -> Vec<CompletionSuggestion> {
    attributes
        .iter()
        .filter(|a| !a.system && !has_property(completed, &a.name))
        .map(|attribute| {
            let name = attribute.name.as_str();
            let lower = name.to_lowercase();
            let priority = if attribute.required {
                SuggestionPriority::Critical
            } else if IMPORTANT_FIELDS.iter().any(|f| lower.contains(f)) {
                SuggestionPriority::Important
            } else {
                SuggestionPriority::Optional
            };

            let mut description = match priority {
                SuggestionPriority::Critical => format!("'{name}' is required"),
                SuggestionPriority::Important => format!("'{name}' is recommended"),
                SuggestionPriority::Optional => format!("'{name}' is optional"),
            };
            if let Some(clause) = explanation(&lower) {
                description.push_str("; ");
                description.push_str(clause);
            }

            let options = match attribute.data_type {
                DataType::Select | DataType::Status => attribute.options().to_vec(),
                _ => Vec::new(),
            };

            CompletionSuggestion {
                field: attribute.name.clone(),
                priority,
                description,
                data_type: attribute.data_type.as_str().to_string(),
                options,
            }
        })
        .collect()
}

fn explanation(lower_name: &str) -> Option<&'static str> {
    if lower_name.contains("serial_number") {
        Some("it uniquely identifies the hardware for warranty claims and audits")
    } else if lower_name.contains("model_name") {
        Some("it groups assets for support and refresh planning")
    } else if lower_name.contains("purchase_date") {
        Some("it drives depreciation and warranty tracking (YYYY-MM-DD)")
    } else {
        None
    }
}
