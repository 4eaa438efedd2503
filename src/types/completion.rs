//! Completion output types.

use serde::{Deserialize, Serialize};

use super::{PropertyMap, ResolvedProperty};

/// How sure the engine is that a synthesized default is what the caller wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

/// A default value the engine filled in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefaultApplication {
    pub field: String,
    pub value: String,
    pub reason: String,
    pub confidence: Confidence,
}

/// Priority of a field the caller still needs to supply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionPriority {
    Critical,
    Important,
    Optional,
}

/// A field the caller has not supplied yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionSuggestion {
    pub field: String,
    pub priority: SuggestionPriority,
    pub description: String,
    pub data_type: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

/// Best-effort completed object.
///
/// Always carries whatever progress was made, even when `success` is false.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionResult {
    /// Every required field resolved.
    pub success: bool,
    pub object_type_id: String,
    pub completed_properties: PropertyMap,
    pub applied_defaults: Vec<DefaultApplication>,
    pub suggestions: Vec<CompletionSuggestion>,
    pub resolved: Vec<ResolvedProperty>,
    /// Required fields that are still missing after defaults.
    pub missing_critical: Vec<String>,
    /// Set when the property resolver itself failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution_error: Option<String>,
}

impl CompletionResult {
    pub fn default_for(&self, field: &str) -> Option<&DefaultApplication> {
        self.applied_defaults
            .iter()
            .find(|d| d.field.eq_ignore_ascii_case(field))
    }

    pub fn suggestion_for(&self, field: &str) -> Option<&CompletionSuggestion> {
        self.suggestions
            .iter()
            .find(|s| s.field.eq_ignore_ascii_case(field))
    }
}
