//! Public types for the assetgate API.

mod attribute;
mod completion;
mod entity;
mod property;
mod validation;

pub use attribute::{AttributeMetadata, DataType, find_attribute};
pub use completion::{
    CompletionResult, CompletionSuggestion, Confidence, DefaultApplication, SuggestionPriority,
};
pub use entity::{EntityInfo, EntityKind};
pub use property::{
    PropertyError, PropertyErrorKind, PropertyMap, PropertyResolution, ResolveMode,
    ResolvedProperty, has_property, property, property_text,
};
pub use validation::{
    ValidationCode, ValidationIssue, ValidationResult, ValidationWarning, WarningCode,
};
