//! assetgate - schema resolution cache and validation engine for asset inventories
//!
//! Inventory APIs address schemas and object types by opaque IDs, while
//! people and automations refer to them by name. This crate keeps a shared
//! name ↔ ID [`ResolverCache`], persists it per workspace in a TTL-bounded
//! [`DiskCache`], and validates or completes property maps against the live
//! attribute metadata of an object type.
//!
//! # Example
//!
//! ```rust,no_run
//! use assetgate::{Assetgate, Credentials, DiskCacheConfig};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> assetgate::Result<()> {
//!     let session = Assetgate::builder()
//!         .workspace("3f2c9a1e", "https://acme.atlassian.net")
//!         .credentials(Credentials::Basic {
//!             email: "ops@acme.test".into(),
//!             token: "api-token".into(),
//!         })
//!         .disk_cache(DiskCacheConfig::default())
//!         .build()?;
//!
//!     if !session.warm_cache().await? {
//!         session.refresh_cache().await?;
//!     }
//!
//!     let properties = json!({"name": "Dev Laptop 42", "asset_tag": "IT-0042"});
//!     let verdict = session
//!         .validate_for_create("Laptops", properties.as_object().unwrap())
//!         .await?;
//!     for issue in &verdict.errors {
//!         println!("{}: {} ({})", issue.field, issue.message, issue.suggestion);
//!     }
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod complete;
pub mod config;
pub mod error;
pub mod gateway;
pub mod logging;
pub mod metadata;
pub mod resolve;
pub mod source;
pub mod telemetry;
pub mod types;
pub mod validate;
pub mod version;

// Re-export main types at crate root
pub use cache::{CacheInfo, DiskCache, DiskCacheConfig, PersistentCacheEntry, ResolverCache};
pub use complete::CompletionEngine;
pub use config::{Config, Secrets};
pub use error::{AssetgateError, Result};
pub use gateway::{Assetgate, AssetgateBuilder, InventorySession};
pub use logging::{Level, Logger, MemoryLogger, NoopLogger, TracingLogger};
pub use metadata::AttributeMetadataResolver;
pub use resolve::{MetadataPropertyResolver, PropertyResolver};
pub use source::{Credentials, HttpInventoryClient, InventorySource};
pub use validate::{BusinessRule, ObjectValidator, RuleContext};

// Re-export all types
pub use types::{
    AttributeMetadata, CompletionResult, CompletionSuggestion, Confidence, DataType,
    DefaultApplication, EntityInfo, EntityKind, PropertyError, PropertyErrorKind, PropertyMap,
    PropertyResolution, ResolveMode, ResolvedProperty, SuggestionPriority, ValidationCode,
    ValidationIssue, ValidationResult, ValidationWarning, WarningCode,
};
