//! The inventory source seam.
//!
//! Everything the core needs from the remote inventory goes through
//! [`InventorySource`]: listing schemas, listing a schema's object types and
//! fetching an object type's attribute descriptors. [`HttpInventoryClient`]
//! is the production implementation; tests plug in in-memory sources.
//!
//! [`HttpInventoryClient`]: super::HttpInventoryClient

use async_trait::async_trait;

use crate::Result;
use crate::types::{AttributeMetadata, EntityInfo};

/// Read access to schemas, object types and attribute metadata.
#[async_trait]
pub trait InventorySource: Send + Sync {
    /// Source name for logging/debugging.
    fn name(&self) -> &str;

    /// All schemas in the workspace.
    async fn list_schemas(&self) -> Result<Vec<EntityInfo>>;

    /// All object types of one schema, with `parent_id` set to the schema ID.
    async fn list_object_types(&self, schema_id: &str) -> Result<Vec<EntityInfo>>;

    /// Attribute descriptors of one object type, in display order.
    async fn object_type_attributes(&self, object_type_id: &str) -> Result<Vec<AttributeMetadata>>;
}
