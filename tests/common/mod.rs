//! Shared fixtures: an in-memory inventory with an "IT Assets" schema.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::Value;

use assetgate::logging::MemoryLogger;
use assetgate::{
    AssetgateError, AttributeMetadata, DataType, EntityInfo, InventorySession, InventorySource,
    PropertyMap, Result,
};

pub const WORKSPACE: &str = "ws-7f3a";
pub const SITE: &str = "https://acme.atlassian.net";

/// Inventory source backed by maps, counting remote calls.
#[derive(Default)]
pub struct InMemorySource {
    pub schemas: Vec<EntityInfo>,
    pub object_types: HashMap<String, Vec<EntityInfo>>,
    pub attributes: HashMap<String, Vec<AttributeMetadata>>,
    pub list_calls: AtomicUsize,
    pub attribute_calls: AtomicUsize,
}

impl InMemorySource {
    /// "IT Assets" (1) with "Laptops" (12) and "Servers" (13);
    /// "Facilities" (2) with "Desks" (21).
    pub fn it_assets() -> Self {
        let mut source = Self {
            schemas: vec![
                EntityInfo::new("1", "IT Assets"),
                EntityInfo::new("2", "Facilities"),
            ],
            ..Default::default()
        };
        source.object_types.insert(
            "1".into(),
            vec![
                EntityInfo::new("12", "Laptops").with_parent("1"),
                EntityInfo::new("13", "Servers").with_parent("1"),
            ],
        );
        source
            .object_types
            .insert("2".into(), vec![EntityInfo::new("21", "Desks").with_parent("2")]);
        source.attributes.insert("12".into(), laptop_attributes());
        source.attributes.insert("13".into(), laptop_attributes());
        source
            .attributes
            .insert("21".into(), vec![AttributeMetadata::new("name").required()]);
        source
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn attribute_calls(&self) -> usize {
        self.attribute_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InventorySource for InMemorySource {
    fn name(&self) -> &str {
        "in-memory"
    }

    async fn list_schemas(&self) -> Result<Vec<EntityInfo>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.schemas.clone())
    }

    async fn list_object_types(&self, schema_id: &str) -> Result<Vec<EntityInfo>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.object_types
            .get(schema_id)
            .cloned()
            .ok_or_else(|| AssetgateError::SchemaNotFound(schema_id.to_string()))
    }

    async fn object_type_attributes(&self, object_type_id: &str) -> Result<Vec<AttributeMetadata>> {
        self.attribute_calls.fetch_add(1, Ordering::SeqCst);
        self.attributes
            .get(object_type_id)
            .cloned()
            .ok_or_else(|| AssetgateError::ObjectTypeNotFound(object_type_id.to_string()))
    }
}

/// Attributes of the "Laptops" object type.
pub fn laptop_attributes() -> Vec<AttributeMetadata> {
    vec![
        AttributeMetadata::new("Key").system(),
        AttributeMetadata::new("name").required(),
        AttributeMetadata::new("serial_number").required(),
        AttributeMetadata::new("asset_tag"),
        AttributeMetadata::new("model_name"),
        AttributeMetadata::new("purchase_date").data_type(DataType::Date),
        AttributeMetadata::new("last_audit").data_type(DataType::DateTime),
        AttributeMetadata::new("owner").data_type(DataType::Reference),
        AttributeMetadata::new("asset_status").status(["In Stock", "In Use", "Retired"]),
        AttributeMetadata::new("device_type").select(["Physical", "Virtual"]),
        AttributeMetadata::new("ownership_type").select(["Company Owned", "BYOD", "Leased"]),
        AttributeMetadata::new("Created").system().data_type(DataType::DateTime),
    ]
}

/// Session over [`InMemorySource::it_assets`] without a disk cache.
pub fn session() -> (InventorySession, Arc<InMemorySource>, MemoryLogger) {
    let source = Arc::new(InMemorySource::it_assets());
    let logger = MemoryLogger::new();
    let session = assetgate::Assetgate::builder()
        .workspace(WORKSPACE, SITE)
        .source(source.clone())
        .logger(Arc::new(logger.clone()))
        .build()
        .unwrap();
    (session, source, logger)
}

/// Build a property map from a JSON object literal.
pub fn props(value: Value) -> PropertyMap {
    value.as_object().cloned().expect("properties must be a JSON object")
}
