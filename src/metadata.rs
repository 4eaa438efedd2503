//! Attribute metadata resolution.
//!
//! [`AttributeMetadataResolver`] translates a schema or object type token
//! (ID or name) through the shared [`ResolverCache`], falling back to a live
//! listing on a miss, and fetches attribute descriptors fresh on every call.
//! Attribute definitions can change between two validations of the same
//! workflow, so they are never cached.

use std::sync::Arc;

use futures_util::future::try_join_all;

use crate::cache::ResolverCache;
use crate::logging::Logger;
use crate::source::InventorySource;
use crate::types::{AttributeMetadata, EntityInfo, EntityKind};
use crate::{AssetgateError, Result};

/// Fetches attribute metadata, resolving names through the resolver cache.
#[derive(Clone)]
pub struct AttributeMetadataResolver {
    source: Arc<dyn InventorySource>,
    cache: Arc<ResolverCache>,
    logger: Arc<dyn Logger>,
}

impl std::fmt::Debug for AttributeMetadataResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttributeMetadataResolver")
            .field("source", &self.source.name())
            .finish_non_exhaustive()
    }
}

impl AttributeMetadataResolver {
    pub fn new(
        source: Arc<dyn InventorySource>,
        cache: Arc<ResolverCache>,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            source,
            cache,
            logger,
        }
    }

    pub fn cache(&self) -> &Arc<ResolverCache> {
        &self.cache
    }

    pub fn source(&self) -> &Arc<dyn InventorySource> {
        &self.source
    }

    /// Fetch every schema and object type from the source and record them.
    ///
    /// Object types of all schemas are listed concurrently.
    pub async fn refresh(&self) -> Result<()> {
        let schemas = self.source.list_schemas().await?;
        self.cache.record_all(EntityKind::Schema, schemas.iter().cloned());

        let listings = try_join_all(
            schemas
                .iter()
                .map(|schema| self.source.list_object_types(&schema.id)),
        )
        .await?;

        let type_count: usize = listings.iter().map(Vec::len).sum();
        self.cache
            .record_all(EntityKind::ObjectType, listings.into_iter().flatten());

        self.logger.info(&format!(
            "refreshed resolver cache from {}: {} schemas, {type_count} object types",
            self.source.name(),
            schemas.len()
        ));
        Ok(())
    }

    /// Resolve a schema ID or name.
    pub async fn resolve_schema(&self, token: &str) -> Result<EntityInfo> {
        if let Some(schema) = self.cache.resolve(EntityKind::Schema, token) {
            return Ok(schema);
        }

        let schemas = self.source.list_schemas().await?;
        self.cache.record_all(EntityKind::Schema, schemas);
        self.cache
            .resolve(EntityKind::Schema, token)
            .ok_or_else(|| AssetgateError::SchemaNotFound(token.to_string()))
    }

    /// Resolve an object type ID or name.
    ///
    /// On a cache miss every schema's object types are listed and recorded.
    /// A token that is still unknown afterwards is treated as a raw object
    /// type ID, so callers holding IDs the listing doesn't expose still work.
    pub async fn resolve_object_type(&self, token: &str) -> Result<EntityInfo> {
        if let Some(object_type) = self.cache.resolve(EntityKind::ObjectType, token) {
            return Ok(object_type);
        }

        self.logger.debug(&format!(
            "object type '{token}' not cached, listing object types from {}",
            self.source.name()
        ));
        let schemas = self.source.list_schemas().await?;
        self.cache.record_all(EntityKind::Schema, schemas.iter().cloned());
        for schema in &schemas {
            let types = self.source.list_object_types(&schema.id).await?;
            self.cache.record_all(EntityKind::ObjectType, types);
            if let Some(object_type) = self.cache.resolve(EntityKind::ObjectType, token) {
                return Ok(object_type);
            }
        }

        self.logger.debug(&format!(
            "object type '{token}' not found in any schema, using it as an ID"
        ));
        Ok(EntityInfo::new(token, token))
    }

    /// Attribute descriptors for an object type, fetched live.
    ///
    /// Any failure, including failure to resolve the token, is reported as
    /// a single [`AssetgateError::Metadata`].
    pub async fn attributes(&self, object_type: &str) -> Result<(EntityInfo, Vec<AttributeMetadata>)> {
        let aggregate = |e: AssetgateError| AssetgateError::Metadata {
            object_type: object_type.to_string(),
            message: e.to_string(),
        };

        let entity = self.resolve_object_type(object_type).await.map_err(aggregate)?;
        let attributes = self
            .source
            .object_type_attributes(&entity.id)
            .await
            .map_err(aggregate)?;

        if attributes.is_empty() {
            self.logger.warn(&format!(
                "object type '{}' ({}) has no attributes",
                entity.name, entity.id
            ));
        }
        Ok((entity, attributes))
    }
}
