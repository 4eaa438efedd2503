//! InventorySession - the per-workspace entry point

use std::path::PathBuf;
use std::sync::Arc;

use crate::cache::{DiskCache, ResolverCache};
use crate::complete::CompletionEngine;
use crate::logging::Logger;
use crate::metadata::AttributeMetadataResolver;
use crate::types::{AttributeMetadata, CompletionResult, EntityInfo, PropertyMap, ValidationResult};
use crate::validate::ObjectValidator;
use crate::{AssetgateError, Result};

/// One workspace's resolver cache, disk persistence, validator and
/// completion engine.
///
/// Safe to share across tasks behind an `Arc`; every in-flight request
/// reads and records into the same [`ResolverCache`].
pub struct InventorySession {
    pub(super) workspace_id: String,
    pub(super) site_url: String,
    pub(super) cache: Arc<ResolverCache>,
    pub(super) disk: Option<DiskCache>,
    pub(super) metadata: AttributeMetadataResolver,
    pub(super) validator: ObjectValidator,
    pub(super) completion: CompletionEngine,
    pub(super) logger: Arc<dyn Logger>,
}

impl std::fmt::Debug for InventorySession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InventorySession")
            .field("workspace_id", &self.workspace_id)
            .field("site_url", &self.site_url)
            .field("disk", &self.disk.as_ref().map(DiskCache::dir))
            .finish_non_exhaustive()
    }
}

impl InventorySession {
    pub fn workspace_id(&self) -> &str {
        &self.workspace_id
    }

    pub fn site_url(&self) -> &str {
        &self.site_url
    }

    /// The in-memory resolver tables.
    pub fn cache(&self) -> &Arc<ResolverCache> {
        &self.cache
    }

    pub fn disk_cache(&self) -> Option<&DiskCache> {
        self.disk.as_ref()
    }

    // ── Cache lifecycle ─────────────────────────────────────────────────

    /// Load the workspace's disk cache into memory.
    ///
    /// Returns `false` when there is no disk cache or the entry cannot be
    /// used. Missing, expired, corrupt and foreign entries are logged at
    /// info; an unreadable entry is logged as a warning and the session
    /// falls back to resolving on demand.
    pub async fn warm_cache(&self) -> Result<bool> {
        let Some(disk) = self.disk.clone() else {
            return Ok(false);
        };
        let (workspace_id, site_url) = (self.workspace_id.clone(), self.site_url.clone());

        match blocking(move || disk.load(&workspace_id, &site_url)).await {
            Ok(entry) => {
                self.logger.info(&format!(
                    "warmed resolver cache for workspace {} ({} schemas, {} object types)",
                    self.workspace_id,
                    entry.tables.schemas.len(),
                    entry.tables.object_types.len()
                ));
                self.cache.restore(entry.tables);
                Ok(true)
            }
            Err(e) if e.is_cache_miss() => {
                self.logger.info(&format!(
                    "no usable disk cache for workspace {}: {e}",
                    self.workspace_id
                ));
                Ok(false)
            }
            Err(e) => {
                self.logger.warn(&format!(
                    "unreadable disk cache for workspace {}, treating as a miss: {e}",
                    self.workspace_id
                ));
                Ok(false)
            }
        }
    }

    /// Save the in-memory tables to disk.
    ///
    /// Returns the file written, or `None` without a disk cache.
    pub async fn persist_cache(&self) -> Result<Option<PathBuf>> {
        let Some(disk) = self.disk.clone() else {
            return Ok(None);
        };
        let snapshot = self.cache.snapshot();
        let (workspace_id, site_url) = (self.workspace_id.clone(), self.site_url.clone());

        let path = blocking(move || disk.save_snapshot(&workspace_id, &site_url, snapshot)).await?;
        Ok(Some(path))
    }

    /// Fetch every schema and object type live, then persist.
    pub async fn refresh_cache(&self) -> Result<()> {
        self.metadata.refresh().await?;
        self.persist_cache().await?;
        Ok(())
    }

    /// Drop the in-memory tables. The disk cache is untouched.
    pub fn clear_memory_cache(&self) {
        self.cache.clear();
    }

    // ── Lookups ─────────────────────────────────────────────────────────

    pub async fn resolve_schema(&self, token: &str) -> Result<EntityInfo> {
        self.metadata.resolve_schema(token).await
    }

    pub async fn resolve_object_type(&self, token: &str) -> Result<EntityInfo> {
        self.metadata.resolve_object_type(token).await
    }

    /// Attribute metadata of an object type, always fetched live.
    pub async fn attributes(&self, object_type: &str) -> Result<Vec<AttributeMetadata>> {
        let (_, attributes) = self.metadata.attributes(object_type).await?;
        Ok(attributes)
    }

    // ── Validation and completion ───────────────────────────────────────

    pub async fn validate(&self, object_type: &str, properties: &PropertyMap) -> Result<ValidationResult> {
        self.validator.validate(object_type, properties).await
    }

    pub async fn validate_for_create(
        &self,
        object_type: &str,
        properties: &PropertyMap,
    ) -> Result<ValidationResult> {
        self.validator.validate_for_create(object_type, properties).await
    }

    pub async fn validate_for_update(
        &self,
        object_type: &str,
        properties: &PropertyMap,
    ) -> Result<ValidationResult> {
        self.validator.validate_for_update(object_type, properties).await
    }

    pub async fn complete(&self, object_type: &str, partial: &PropertyMap) -> Result<CompletionResult> {
        self.completion.complete(object_type, partial).await
    }
}

/// Run blocking disk work off the async executor.
async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AssetgateError::Task(e.to_string()))?
}
