//! Builder for configuring inventory sessions

use std::sync::Arc;

use super::InventorySession;
use crate::cache::{DiskCache, DiskCacheConfig, ResolverCache};
use crate::complete::CompletionEngine;
use crate::config::{Config, Secrets};
use crate::logging::{Logger, default_logger};
use crate::metadata::AttributeMetadataResolver;
use crate::resolve::{MetadataPropertyResolver, PropertyResolver};
use crate::source::{Credentials, HttpInventoryClient, InventorySource};
use crate::validate::{BusinessRule, ObjectValidator};
use crate::{AssetgateError, Result};

/// Main entry point for creating inventory sessions.
pub struct Assetgate;

impl Assetgate {
    /// Create a new builder for configuring a session.
    pub fn builder() -> AssetgateBuilder {
        AssetgateBuilder::new()
    }
}

/// Builder for configuring inventory sessions.
pub struct AssetgateBuilder {
    workspace_id: Option<String>,
    site_url: Option<String>,
    source: Option<Arc<dyn InventorySource>>,
    credentials: Option<Credentials>,
    property_resolver: Option<Arc<dyn PropertyResolver>>,
    disk_cache: Option<DiskCacheConfig>,
    logger: Option<Arc<dyn Logger>>,
    rules: Vec<BusinessRule>,
}

impl AssetgateBuilder {
    pub fn new() -> Self {
        Self {
            workspace_id: None,
            site_url: None,
            source: None,
            credentials: None,
            property_resolver: None,
            disk_cache: None,
            logger: None,
            rules: Vec::new(),
        }
    }

    /// Builder pre-filled from a loaded configuration.
    ///
    /// Uses the HTTP source with the configured base URL and timeout, and
    /// enables the disk cache unless the configuration disables it.
    pub fn from_config(config: &Config, secrets: &Secrets) -> Result<Self> {
        let client = config.http_client(secrets)?;
        let mut builder = Self::new()
            .workspace(&config.workspace.id, &config.workspace.site_url)
            .source(Arc::new(client));
        if let Some(disk) = config.disk_cache() {
            builder = builder.disk_cache(disk);
        }
        Ok(builder)
    }

    /// Workspace the session operates on. Required.
    pub fn workspace(mut self, workspace_id: impl Into<String>, site_url: impl Into<String>) -> Self {
        self.workspace_id = Some(workspace_id.into());
        self.site_url = Some(site_url.into());
        self
    }

    /// Use a custom inventory source.
    pub fn source(mut self, source: Arc<dyn InventorySource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Use the HTTP inventory API of the configured site.
    ///
    /// Ignored when an explicit [`source`](Self::source) is set.
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Replace the built-in [`MetadataPropertyResolver`].
    pub fn property_resolver(mut self, resolver: Arc<dyn PropertyResolver>) -> Self {
        self.property_resolver = Some(resolver);
        self
    }

    /// Persist resolver tables to disk.
    pub fn disk_cache(mut self, config: DiskCacheConfig) -> Self {
        self.disk_cache = Some(config);
        self
    }

    /// Logging capability shared by every component (default: `tracing`).
    pub fn logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Add a validation rule after the built-in ones.
    pub fn rule(mut self, rule: BusinessRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Build the session.
    pub fn build(self) -> Result<InventorySession> {
        let (Some(workspace_id), Some(site_url)) = (self.workspace_id, self.site_url) else {
            return Err(AssetgateError::Configuration(
                "no workspace configured".to_string(),
            ));
        };

        let source: Arc<dyn InventorySource> = match (self.source, self.credentials) {
            (Some(source), _) => source,
            (None, Some(credentials)) => {
                Arc::new(HttpInventoryClient::new(&site_url, &workspace_id, credentials)?)
            }
            (None, None) => {
                return Err(AssetgateError::Configuration(
                    "no inventory source configured".to_string(),
                ));
            }
        };

        let logger = self.logger.unwrap_or_else(default_logger);
        let resolver = self
            .property_resolver
            .unwrap_or_else(|| Arc::new(MetadataPropertyResolver::new()));
        let cache = Arc::new(ResolverCache::new());
        let disk = self
            .disk_cache
            .map(|config| DiskCache::with_logger(config, logger.clone()));

        let metadata = AttributeMetadataResolver::new(source, cache.clone(), logger.clone());
        let validator = self.rules.into_iter().fold(
            ObjectValidator::new(metadata.clone(), resolver.clone(), logger.clone()),
            ObjectValidator::with_rule,
        );
        let completion = CompletionEngine::new(metadata.clone(), resolver, logger.clone());

        Ok(InventorySession {
            workspace_id,
            site_url,
            cache,
            disk,
            metadata,
            validator,
            completion,
            logger,
        })
    }
}

impl Default for AssetgateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
