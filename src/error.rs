//! assetgate error types

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

/// assetgate error types
#[derive(Debug, thiserror::Error)]
pub enum AssetgateError {
    // Inventory API errors
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("schema not found: {0}")]
    SchemaNotFound(String),

    #[error("object type not found: {0}")]
    ObjectTypeNotFound(String),

    /// Attribute metadata for an object type could not be retrieved.
    ///
    /// Validation and completion never proceed without metadata, so this
    /// is fatal to the enclosing call.
    #[error("failed to fetch attribute metadata for object type '{object_type}': {message}")]
    Metadata {
        object_type: String,
        message: String,
    },

    // Cache-miss class: callers fall back to a live fetch
    #[error("no cache entry at {}", path.display())]
    CacheNotFound { path: PathBuf },

    #[error("cache entry for workspace '{workspace_id}' expired at {expired_at}")]
    CacheExpired {
        workspace_id: String,
        expired_at: DateTime<Utc>,
    },

    #[error("corrupt cache entry at {}: {reason}", path.display())]
    CacheCorrupt { path: PathBuf, reason: String },

    #[error("cache entry belongs to workspace '{found}', expected '{expected}'")]
    CacheMismatch { expected: String, found: String },

    // Filesystem errors
    #[error("failed to {operation} {}: {source}", path.display())]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Data errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A blocking cache task panicked or was cancelled.
    #[error("background task failed: {0}")]
    Task(String),
}

impl AssetgateError {
    /// Wrap an I/O error with the operation and path it failed on.
    pub fn io(operation: &'static str, path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            operation,
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Whether this error means "the disk cache has nothing usable".
    ///
    /// These are never surfaced to end users; the caller repopulates the
    /// cache from the inventory API instead.
    pub fn is_cache_miss(&self) -> bool {
        matches!(
            self,
            Self::CacheNotFound { .. }
                | Self::CacheExpired { .. }
                | Self::CacheCorrupt { .. }
                | Self::CacheMismatch { .. }
        )
    }

    /// Short label used for the `reason` metric label on cache misses.
    pub(crate) fn miss_reason(&self) -> &'static str {
        match self {
            Self::CacheNotFound { .. } => "not_found",
            Self::CacheExpired { .. } => "expired",
            Self::CacheCorrupt { .. } => "corrupt",
            Self::CacheMismatch { .. } => "mismatch",
            _ => "error",
        }
    }

    /// Whether a retry of the same inventory API call might succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(_) => true,
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// Result type alias for assetgate operations
pub type Result<T> = std::result::Result<T, AssetgateError>;
