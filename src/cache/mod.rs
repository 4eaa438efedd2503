//! Caching subsystem.
//!
//! Two layers:
//!
//! - [`ResolverCache`]: in-memory name ↔ ID tables for schemas and object
//!   types, shared by every in-flight request of a session.
//!
//! - [`DiskCache`]: TTL-bounded JSON snapshots of a [`ResolverCache`], one
//!   file per workspace, so a restarted process can skip the schema and
//!   object type listing calls.
//!
//! Attribute metadata is deliberately absent from both layers; it is always
//! fetched live.

pub mod disk;
pub mod resolver;

pub use disk::{
    CACHE_FORMAT_VERSION, CacheInfo, DiskCache, DiskCacheConfig, PersistentCacheEntry, fingerprint,
};
pub use resolver::{ResolverCache, ResolverSnapshot};
