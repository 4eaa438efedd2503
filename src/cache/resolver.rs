//! In-memory name ↔ ID resolver for schemas and object types.
//!
//! Four tables: schemas by ID, schemas by name, object types by ID and
//! object types by name. Every by-name entry has a matching by-ID entry
//! holding the same [`EntityInfo`]. Names are not unique across schemas:
//! when two IDs share a name, both stay resolvable by ID and the name
//! resolves to the most recently recorded one.
//! [`ResolverCache::record`] updates both tables of a kind under one write
//! lock so no reader ever sees only half of an update.
//!
//! The cache grows for the lifetime of the session; the only way to shrink
//! it is [`ResolverCache::clear`].

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};

use crate::telemetry;
use crate::types::{EntityInfo, EntityKind};

/// Paired by-ID / by-name maps for one entity kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Tables {
    by_id: HashMap<String, EntityInfo>,
    by_name: HashMap<String, EntityInfo>,
}

impl Tables {
    fn resolve(&self, token: &str) -> Option<&EntityInfo> {
        self.by_id.get(token).or_else(|| self.by_name.get(token))
    }

    fn record(&mut self, entity: EntityInfo) {
        // A rename leaves the old name pointing at this ID.
        if let Some(previous) = self.by_id.get(&entity.id)
            && previous.name != entity.name
        {
            let old_name = previous.name.clone();
            if self.by_name.get(&old_name).is_some_and(|e| e.id == entity.id) {
                self.by_name.remove(&old_name);
            }
        }

        self.by_id.insert(entity.id.clone(), entity.clone());
        self.by_name.insert(entity.name.clone(), entity);
    }

    /// Re-apply saved name owners after the by-ID entries were recorded.
    ///
    /// Entries whose ID is unknown are recorded; entries that disagree with
    /// the by-ID table are stale and skipped.
    fn restore_names(&mut self, by_name: HashMap<String, EntityInfo>) {
        for (name, entity) in by_name {
            match self.by_id.get(&entity.id) {
                None => self.record(entity),
                Some(current) if current.name == name => {
                    self.by_name.insert(name, current.clone());
                }
                Some(_) => {}
            }
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    schemas: Tables,
    object_types: Tables,
}

impl Inner {
    fn tables(&self, kind: EntityKind) -> &Tables {
        match kind {
            EntityKind::Schema => &self.schemas,
            EntityKind::ObjectType => &self.object_types,
        }
    }

    fn tables_mut(&mut self, kind: EntityKind) -> &mut Tables {
        match kind {
            EntityKind::Schema => &mut self.schemas,
            EntityKind::ObjectType => &mut self.object_types,
        }
    }
}

/// An owned, detached copy of all four resolver tables.
///
/// This is what gets handed to the disk cache: the live cache may keep
/// changing while a snapshot is being serialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverSnapshot {
    pub schemas: HashMap<String, EntityInfo>,
    pub schemas_by_name: HashMap<String, EntityInfo>,
    pub object_types: HashMap<String, EntityInfo>,
    pub types_by_name: HashMap<String, EntityInfo>,
}

impl ResolverSnapshot {
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty() && self.object_types.is_empty()
    }
}

/// Thread-safe schema / object type resolver.
///
/// Reads proceed concurrently; writes are serialized. Share across
/// in-flight requests with `Arc<ResolverCache>`.
#[derive(Debug, Default)]
pub struct ResolverCache {
    inner: RwLock<Inner>,
}

impl ResolverCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a cache from a snapshot (e.g. one loaded from disk).
    ///
    /// Entries are re-recorded rather than copied table by table, so a
    /// snapshot whose tables disagree still yields a consistent cache.
    pub fn from_snapshot(snapshot: ResolverSnapshot) -> Self {
        let cache = Self::new();
        cache.restore(snapshot);
        cache
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Look up an entity by ID, falling back to name.
    pub fn resolve(&self, kind: EntityKind, token: &str) -> Option<EntityInfo> {
        let found = self.read().tables(kind).resolve(token).cloned();
        let outcome = if found.is_some() { "hit" } else { "miss" };
        metrics::counter!(
            telemetry::RESOLVER_LOOKUPS_TOTAL,
            "kind" => kind.as_str(),
            "outcome" => outcome
        )
        .increment(1);
        found
    }

    /// Insert an entity into both tables of its kind.
    pub fn record(&self, kind: EntityKind, entity: EntityInfo) {
        self.write().tables_mut(kind).record(entity);
    }

    /// Insert many entities under a single write lock.
    pub fn record_all(&self, kind: EntityKind, entities: impl IntoIterator<Item = EntityInfo>) {
        let mut inner = self.write();
        let tables = inner.tables_mut(kind);
        for entity in entities {
            tables.record(entity);
        }
    }

    /// All entities of a kind, in no particular order.
    pub fn entities(&self, kind: EntityKind) -> Vec<EntityInfo> {
        self.read().tables(kind).by_id.values().cloned().collect()
    }

    /// Number of entities of a kind.
    pub fn len(&self, kind: EntityKind) -> usize {
        self.read().tables(kind).by_id.len()
    }

    /// Whether both kinds are empty.
    pub fn is_empty(&self) -> bool {
        let inner = self.read();
        inner.schemas.by_id.is_empty() && inner.object_types.by_id.is_empty()
    }

    /// Deep copy of all four tables, taken under one read lock.
    pub fn snapshot(&self) -> ResolverSnapshot {
        let inner = self.read();
        ResolverSnapshot {
            schemas: inner.schemas.by_id.clone(),
            schemas_by_name: inner.schemas.by_name.clone(),
            object_types: inner.object_types.by_id.clone(),
            types_by_name: inner.object_types.by_name.clone(),
        }
    }

    /// Merge a snapshot into this cache.
    pub fn restore(&self, snapshot: ResolverSnapshot) {
        let mut inner = self.write();
        for entity in snapshot.schemas.into_values() {
            inner.schemas.record(entity);
        }
        inner.schemas.restore_names(snapshot.schemas_by_name);
        for entity in snapshot.object_types.into_values() {
            inner.object_types.record(entity);
        }
        inner.object_types.restore_names(snapshot.types_by_name);
    }

    /// Drop every entry.
    pub fn clear(&self) {
        let mut inner = self.write();
        inner.schemas = Tables::default();
        inner.object_types = Tables::default();
    }
}
