//! Disk persistence for [`ResolverCache`] snapshots.
//!
//! One JSON file per (workspace, site) pair, stored under
//! `<base_dir>/resolver/`. The file name is the hex SHA-256 fingerprint of
//! the workspace ID and site URL, so it is stable across restarts and never
//! contains anything user-supplied.
//!
//! # Expiry
//!
//! Every entry records `cached_at` and `expires_at = cached_at + ttl`. A
//! load at or after `expires_at` fails with
//! [`AssetgateError::CacheExpired`]; stale data is never returned.
//!
//! # Atomicity
//!
//! Saves serialize into a uniquely named temporary file in the cache
//! directory and then rename it over the final path. Readers see either the
//! previous file or the new one, never a partial write. A crash before the
//! rename leaves the previous entry in place. Concurrent writers for the
//! same workspace are last-rename-wins.
//!
//! # Failure classes
//!
//! Missing, expired, corrupt and mismatched entries are cache misses (see
//! [`AssetgateError::is_cache_miss`]): the caller refetches from the
//! inventory and saves again. Filesystem errors while saving, listing or
//! clearing are returned as [`AssetgateError::Io`].

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::{ResolverCache, ResolverSnapshot};
use crate::logging::{Logger, default_logger};
use crate::telemetry;
use crate::{AssetgateError, Result};

/// Current on-disk format version.
pub const CACHE_FORMAT_VERSION: u32 = 1;

/// Subdirectory of the base directory that holds cache files.
const CACHE_SUBDIR: &str = "resolver";

const CACHE_EXTENSION: &str = "json";

/// Distinguishes temporary files written concurrently by one process.
static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Configuration for the disk cache.
///
/// ```rust
/// # use assetgate::DiskCacheConfig;
/// let config = DiskCacheConfig::new("/tmp/assetgate").ttl_hours(12);
/// assert_eq!(config.ttl.as_secs(), 12 * 3600);
/// ```
#[derive(Debug, Clone)]
pub struct DiskCacheConfig {
    /// Base directory. Cache files live in a `resolver/` subdirectory.
    pub base_dir: PathBuf,
    /// Time-to-live for saved entries. Default: 24 hours.
    pub ttl: Duration,
}

impl Default for DiskCacheConfig {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
            ttl: Duration::from_secs(24 * 3600),
        }
    }
}

impl DiskCacheConfig {
    /// Config rooted at `base_dir` with the default TTL.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            ..Default::default()
        }
    }

    /// Set the time-to-live.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the time-to-live in hours.
    pub fn ttl_hours(self, hours: u64) -> Self {
        self.ttl(Duration::from_secs(hours.saturating_mul(3600)))
    }
}

/// Default base directory: `~/.cache/assetgate`.
pub fn default_base_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from(".cache"))
        .join("assetgate")
}

/// Deterministic cache key for a workspace.
///
/// The two inputs are separated by a NUL byte so `("ab", "c")` and
/// `("a", "bc")` hash differently.
pub fn fingerprint(workspace_id: &str, site_url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(workspace_id.as_bytes());
    hasher.update([0u8]);
    hasher.update(site_url.as_bytes());
    hex::encode(hasher.finalize())
}

/// A persisted resolver snapshot plus provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistentCacheEntry {
    pub workspace_id: String,
    pub site_url: String,
    #[serde(flatten)]
    pub tables: ResolverSnapshot,
    pub cached_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub version: u32,
}

impl PersistentCacheEntry {
    /// Whether the entry is past its expiry at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Rebuild a live resolver cache from this entry.
    pub fn into_resolver_cache(self) -> ResolverCache {
        ResolverCache::from_snapshot(self.tables)
    }
}

/// Summary of one cache file, for inspection.
///
/// Derived from the file; never used as a source of truth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheInfo {
    pub workspace_id: String,
    pub site_url: String,
    pub schema_count: usize,
    pub object_type_count: usize,
    pub cached_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub expired: bool,
    pub size_bytes: u64,
    pub file_name: String,
}

impl CacheInfo {
    fn from_entry(entry: &PersistentCacheEntry, size_bytes: u64, file_name: String, now: DateTime<Utc>) -> Self {
        Self {
            workspace_id: entry.workspace_id.clone(),
            site_url: entry.site_url.clone(),
            schema_count: entry.tables.schemas.len(),
            object_type_count: entry.tables.object_types.len(),
            cached_at: entry.cached_at,
            expires_at: entry.expires_at,
            expired: entry.is_expired_at(now),
            size_bytes,
            file_name,
        }
    }
}

/// TTL-bounded disk persistence for resolver caches.
///
/// Cheap to clone; clones share configuration and logger.
#[derive(Debug, Clone)]
pub struct DiskCache {
    dir: PathBuf,
    ttl: Duration,
    logger: Arc<dyn Logger>,
}

impl DiskCache {
    /// Create a disk cache logging through `tracing`.
    pub fn new(config: DiskCacheConfig) -> Self {
        Self::with_logger(config, default_logger())
    }

    /// Create a disk cache with an explicit logger.
    pub fn with_logger(config: DiskCacheConfig, logger: Arc<dyn Logger>) -> Self {
        Self {
            dir: config.base_dir.join(CACHE_SUBDIR),
            ttl: config.ttl,
            logger,
        }
    }

    /// Directory holding the cache files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Path of the cache file for a workspace.
    pub fn cache_path(&self, workspace_id: &str, site_url: &str) -> PathBuf {
        self.dir
            .join(format!("{}.{CACHE_EXTENSION}", fingerprint(workspace_id, site_url)))
    }

    /// Load the entry for a workspace.
    ///
    /// Fails with a cache-miss error when the entry is absent, corrupt,
    /// belongs to another workspace or has expired.
    pub fn load(&self, workspace_id: &str, site_url: &str) -> Result<PersistentCacheEntry> {
        let result = self.load_inner(workspace_id, site_url);
        match &result {
            Ok(_) => metrics::counter!(telemetry::DISK_CACHE_HITS_TOTAL).increment(1),
            Err(e) => {
                metrics::counter!(telemetry::DISK_CACHE_MISSES_TOTAL, "reason" => e.miss_reason())
                    .increment(1);
            }
        }
        result
    }

    fn load_inner(&self, workspace_id: &str, site_url: &str) -> Result<PersistentCacheEntry> {
        let path = self.cache_path(workspace_id, site_url);
        let (entry, _) = read_entry(&path)?;

        if entry.workspace_id != workspace_id {
            return Err(AssetgateError::CacheMismatch {
                expected: workspace_id.to_string(),
                found: entry.workspace_id,
            });
        }
        if entry.is_expired_at(Utc::now()) {
            return Err(AssetgateError::CacheExpired {
                workspace_id: entry.workspace_id,
                expired_at: entry.expires_at,
            });
        }

        self.logger.debug(&format!(
            "loaded resolver cache for workspace {workspace_id} ({} schemas, {} object types)",
            entry.tables.schemas.len(),
            entry.tables.object_types.len()
        ));
        Ok(entry)
    }

    /// Persist a snapshot of `cache` for a workspace.
    ///
    /// The snapshot is taken up front; `cache` may keep changing while the
    /// file is written.
    pub fn save(&self, workspace_id: &str, site_url: &str, cache: &ResolverCache) -> Result<PathBuf> {
        self.save_snapshot(workspace_id, site_url, cache.snapshot())
    }

    /// Persist an already-detached snapshot for a workspace.
    pub fn save_snapshot(
        &self,
        workspace_id: &str,
        site_url: &str,
        tables: ResolverSnapshot,
    ) -> Result<PathBuf> {
        let ttl = TimeDelta::from_std(self.ttl).map_err(|e| {
            AssetgateError::Configuration(format!("cache TTL {:?} out of range: {e}", self.ttl))
        })?;
        let cached_at = Utc::now();
        let expires_at = cached_at.checked_add_signed(ttl).ok_or_else(|| {
            AssetgateError::Configuration(format!("cache TTL {:?} out of range", self.ttl))
        })?;
        let entry = PersistentCacheEntry {
            workspace_id: workspace_id.to_string(),
            site_url: site_url.to_string(),
            tables,
            cached_at,
            expires_at,
            version: CACHE_FORMAT_VERSION,
        };

        fs::create_dir_all(&self.dir)
            .map_err(|e| AssetgateError::io("create cache directory", &self.dir, e))?;

        let path = self.cache_path(workspace_id, site_url);
        let json = serde_json::to_vec_pretty(&entry)?;
        write_atomic(&path, &json)?;

        self.logger.debug(&format!(
            "saved resolver cache for workspace {workspace_id} to {}",
            path.display()
        ));
        Ok(path)
    }

    /// Summaries of every readable cache file, in no particular order.
    ///
    /// Unreadable or corrupt files are logged and skipped.
    pub fn list_cached_workspaces(&self) -> Result<Vec<CacheInfo>> {
        let read_dir = match fs::read_dir(&self.dir) {
            Ok(rd) => rd,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(AssetgateError::io("list cache directory", &self.dir, e)),
        };

        let now = Utc::now();
        let mut infos = Vec::new();
        for dir_entry in read_dir {
            let dir_entry = match dir_entry {
                Ok(d) => d,
                Err(e) => {
                    self.logger
                        .warn(&format!("skipping unreadable entry in {}: {e}", self.dir.display()));
                    continue;
                }
            };
            let path = dir_entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(CACHE_EXTENSION) || !path.is_file() {
                continue;
            }

            match read_entry(&path) {
                Ok((entry, size)) => {
                    let file_name = dir_entry.file_name().to_string_lossy().into_owned();
                    infos.push(CacheInfo::from_entry(&entry, size, file_name, now));
                }
                Err(e) => {
                    self.logger
                        .warn(&format!("skipping cache file {}: {e}", path.display()));
                }
            }
        }
        Ok(infos)
    }

    /// Remove every expired entry. Returns how many files were removed.
    ///
    /// Each file is re-read just before removal, so an entry refreshed by
    /// another process after the directory scan is kept.
    pub fn clear_expired(&self) -> Result<usize> {
        let mut removed = 0;
        for info in self.list_cached_workspaces()? {
            if !info.expired {
                continue;
            }
            if self.remove_if_expired(&self.dir.join(&info.file_name), Utc::now())? {
                removed += 1;
                self.logger.info(&format!(
                    "evicted expired resolver cache for workspace {}",
                    info.workspace_id
                ));
            }
        }
        Ok(removed)
    }

    /// Remove `path` if its entry is still expired at `now`.
    ///
    /// A file that vanished or no longer parses is left to the next scan.
    fn remove_if_expired(&self, path: &Path, now: DateTime<Utc>) -> Result<bool> {
        match read_entry(path) {
            Ok((entry, _)) if entry.is_expired_at(now) => remove_if_present(path),
            Ok(_) => {
                self.logger
                    .debug(&format!("keeping refreshed cache file {}", path.display()));
                Ok(false)
            }
            Err(e) if e.is_cache_miss() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Remove the entry for one workspace. Returns whether a file existed.
    pub fn evict(&self, workspace_id: &str, site_url: &str) -> Result<bool> {
        remove_if_present(&self.cache_path(workspace_id, site_url))
    }

    /// Remove the whole cache directory.
    pub fn clear_all(&self) -> Result<()> {
        match fs::remove_dir_all(&self.dir) {
            Ok(()) => {
                self.logger
                    .info(&format!("cleared resolver cache directory {}", self.dir.display()));
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AssetgateError::io("remove cache directory", &self.dir, e)),
        }
    }
}

/// Read and parse one cache file, returning the entry and its size.
fn read_entry(path: &Path) -> Result<(PersistentCacheEntry, u64)> {
    let content = match fs::read(path) {
        Ok(c) => c,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(AssetgateError::CacheNotFound {
                path: path.to_path_buf(),
            });
        }
        Err(e) => return Err(AssetgateError::io("read cache file", path, e)),
    };

    let entry: PersistentCacheEntry =
        serde_json::from_slice(&content).map_err(|e| AssetgateError::CacheCorrupt {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    if entry.version > CACHE_FORMAT_VERSION {
        return Err(AssetgateError::CacheCorrupt {
            path: path.to_path_buf(),
            reason: format!(
                "unsupported cache version {} (max supported: {CACHE_FORMAT_VERSION})",
                entry.version
            ),
        });
    }
    Ok((entry, content.len() as u64))
}

/// Write `bytes` to a temporary sibling of `path`, then rename it into place.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp_path = path.with_file_name(format!(
        ".{file_name}.{}.{}.tmp",
        std::process::id(),
        TMP_COUNTER.fetch_add(1, Ordering::Relaxed)
    ));

    if let Err(e) = fs::write(&tmp_path, bytes) {
        let _ = fs::remove_file(&tmp_path);
        return Err(AssetgateError::io("write cache file", &tmp_path, e));
    }
    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(AssetgateError::io("rename cache file into", path, e));
    }
    Ok(())
}

fn remove_if_present(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(AssetgateError::io("remove cache file", path, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::{Level, MemoryLogger};
    use crate::types::{EntityInfo, EntityKind};

    const SITE: &str = "https://acme.atlassian.net";

    fn sample_cache() -> ResolverCache {
        let cache = ResolverCache::new();
        cache.record(EntityKind::Schema, EntityInfo::new("1", "IT Assets"));
        cache.record(EntityKind::Schema, EntityInfo::new("2", "Facilities"));
        cache.record(
            EntityKind::ObjectType,
            EntityInfo::new("12", "Laptops").with_parent("1"),
        );
        cache.record(
            EntityKind::ObjectType,
            EntityInfo::new("21", "Desks").with_parent("2"),
        );
        cache
    }

    fn disk(dir: &Path) -> DiskCache {
        DiskCache::with_logger(DiskCacheConfig::new(dir), Arc::new(MemoryLogger::new()))
    }

    fn disk_with_ttl(dir: &Path, ttl: Duration) -> DiskCache {
        DiskCache::with_logger(
            DiskCacheConfig::new(dir).ttl(ttl),
            Arc::new(MemoryLogger::new()),
        )
    }

    fn tmp_files(dir: &Path) -> Vec<PathBuf> {
        fs::read_dir(dir)
            .map(|rd| {
                rd.filter_map(|e| e.ok())
                    .map(|e| e.path())
                    .filter(|p| p.to_string_lossy().ends_with(".tmp"))
                    .collect()
            })
            .unwrap_or_default()
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let disk = disk(dir.path());
        let cache = sample_cache();

        disk.save("W1", SITE, &cache).unwrap();
        let entry = disk.load("W1", SITE).unwrap();

        assert_eq!(entry.tables, cache.snapshot());
        assert_eq!(entry.workspace_id, "W1");
        assert_eq!(entry.site_url, SITE);
        assert_eq!(entry.version, CACHE_FORMAT_VERSION);
        assert_eq!(entry.expires_at - entry.cached_at, TimeDelta::hours(24));
    }

    #[test]
    fn on_disk_format_uses_flat_tables() {
        let dir = tempfile::tempdir().unwrap();
        let disk = disk(dir.path());
        let path = disk.save("W1", SITE, &sample_cache()).unwrap();

        let raw: serde_json::Value = serde_json::from_slice(&fs::read(path).unwrap()).unwrap();
        assert_eq!(raw["workspace_id"], "W1");
        assert!(raw["schemas"].is_object());
        assert!(raw["schemas_by_name"]["IT Assets"].is_object());
        assert!(raw["types_by_name"]["Laptops"].is_object());
        assert_eq!(raw["object_types"]["12"]["parent_id"], "1");
    }

    #[test]
    fn zero_ttl_is_always_expired() {
        let dir = tempfile::tempdir().unwrap();
        let disk = disk_with_ttl(dir.path(), Duration::ZERO);
        disk.save("W1", SITE, &sample_cache()).unwrap();

        let err = disk.load("W1", SITE).unwrap_err();
        assert!(matches!(err, AssetgateError::CacheExpired { .. }), "{err}");
        assert!(err.is_cache_miss());
    }

    #[test]
    fn missing_entry_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = disk(dir.path()).load("W1", SITE).unwrap_err();
        assert!(matches!(err, AssetgateError::CacheNotFound { .. }));
        assert!(err.is_cache_miss());
    }

    #[test]
    fn garbage_file_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let disk = disk(dir.path());
        let path = disk.cache_path("W1", SITE);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "not json {{{").unwrap();

        let err = disk.load("W1", SITE).unwrap_err();
        assert!(matches!(err, AssetgateError::CacheCorrupt { .. }));
    }

    #[test]
    fn future_version_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let disk = disk(dir.path());
        let path = disk.save("W1", SITE, &sample_cache()).unwrap();

        let mut raw: serde_json::Value = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        raw["version"] = serde_json::json!(999);
        fs::write(&path, serde_json::to_vec(&raw).unwrap()).unwrap();

        let err = disk.load("W1", SITE).unwrap_err();
        assert!(err.to_string().contains("unsupported cache version"));
    }

    #[test]
    fn foreign_workspace_is_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let disk = disk(dir.path());
        let other = disk.save("W2", SITE, &sample_cache()).unwrap();
        fs::copy(&other, disk.cache_path("W1", SITE)).unwrap();

        let err = disk.load("W1", SITE).unwrap_err();
        match err {
            AssetgateError::CacheMismatch { expected, found } => {
                assert_eq!(expected, "W1");
                assert_eq!(found, "W2");
            }
            other => panic!("expected mismatch, got {other}"),
        }
    }

    #[test]
    fn fingerprint_is_deterministic_and_distinct() {
        assert_eq!(fingerprint("W1", "S1"), fingerprint("W1", "S1"));
        assert_ne!(fingerprint("W1", "S1"), fingerprint("W2", "S1"));
        assert_ne!(fingerprint("W1", "S1"), fingerprint("W1", "S2"));
        assert_ne!(fingerprint("ab", "c"), fingerprint("a", "bc"));
        assert_eq!(fingerprint("W1", "S1").len(), 64);

        let dir = tempfile::tempdir().unwrap();
        let a = disk(dir.path());
        let b = disk(dir.path());
        assert_eq!(a.cache_path("W1", "S1"), b.cache_path("W1", "S1"));
    }

    #[test]
    fn save_leaves_no_temporary_files() {
        let dir = tempfile::tempdir().unwrap();
        let disk = disk(dir.path());
        disk.save("W1", SITE, &sample_cache()).unwrap();
        disk.save("W1", SITE, &sample_cache()).unwrap();

        assert!(tmp_files(disk.dir()).is_empty());
    }

    #[test]
    fn interrupted_save_leaves_previous_entry_intact() {
        let dir = tempfile::tempdir().unwrap();
        let disk = disk(dir.path());
        let cache = sample_cache();
        let path = disk.save("W1", SITE, &cache).unwrap();

        // A writer that died before its rename.
        let stray = path.with_file_name(format!(
            ".{}.99999.0.tmp",
            path.file_name().unwrap().to_string_lossy()
        ));
        fs::write(&stray, b"{\"workspace_id\": \"W1\", \"sch").unwrap();

        assert_eq!(disk.load("W1", SITE).unwrap().tables, cache.snapshot());
        assert_eq!(disk.list_cached_workspaces().unwrap().len(), 1);
    }

    #[test]
    fn failed_rename_cleans_up_and_reports_io() {
        let dir = tempfile::tempdir().unwrap();
        let disk = disk(dir.path());
        // A non-empty directory where the cache file should go.
        let path = disk.cache_path("W1", SITE);
        fs::create_dir_all(path.join("blocker")).unwrap();

        let err = disk.save("W1", SITE, &sample_cache()).unwrap_err();
        assert!(matches!(err, AssetgateError::Io { .. }), "{err}");
        assert!(!err.is_cache_miss());
        assert!(tmp_files(disk.dir()).is_empty());
    }

    #[test]
    fn later_save_replaces_earlier() {
        let dir = tempfile::tempdir().unwrap();
        let disk = disk(dir.path());
        let cache = sample_cache();
        disk.save("W1", SITE, &cache).unwrap();

        cache.record(EntityKind::ObjectType, EntityInfo::new("13", "Monitors"));
        disk.save("W1", SITE, &cache).unwrap();

        let entry = disk.load("W1", SITE).unwrap();
        assert!(entry.tables.types_by_name.contains_key("Monitors"));
    }

    #[test]
    fn listing_skips_corrupt_files_with_warning() {
        let dir = tempfile::tempdir().unwrap();
        let logger = MemoryLogger::new();
        let disk = DiskCache::with_logger(DiskCacheConfig::new(dir.path()), Arc::new(logger.clone()));
        disk.save("W1", SITE, &sample_cache()).unwrap();
        fs::write(disk.dir().join("deadbeef.json"), "garbage").unwrap();

        let infos = disk.list_cached_workspaces().unwrap();
        assert_eq!(infos.len(), 1);
        let info = &infos[0];
        assert_eq!(info.workspace_id, "W1");
        assert_eq!(info.schema_count, 2);
        assert_eq!(info.object_type_count, 2);
        assert!(!info.expired);
        assert!(info.size_bytes > 0);
        assert_eq!(info.file_name, format!("{}.json", fingerprint("W1", SITE)));

        let warnings = logger.at_level(Level::Warning);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("deadbeef.json"));
    }

    #[test]
    fn listing_missing_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(disk(&dir.path().join("nope")).list_cached_workspaces().unwrap().is_empty());
    }

    #[test]
    fn clear_expired_removes_only_expired_files() {
        let dir = tempfile::tempdir().unwrap();
        let fresh = disk(dir.path());
        let stale = disk_with_ttl(dir.path(), Duration::ZERO);

        fresh.save("W1", SITE, &sample_cache()).unwrap();
        fresh.save("W2", SITE, &sample_cache()).unwrap();
        stale.save("W3", SITE, &sample_cache()).unwrap();

        assert_eq!(fresh.clear_expired().unwrap(), 1);
        assert!(fresh.cache_path("W1", SITE).exists());
        assert!(fresh.cache_path("W2", SITE).exists());
        assert!(!fresh.cache_path("W3", SITE).exists());

        // Idempotent
        assert_eq!(fresh.clear_expired().unwrap(), 0);
    }

    #[test]
    fn expiry_is_rechecked_before_removal() {
        let dir = tempfile::tempdir().unwrap();
        let fresh = disk(dir.path());
        let stale = disk_with_ttl(dir.path(), Duration::ZERO);
        let path = stale.save("W1", SITE, &sample_cache()).unwrap();

        let scan = fresh.list_cached_workspaces().unwrap();
        assert!(scan.iter().all(|info| info.expired));

        // Another process refreshes the entry between the scan and the removal.
        fresh.save("W1", SITE, &sample_cache()).unwrap();
        assert!(!fresh.remove_if_expired(&path, Utc::now()).unwrap());
        assert!(path.exists());

        stale.save("W1", SITE, &sample_cache()).unwrap();
        assert!(fresh.remove_if_expired(&path, Utc::now()).unwrap());
        assert!(!path.exists());
        assert!(!fresh.remove_if_expired(&path, Utc::now()).unwrap());
    }

    #[test]
    fn evict_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let disk = disk(dir.path());
        disk.save("W1", SITE, &sample_cache()).unwrap();

        assert!(disk.evict("W1", SITE).unwrap());
        assert!(!disk.evict("W1", SITE).unwrap());
        assert!(disk.load("W1", SITE).unwrap_err().is_cache_miss());
    }

    #[test]
    fn clear_all_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let disk = disk(dir.path());
        disk.save("W1", SITE, &sample_cache()).unwrap();

        disk.clear_all().unwrap();
        assert!(!disk.dir().exists());
        disk.clear_all().unwrap();
    }

    #[test]
    fn oversized_ttl_is_a_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let cache_dir = dir.path().join("resolver");

        for config in [
            DiskCacheConfig::new(&cache_dir).ttl_hours(10_000_000_000),
            DiskCacheConfig::new(&cache_dir).ttl_hours(u64::MAX),
            DiskCacheConfig::new(&cache_dir).ttl(Duration::MAX),
        ] {
            let disk = DiskCache::with_logger(config, Arc::new(MemoryLogger::new()));
            let err = disk.save("W1", SITE, &sample_cache()).unwrap_err();
            assert!(matches!(err, AssetgateError::Configuration(_)), "{err}");
        }
        assert!(!cache_dir.exists());
    }

    #[test]
    fn config_builder() {
        let config = DiskCacheConfig::new("/tmp/x").ttl_hours(2);
        assert_eq!(config.ttl, Duration::from_secs(7200));
        assert_eq!(config.base_dir, PathBuf::from("/tmp/x"));
        assert!(DiskCacheConfig::default().base_dir.ends_with("assetgate"));
    }
}
