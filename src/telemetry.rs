//! Telemetry metric name constants.
//!
//! Consumers install their own `metrics` recorder (prometheus, statsd, ...);
//! without a recorder installed, all metric calls are no-ops.
//!
//! All metrics are prefixed with `assetgate_` and counters end in `_total`.

/// Disk cache loads that returned a usable entry.
pub const DISK_CACHE_HITS_TOTAL: &str = "assetgate_disk_cache_hits_total";

/// Disk cache loads that fell back to a live fetch.
///
/// Labels: `reason` ("not_found" | "expired" | "corrupt" | "mismatch" | "error").
pub const DISK_CACHE_MISSES_TOTAL: &str = "assetgate_disk_cache_misses_total";

/// In-memory resolver lookups.
///
/// Labels: `kind` ("schema" | "object_type"), `outcome` ("hit" | "miss").
pub const RESOLVER_LOOKUPS_TOTAL: &str = "assetgate_resolver_lookups_total";

/// Validation passes.
///
/// Labels: `operation` ("validate" | "create" | "update"), `outcome` ("valid" | "invalid").
pub const VALIDATIONS_TOTAL: &str = "assetgate_validations_total";

/// Completion runs.
///
/// Labels: `outcome` ("complete" | "incomplete").
pub const COMPLETIONS_TOTAL: &str = "assetgate_completions_total";
