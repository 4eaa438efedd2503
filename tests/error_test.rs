use std::path::PathBuf;

use assetgate::{AssetgateError, Result};

#[test]
fn test_error_display() {
    let err = AssetgateError::ObjectTypeNotFound("999".to_string());
    assert!(err.to_string().contains("999"));

    let err = AssetgateError::Metadata {
        object_type: "Laptops".into(),
        message: "authentication failed".into(),
    };
    let rendered = err.to_string();
    assert!(rendered.contains("Laptops"));
    assert!(rendered.contains("authentication failed"));
}

#[test]
fn test_result_alias() {
    fn returns_error() -> Result<()> {
        Err(AssetgateError::AuthenticationFailed)
    }
    assert!(returns_error().is_err());
}

#[test]
fn test_io_error_keeps_source() {
    let err = AssetgateError::io(
        "read",
        "/var/cache/assetgate/resolver/abc.json",
        std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
    );
    let rendered = err.to_string();
    assert!(rendered.starts_with("failed to read /var/cache/assetgate/resolver/abc.json"));
    assert!(std::error::Error::source(&err).is_some());
    assert!(!err.is_cache_miss());
}

// ============================================================================
// Cache-miss classification
// ============================================================================

#[test]
fn cache_miss_errors() {
    let path = PathBuf::from("resolver/abc.json");
    assert!(AssetgateError::CacheNotFound { path: path.clone() }.is_cache_miss());
    assert!(
        AssetgateError::CacheExpired {
            workspace_id: "ws-1".into(),
            expired_at: chrono::Utc::now(),
        }
        .is_cache_miss()
    );
    assert!(
        AssetgateError::CacheCorrupt {
            path,
            reason: "EOF while parsing".into(),
        }
        .is_cache_miss()
    );
    assert!(
        AssetgateError::CacheMismatch {
            expected: "ws-1".into(),
            found: "ws-2".into(),
        }
        .is_cache_miss()
    );
}

#[test]
fn inventory_errors_are_not_cache_misses() {
    assert!(!AssetgateError::AuthenticationFailed.is_cache_miss());
    assert!(!AssetgateError::Http("connection reset".into()).is_cache_miss());
    assert!(!AssetgateError::Configuration("no workspace".into()).is_cache_miss());
}

// ============================================================================
// Transient error classification
// ============================================================================

#[test]
fn transient_errors() {
    assert!(AssetgateError::Http("connection reset".into()).is_transient());
    assert!(
        AssetgateError::Api {
            status: 429,
            message: "rate limited".into()
        }
        .is_transient()
    );
    assert!(
        AssetgateError::Api {
            status: 502,
            message: "bad gateway".into()
        }
        .is_transient()
    );
}

#[test]
fn permanent_errors() {
    assert!(!AssetgateError::AuthenticationFailed.is_transient());
    assert!(
        !AssetgateError::Api {
            status: 400,
            message: "bad request".into()
        }
        .is_transient()
    );
    assert!(!AssetgateError::SchemaNotFound("Vehicles".into()).is_transient());
    assert!(!AssetgateError::Task("cancelled".into()).is_transient());
}
