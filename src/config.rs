//! Configuration loading.
//!
//! Configuration is loaded from TOML files with the following resolution order:
//! 1. explicit path (e.g. `--config <path>`)
//! 2. `~/.assetgate/config.toml` (user)
//! 3. `/etc/assetgate/config.toml` (system)
//!
//! Secrets are loaded separately with mandatory permission checks:
//! 1. `~/.assetgate/secrets.toml` (user, must be 0600 or 0400)
//! 2. `/etc/assetgate/secrets.toml` (system, must be 0600 or 0400)
//!
//! ```toml
//! [workspace]
//! id = "3f2c9a1e-..."
//! site_url = "https://acme.atlassian.net"
//!
//! [cache]
//! ttl_hours = 12
//!
//! [api]
//! timeout_secs = 10
//! ```

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cache::DiskCacheConfig;
use crate::cache::disk::default_base_dir;
use crate::source::{Credentials, HttpInventoryClient, workspace_base_url};
use crate::{AssetgateError, Result};

/// Environment variable consulted when no secrets file holds an API token.
pub const API_TOKEN_ENV: &str = "ASSETGATE_API_TOKEN";

/// Environment variable consulted when no secrets file holds an email.
pub const EMAIL_ENV: &str = "ASSETGATE_EMAIL";

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub workspace: WorkspaceConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

/// Which inventory workspace to talk to.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkspaceConfig {
    pub id: String,
    /// Atlassian site, e.g. `https://acme.atlassian.net`.
    pub site_url: String,
}

/// Disk cache settings.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Persist resolver tables between runs (default: true).
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Base directory (default: `<user cache dir>/assetgate`).
    #[serde(default)]
    pub dir: Option<PathBuf>,
    /// Entry lifetime in hours (default: 24).
    #[serde(default = "default_ttl_hours")]
    pub ttl_hours: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            dir: None,
            ttl_hours: default_ttl_hours(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_ttl_hours() -> u64 {
    24
}

/// Inventory API settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Override for the API base URL (default: derived from the site URL).
    #[serde(default)]
    pub base_url: Option<String>,
    /// Request timeout in seconds (default: 30).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: default_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

impl Config {
    /// Load configuration from the standard locations.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let path = Self::resolve_config_path(explicit_path)?;
        Self::load_from_file(&path)
    }

    /// Load configuration from one file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            AssetgateError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            AssetgateError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })
    }

    fn resolve_config_path(explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(path.to_path_buf());
            }
            return Err(AssetgateError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".assetgate").join("config.toml");
            if user_config.exists() {
                return Ok(user_config);
            }
        }

        let system_config = PathBuf::from("/etc/assetgate/config.toml");
        if system_config.exists() {
            return Ok(system_config);
        }

        Err(AssetgateError::Configuration(
            "No config file found. Create ~/.assetgate/config.toml or /etc/assetgate/config.toml"
                .to_string(),
        ))
    }

    /// Disk cache settings, or `None` when the cache is disabled.
    pub fn disk_cache(&self) -> Option<DiskCacheConfig> {
        if !self.cache.enabled {
            return None;
        }
        let base_dir = self.cache.dir.clone().unwrap_or_else(default_base_dir);
        Some(DiskCacheConfig::new(base_dir).ttl_hours(self.cache.ttl_hours))
    }

    /// Effective API base URL.
    pub fn api_base_url(&self) -> String {
        self.api
            .base_url
            .clone()
            .unwrap_or_else(|| workspace_base_url(&self.workspace.site_url, &self.workspace.id))
    }

    /// HTTP inventory client for the configured workspace.
    pub fn http_client(&self, secrets: &Secrets) -> Result<HttpInventoryClient> {
        let credentials = secrets.credentials().ok_or_else(|| {
            AssetgateError::Configuration(format!(
                "No API token configured. Set api_token in secrets.toml or {API_TOKEN_ENV}"
            ))
        })?;
        HttpInventoryClient::with_base_url(
            self.api_base_url(),
            credentials,
            Duration::from_secs(self.api.timeout_secs),
        )
    }
}

/// Credentials for the inventory API.
#[derive(Clone, Default, Deserialize)]
pub struct Secrets {
    #[serde(default)]
    pub api_token: Option<String>,
    /// Account email; with a token this selects basic auth.
    #[serde(default)]
    pub email: Option<String>,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("api_token", &self.api_token.as_ref().map(|_| "<redacted>"))
            .field("email", &self.email)
            .finish()
    }
}

impl Secrets {
    /// Load secrets from the standard locations with permission checks.
    ///
    /// Returns empty secrets if no file exists (environment variables still apply).
    pub fn load() -> Result<Self> {
        if let Some(home) = dirs::home_dir() {
            let user_secrets = home.join(".assetgate").join("secrets.toml");
            if user_secrets.exists() {
                return Self::load_from_file(&user_secrets);
            }
        }

        let system_secrets = PathBuf::from("/etc/assetgate/secrets.toml");
        if system_secrets.exists() {
            return Self::load_from_file(&system_secrets);
        }

        Ok(Secrets::default())
    }

    /// Load secrets from one file after checking its permissions.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        Self::check_permissions(path)?;
        let content = fs::read_to_string(path).map_err(|e| {
            AssetgateError::Configuration(format!("Failed to read secrets file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            AssetgateError::Configuration(format!("Failed to parse secrets file {path:?}: {e}"))
        })
    }

    /// Check that the secrets file has secure permissions (0600 or 0400).
    #[cfg(unix)]
    fn check_permissions(path: &Path) -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let metadata = fs::metadata(path).map_err(|e| {
            AssetgateError::Configuration(format!("Failed to stat secrets file {path:?}: {e}"))
        })?;

        let mode = metadata.permissions().mode();
        if mode & 0o077 != 0 {
            return Err(AssetgateError::Configuration(format!(
                "Secrets file {path:?} has insecure permissions {:o}. Must be 0600 or 0400.",
                mode & 0o777
            )));
        }

        Ok(())
    }

    #[cfg(not(unix))]
    fn check_permissions(_path: &Path) -> Result<()> {
        Ok(())
    }

    /// API token, falling back to `ASSETGATE_API_TOKEN`.
    pub fn api_token(&self) -> Option<String> {
        self.api_token
            .clone()
            .or_else(|| std::env::var(API_TOKEN_ENV).ok())
            .filter(|t| !t.trim().is_empty())
    }

    /// Account email, falling back to `ASSETGATE_EMAIL`.
    pub fn email(&self) -> Option<String> {
        self.email
            .clone()
            .or_else(|| std::env::var(EMAIL_ENV).ok())
            .filter(|e| !e.trim().is_empty())
    }

    /// Basic auth when an email is known, bearer otherwise.
    pub fn credentials(&self) -> Option<Credentials> {
        let token = self.api_token()?;
        Some(match self.email() {
            Some(email) => Credentials::Basic { email, token },
            None => Credentials::Bearer(token),
        })
    }
}
