//! # Sync Configuration
//!
//! Configuration management for a Ferry run.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     BIGCOMMERCE_STORE_HASH=abc123                                      │
//! │     BIGCOMMERCE_ACCESS_TOKEN=...                                       │
//! │     (a local .env is loaded into the environment by the binary)        │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     $FERRY_CONFIG, or                                                  │
//! │     ~/.config/ferry/ferry.toml (Linux)                                 │
//! │     ~/Library/Application Support/com.ferry.ferry/ferry.toml (macOS)   │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     ./orders.csv, ./products.csv, ./inventory.csv, 1000/500/500 ms     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # ferry.toml
//! [store]
//! hash = "abc123"
//! access_token = "..."
//!
//! [sources]
//! orders_csv = "./orders.csv"
//! orders_api_url = "https://example.com/api/orders"
//! products_csv = "./products.csv"
//! inventory_csv = "./inventory.csv"
//!
//! [pacing]
//! orders_ms = 1000
//! products_ms = 500
//! inventory_ms = 500
//!
//! [http]
//! request_timeout_secs = 30
//!
//! [mapping]
//! numeric_policy = "lenient"  # lenient | strict
//! ```
//!
//! Credentials are deliberately NOT checked here. A missing hash or token
//! surfaces as `MissingCredentials` on the first remote call.

use ferry_core::NumericPolicy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{SyncError, SyncResult};

/// Default remote API root.
pub const DEFAULT_API_BASE_URL: &str = "https://api.bigcommerce.com";

// =============================================================================
// Store Settings
// =============================================================================

/// Remote store identity and credentials.
#[derive(Clone, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Store hash used in every API path.
    #[serde(default)]
    pub hash: Option<String>,

    /// Value of the `X-Auth-Token` header.
    #[serde(default)]
    pub access_token: Option<String>,

    /// API root, overridable for sandboxes and tests.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            hash: None,
            access_token: None,
            api_base_url: default_api_base_url(),
        }
    }
}

/// Token never reaches the logs.
impl fmt::Debug for StoreSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreSettings")
            .field("hash", &self.hash)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}

// =============================================================================
// Source Settings
// =============================================================================

/// Where each sub-sync reads its records from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSettings {
    #[serde(default = "default_orders_csv")]
    pub orders_csv: PathBuf,

    #[serde(default = "default_orders_api_url")]
    pub orders_api_url: String,

    #[serde(default = "default_products_csv")]
    pub products_csv: PathBuf,

    #[serde(default = "default_inventory_csv")]
    pub inventory_csv: PathBuf,
}

fn default_orders_csv() -> PathBuf {
    PathBuf::from("./orders.csv")
}

fn default_orders_api_url() -> String {
    "https://example.com/api/orders".to_string()
}

fn default_products_csv() -> PathBuf {
    PathBuf::from("./products.csv")
}

fn default_inventory_csv() -> PathBuf {
    PathBuf::from("./inventory.csv")
}

impl Default for SourceSettings {
    fn default() -> Self {
        SourceSettings {
            orders_csv: default_orders_csv(),
            orders_api_url: default_orders_api_url(),
            products_csv: default_products_csv(),
            inventory_csv: default_inventory_csv(),
        }
    }
}

// =============================================================================
// Pacing Settings
// =============================================================================

/// Fixed delay after every remote call, per endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacingSettings {
    #[serde(default = "default_orders_ms")]
    pub orders_ms: u64,

    #[serde(default = "default_catalog_ms")]
    pub products_ms: u64,

    #[serde(default = "default_catalog_ms")]
    pub inventory_ms: u64,
}

fn default_orders_ms() -> u64 {
    1000
}

fn default_catalog_ms() -> u64 {
    500
}

impl Default for PacingSettings {
    fn default() -> Self {
        PacingSettings {
            orders_ms: default_orders_ms(),
            products_ms: default_catalog_ms(),
            inventory_ms: default_catalog_ms(),
        }
    }
}

impl PacingSettings {
    pub fn orders(&self) -> Duration {
        Duration::from_millis(self.orders_ms)
    }

    pub fn products(&self) -> Duration {
        Duration::from_millis(self.products_ms)
    }

    pub fn inventory(&self) -> Duration {
        Duration::from_millis(self.inventory_ms)
    }
}

// =============================================================================
// HTTP & Mapping Settings
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpSettings {
    /// Per-request timeout; the only deadline a hung call is subject to.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for HttpSettings {
    fn default() -> Self {
        HttpSettings {
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl HttpSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MappingSettings {
    #[serde(default)]
    pub numeric_policy: NumericPolicy,
}

// =============================================================================
// Main Sync Configuration
// =============================================================================

/// Complete configuration for one run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default)]
    pub store: StoreSettings,

    #[serde(default)]
    pub sources: SourceSettings,

    #[serde(default)]
    pub pacing: PacingSettings,

    #[serde(default)]
    pub http: HttpSettings,

    #[serde(default)]
    pub mapping: MappingSettings,
}

impl SyncConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`config_path`, `$FERRY_CONFIG`, or the platform path)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> SyncResult<Self> {
        Self::load_with(config_path, |key| std::env::var(key).ok())
    }

    /// Same as [`SyncConfig::load`] with an injectable variable lookup.
    pub fn load_with<F>(config_path: Option<PathBuf>, lookup: F) -> SyncResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        let path = config_path
            .or_else(|| lookup("FERRY_CONFIG").map(PathBuf::from))
            .or_else(Self::default_config_path);

        if let Some(path) = path {
            if path.exists() {
                info!(?path, "Loading ferry config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(lookup);
        config.validate()?;

        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// Only URLs are checked. Paths are checked when read, credentials when
    /// first used.
    pub fn validate(&self) -> SyncResult<()> {
        for (name, raw) in [
            ("store.api_base_url", &self.store.api_base_url),
            ("sources.orders_api_url", &self.sources.orders_api_url),
        ] {
            let parsed = url::Url::parse(raw)
                .map_err(|e| SyncError::InvalidUrl(format!("{name} = '{raw}': {e}")))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(SyncError::InvalidUrl(format!(
                    "{name} must use http or https, got: {raw}"
                )));
            }
        }

        Ok(())
    }

    /// Applies variable overrides from `lookup`.
    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(hash) = lookup("BIGCOMMERCE_STORE_HASH") {
            debug!(store_hash = %hash, "Overriding store hash from environment");
            self.store.hash = Some(hash);
        }

        if let Some(token) = lookup("BIGCOMMERCE_ACCESS_TOKEN") {
            self.store.access_token = Some(token);
        }

        if let Some(url) = lookup("FERRY_API_BASE_URL") {
            debug!(url = %url, "Overriding API base URL from environment");
            self.store.api_base_url = url;
        }

        if let Some(path) = lookup("FERRY_ORDERS_CSV") {
            self.sources.orders_csv = PathBuf::from(path);
        }

        if let Some(url) = lookup("FERRY_ORDERS_API_URL") {
            self.sources.orders_api_url = url;
        }

        if let Some(path) = lookup("FERRY_PRODUCTS_CSV") {
            self.sources.products_csv = PathBuf::from(path);
        }

        if let Some(path) = lookup("FERRY_INVENTORY_CSV") {
            self.sources.inventory_csv = PathBuf::from(path);
        }

        if let Some(policy) = lookup("FERRY_NUMERIC_POLICY") {
            match policy.to_lowercase().as_str() {
                "lenient" => self.mapping.numeric_policy = NumericPolicy::Lenient,
                "strict" => self.mapping.numeric_policy = NumericPolicy::Strict,
                _ => warn!(policy = %policy, "Unknown numeric policy in environment"),
            }
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "ferry", "ferry")
            .map(|dirs| dirs.config_dir().join("ferry.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_default_config() {
        let config = SyncConfig::default();
        assert_eq!(config.store.api_base_url, "https://api.bigcommerce.com");
        assert_eq!(config.store.hash, None);
        assert_eq!(config.sources.orders_csv, PathBuf::from("./orders.csv"));
        assert_eq!(config.pacing.orders(), Duration::from_millis(1000));
        assert_eq!(config.pacing.products(), Duration::from_millis(500));
        assert_eq!(config.pacing.inventory(), Duration::from_millis(500));
        assert_eq!(config.http.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.mapping.numeric_policy, NumericPolicy::Lenient);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: SyncConfig = toml::from_str(
            r#"
            [store]
            hash = "abc123"

            [pacing]
            orders_ms = 250

            [mapping]
            numeric_policy = "strict"
            "#,
        )
        .unwrap();

        assert_eq!(config.store.hash.as_deref(), Some("abc123"));
        assert_eq!(config.store.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.pacing.orders_ms, 250);
        assert_eq!(config.pacing.products_ms, 500);
        assert_eq!(config.mapping.numeric_policy, NumericPolicy::Strict);
    }

    #[test]
    fn test_load_file_then_env_overrides() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[store]\nhash = \"from-file\"\n\n[sources]\nproducts_csv = \"/data/products.csv\""
        )
        .unwrap();

        let env: HashMap<&str, &str> = [
            ("BIGCOMMERCE_STORE_HASH", "from-env"),
            ("BIGCOMMERCE_ACCESS_TOKEN", "secret"),
            ("FERRY_NUMERIC_POLICY", "STRICT"),
        ]
        .into_iter()
        .collect();

        let config = SyncConfig::load_with(Some(file.path().to_path_buf()), |key| {
            env.get(key).map(|v| v.to_string())
        })
        .unwrap();

        assert_eq!(config.store.hash.as_deref(), Some("from-env"));
        assert_eq!(config.store.access_token.as_deref(), Some("secret"));
        assert_eq!(config.sources.products_csv, PathBuf::from("/data/products.csv"));
        assert_eq!(config.mapping.numeric_policy, NumericPolicy::Strict);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = SyncConfig::load_with(Some(dir.path().join("absent.toml")), no_env).unwrap();
        assert_eq!(config.pacing.orders_ms, 1000);
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[pacing]\norders_ms = \"soon\"").unwrap();

        let err = SyncConfig::load_with(Some(file.path().to_path_buf()), no_env).unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_validation_checks_urls_only() {
        let mut config = SyncConfig::default();
        config.store.hash = None;
        assert!(config.validate().is_ok());

        config.sources.orders_api_url = "not a url".to_string();
        assert!(matches!(config.validate(), Err(SyncError::InvalidUrl(_))));

        config.sources.orders_api_url = "ftp://example.com/orders".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_debug_redacts_token() {
        let store = StoreSettings {
            access_token: Some("super-secret".to_string()),
            ..StoreSettings::default()
        };
        let rendered = format!("{store:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
