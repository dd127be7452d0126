//! Dashboard configuration.
//!
//! Values are layered: built-in defaults, then an optional `config.json` in
//! the platform config directory, then environment variables.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::error::ConfigError;

/// Backend address used when nothing is configured.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";

/// Shop requested when the storefront has not reported its own id.
pub const DEFAULT_SHOP_ID: &str = "demo_shop";

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_INBOX_PAGE_SIZE: u32 = 50;

const ENV_API_URL: &str = "SHOPDESK_API_URL";
const ENV_SHOP_ID: &str = "SHOPDESK_SHOP_ID";
const ENV_REQUEST_TIMEOUT: &str = "SHOPDESK_REQUEST_TIMEOUT_SECS";

/// Resolved configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    /// Where the backend API is reached.
    pub api_base_url: Url,
    /// Fallback shop id for metrics requests.
    pub shop_id: String,
    /// Per-request transport timeout.
    pub request_timeout: Duration,
    /// Number of inbox messages requested per load.
    pub inbox_page_size: u32,
}

/// On-disk representation; every field optional.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    api_base_url: Option<String>,
    shop_id: Option<String>,
    request_timeout_secs: Option<u64>,
    inbox_page_size: Option<u32>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_base_url: Url::parse(DEFAULT_API_BASE_URL).expect("default URL is valid"),
            shop_id: DEFAULT_SHOP_ID.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            inbox_page_size: DEFAULT_INBOX_PAGE_SIZE,
        }
    }
}

impl DashboardConfig {
    /// Loads defaults, the config file if present, and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(path) = Self::default_path() {
            if path.exists() {
                config.apply_file(&path)?;
            }
        }

        config.apply_env(|key| std::env::var(key).ok())?;
        debug!(api = %config.api_base_url, shop_id = %config.shop_id, "Configuration loaded");
        Ok(config)
    }

    /// Location of `config.json` in the platform config directory.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "shopdesk", "shopdesk")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Loads defaults overlaid with a specific file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_file(path)?;
        Ok(config)
    }

    fn apply_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let display = path.display().to_string();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: display.clone(),
            source,
        })?;
        let file: FileConfig = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: display,
            source,
        })?;

        if let Some(url) = file.api_base_url {
            self.api_base_url = parse_base_url("api_base_url", &url)?;
        }
        if let Some(shop_id) = file.shop_id {
            self.shop_id = shop_id;
        }
        if let Some(secs) = file.request_timeout_secs {
            self.request_timeout = Duration::from_secs(secs);
        }
        if let Some(size) = file.inbox_page_size {
            if size == 0 {
                return Err(ConfigError::InvalidValue {
                    key: "inbox_page_size",
                    reason: "must be at least 1".to_string(),
                });
            }
            self.inbox_page_size = size;
        }
        Ok(())
    }

    /// Applies environment overrides. Empty values count as unset.
    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get(ENV_API_URL) {
            self.api_base_url = parse_base_url(ENV_API_URL, &url)?;
        }
        if let Some(shop_id) = get(ENV_SHOP_ID) {
            self.shop_id = shop_id;
        }
        if let Some(secs) = get(ENV_REQUEST_TIMEOUT) {
            let secs: u64 = secs.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: ENV_REQUEST_TIMEOUT,
                reason: format!("`{}` is not a number of seconds", secs),
            })?;
            self.request_timeout = Duration::from_secs(secs);
        }
        Ok(())
    }
}

fn parse_base_url(key: &'static str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidValue {
        key,
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::InvalidValue {
            key,
            reason: format!("unsupported scheme `{}`", other),
        }),
    }
}
