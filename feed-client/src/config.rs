//! Configuration for the feed client.
//!
//! Loaded from a TOML file; every section and field is optional.
//!
//! ```toml
//! [api]
//! base_url = "https://pets.example.org/api"
//! asset_base_url = "https://pets.example.org"
//! timeout_secs = 10
//!
//! [storage]
//! key = "lostPetsLocalReports"
//! max_bytes = 5242880
//!
//! [photo]
//! max_dimension = 800
//! jpeg_quality = 70
//!
//! [feed]
//! page_limit = 10
//! ```

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClientConfig {
    /// Remote service settings.
    #[serde(default)]
    pub api: ApiConfig,
    /// Local durable storage settings.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Offline photo embedding settings.
    #[serde(default)]
    pub photo: PhotoConfig,
    /// Feed paging settings.
    #[serde(default)]
    pub feed: FeedConfig,
}

/// Remote service settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the reports API (default: http://localhost:3000/api).
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Base for relative photo paths (default: http://localhost:3000).
    #[serde(default = "default_asset_base_url")]
    pub asset_base_url: String,
    /// Request timeout in seconds (default: 15). A timeout counts as the
    /// network being unavailable.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Local durable storage settings.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Name of the record holding all local reports.
    #[serde(default = "default_storage_key")]
    pub key: String,
    /// Quota in bytes (default: 5 MiB).
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,
    /// Directory for [`FileStorage`](crate::FileStorage) (default: .petfeed).
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

/// Offline photo embedding settings.
#[derive(Debug, Clone, Deserialize)]
pub struct PhotoConfig {
    /// Longest edge of the embedded copy, in pixels (default: 800).
    #[serde(default = "default_max_dimension")]
    pub max_dimension: u32,
    /// JPEG quality 1-100 (default: 70).
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
    /// Embed photos into locally saved reports at all (default: true).
    #[serde(default = "default_embed_offline")]
    pub embed_offline: bool,
}

/// Feed paging settings.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// Reports per page (default: 10).
    #[serde(default = "default_page_limit")]
    pub page_limit: u32,
}

// Default value functions
fn default_base_url() -> String {
    "http://localhost:3000/api".to_string()
}

fn default_asset_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_storage_key() -> String {
    "lostPetsLocalReports".to_string()
}

fn default_max_bytes() -> usize {
    5 * 1024 * 1024 // 5MB
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".petfeed")
}

fn default_max_dimension() -> u32 {
    800
}

fn default_jpeg_quality() -> u8 {
    70
}

fn default_embed_offline() -> bool {
    true
}

fn default_page_limit() -> u32 {
    10
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            asset_base_url: default_asset_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            key: default_storage_key(),
            max_bytes: default_max_bytes(),
            data_dir: default_data_dir(),
        }
    }
}

impl Default for PhotoConfig {
    fn default() -> Self {
        Self {
            max_dimension: default_max_dimension(),
            jpeg_quality: default_jpeg_quality(),
            embed_offline: default_embed_offline(),
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            page_limit: default_page_limit(),
        }
    }
}

impl ApiConfig {
    /// Request timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl ClientConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Set the API base URL.
    pub fn with_base_url(mut self, url: &str) -> Self {
        self.api.base_url = url.to_string();
        self
    }

    /// Set the base for relative photo paths.
    pub fn with_asset_base_url(mut self, url: &str) -> Self {
        self.api.asset_base_url = url.to_string();
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.api.timeout_secs = timeout.as_secs();
        self
    }

    /// Set the feed page size.
    pub fn with_page_limit(mut self, limit: u32) -> Self {
        self.feed.page_limit = limit;
        self
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Failed to parse configuration file.
    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying TOML parse error.
        source: toml::de::Error,
    },
    /// The API base URL is not a usable URL.
    #[error("invalid API base URL {url}: {reason}")]
    InvalidUrl {
        /// The configured URL.
        url: String,
        /// Why it was rejected.
        reason: String,
    },
    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}
