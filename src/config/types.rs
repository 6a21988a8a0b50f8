// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub performance: PerformanceConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub assets: AssetsConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            workers: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Trace every resolver decision
    #[serde(default)]
    pub diagnostics: bool,
    #[serde(default = "default_access_log")]
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log() -> bool {
    true
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            diagnostics: false,
            access_log: default_access_log(),
            access_log_format: default_access_log_format(),
            access_log_file: None,
            error_log_file: None,
        }
    }
}

/// Performance configuration
///
/// Timeouts are in seconds.
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive: bool,
    pub request_timeout: u64,
    pub max_connections: Option<usize>,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            keep_alive: true,
            request_timeout: 30,
            max_connections: None,
        }
    }
}

/// HTTP configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub server_name: String,
    pub enable_cors: bool,
    pub max_body_size: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            server_name: concat!("assetd/", env!("CARGO_PKG_VERSION")).to_string(),
            enable_cors: false,
            max_body_size: 10_485_760,
        }
    }
}

/// What to serve and how directories are completed
#[derive(Debug, Deserialize, Clone)]
pub struct AssetsConfig {
    #[serde(default)]
    pub source: Option<AssetSource>,
    #[serde(default = "default_index_file")]
    pub index_file: String,
}

#[allow(clippy::missing_const_for_fn)]
fn default_index_file() -> String {
    crate::handler::DEFAULT_INDEX_FILE.to_string()
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            source: None,
            index_file: default_index_file(),
        }
    }
}

/// Asset source types
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AssetSource {
    /// Directory on the host filesystem
    Dir { path: PathBuf },
    /// Zip archive opened read-only
    Zip { path: PathBuf },
    /// Inline name to content table
    Map { files: HashMap<String, String> },
}

impl fmt::Display for AssetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dir { path } => write!(f, "directory {}", path.display()),
            Self::Zip { path } => write!(f, "zip archive {}", path.display()),
            Self::Map { files } => write!(f, "in-memory map ({} files)", files.len()),
        }
    }
}
