// Configuration module entry point
// Layers built-in defaults, an optional TOML file and ASSETD_* environment variables

mod state;
mod types;

use std::net::SocketAddr;
use std::path::Path;

// Re-export public types
pub use state::AppState;
pub use types::{
    AssetSource, AssetsConfig, Config, HttpConfig, LoggingConfig, PerformanceConfig, ServerConfig,
};

/// Config file looked up in the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "assetd.toml";

impl Config {
    /// Load configuration
    ///
    /// An explicit `config_path` must exist; the default `assetd.toml` is
    /// optional. Environment variables override file values, e.g.
    /// `ASSETD__SERVER__PORT=9000`.
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let file = match config_path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let settings = config::Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.request_timeout", 30)?
            .set_default("http.server_name", HttpConfig::default().server_name)?
            .set_default("http.enable_cors", false)?
            .set_default("http.max_body_size", 10_485_760)? // 10MB
            .add_source(file)
            .add_source(config::Environment::with_prefix("ASSETD").separator("__"))
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.get_socket_addr().unwrap().port(), 8080);
        assert!(config.logging.access_log);
        assert_eq!(config.logging.access_log_format, "combined");
        assert_eq!(config.assets.index_file, "index.html");
        assert!(config.assets.source.is_none());
        assert!(config.http.server_name.starts_with("assetd/"));
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("site.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
[server]
port = 9100

[logging]
diagnostics = true
access_log_format = "json"

[assets]
index_file = "default.htm"

[assets.source]
type = "map"

[assets.source.files]
"index.html" = "hello"
"#
        )
        .unwrap();

        let config = Config::load_from(Some(&path)).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9100);
        assert!(config.logging.diagnostics);
        assert_eq!(config.logging.access_log_format, "json");
        assert_eq!(config.assets.index_file, "default.htm");
        match config.assets.source {
            Some(AssetSource::Map { files }) => assert_eq!(files["index.html"], "hello"),
            other => panic!("unexpected source: {other:?}"),
        }
    }

    #[test]
    fn test_missing_explicit_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.toml");
        assert!(Config::load_from(Some(&path)).is_err());
    }

    #[test]
    fn test_invalid_address() {
        let mut config = Config::default();
        config.server.host = "not an ip".to_string();
        assert!(config.get_socket_addr().is_err());
    }
}
