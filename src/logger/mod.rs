//! Logger module
//!
//! Free functions over a process-wide [`writer::LogWriter`]:
//! - startup banner and shutdown notice
//! - resolver diagnostics (`--verbose`)
//! - one access line per request
//! - warnings and errors, optionally to a separate file
//!
//! Before [`init`] runs, lines go to stdout and stderr.

mod format;
pub mod writer;

pub use format::{AccessLogEntry, AccessLogFormat};

use crate::config::Config;
use chrono::Local;
use std::fmt::Debug;
use std::net::SocketAddr;

/// Open the configured log files. Call once, before serving.
pub fn init(config: &Config) -> std::io::Result<()> {
    let logging = &config.logging;
    writer::init(
        logging.access_log_file.as_deref(),
        logging.error_log_file.as_deref(),
    )
}

fn info_line(line: &str) {
    if let Some(w) = writer::get() {
        w.write_info(line);
    } else {
        println!("{line}");
    }
}

fn error_line(line: &str) {
    if let Some(w) = writer::get() {
        w.write_error(line);
    } else {
        eprintln!("{line}");
    }
}

fn stamped(level: &str, message: &str) -> String {
    format!("{} [{level}] {message}", Local::now().format("%Y-%m-%d %H:%M:%S%.3f"))
}

/// Startup banner: bind address, asset source and log destinations
pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    let version = env!("CARGO_PKG_VERSION");
    let mut lines = vec![format!("assetd {version} listening on http://{addr}")];
    if let Some(ref source) = config.assets.source {
        lines.push(format!("  serving   {source}"));
    }
    lines.push(format!("  index     {}", config.assets.index_file));
    if let Some(n) = config.server.workers {
        lines.push(format!("  workers   {n}"));
    }
    if let Some(ref file) = config.logging.access_log_file {
        lines.push(format!("  access to {file}"));
    }
    if let Some(ref file) = config.logging.error_log_file {
        lines.push(format!("  errors to {file}"));
    }
    for line in lines {
        info_line(&line);
    }
}

pub fn log_info(message: &str) {
    info_line(&stamped("INFO", message));
}

/// One resolver decision; callers gate on `logging.diagnostics`
pub fn log_diagnostic(message: &str) {
    info_line(&stamped("DEBUG", &format!("resolver: {message}")));
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    info_line(&stamped("DEBUG", &format!("connection from {peer_addr}")));
}

pub fn log_connection_error(err: &impl Debug) {
    error_line(&stamped("ERROR", &format!("connection failed: {err:?}")));
}

pub fn log_warning(message: &str) {
    error_line(&stamped("WARN", message));
}

pub fn log_error(message: &str) {
    error_line(&stamped("ERROR", message));
}

/// Write `entry` in the configured access log format
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    info_line(&entry.format(format));
}

pub fn log_shutdown(active_connections: usize) {
    log_info(&format!(
        "listener closed, {active_connections} connection(s) still draining"
    ));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stamped_line() {
        let line = stamped("WARN", "disk almost full");
        assert!(line.ends_with(" [WARN] disk almost full"));
        // 2026-01-31 12:00:00.000
        assert_eq!(line.find(" [WARN]"), Some(23));
    }
}
