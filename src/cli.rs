//! Command line interface

use crate::config::{AssetSource, Config};
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use std::fmt::Display;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Serve static assets from a directory, a zip archive or an inline table
#[derive(Debug, Parser)]
#[command(name = "assetd", version)]
pub struct Cli {
    /// Directory to serve (overrides `assets.source`)
    pub root: Option<PathBuf>,

    /// Address to listen on [default: 127.0.0.1:8080]
    #[arg(long = "http", value_name = "ADDR")]
    pub http: Option<SocketAddr>,

    /// Configuration file (defaults to ./assetd.toml when present)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log every resolver decision
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

impl Cli {
    /// Apply command line overrides on top of the loaded configuration
    pub fn apply(&self, config: &mut Config) {
        if let Some(ref root) = self.root {
            config.assets.source = Some(AssetSource::Dir { path: root.clone() });
        }
        if let Some(addr) = self.http {
            config.server.host = addr.ip().to_string();
            config.server.port = addr.port();
        }
        if self.verbose {
            config.logging.diagnostics = true;
        }
    }

    /// Usage error for a run with nothing to serve
    pub fn missing_source() -> clap::Error {
        Self::command().error(
            ErrorKind::MissingRequiredArgument,
            "nothing to serve: pass a directory or set [assets.source] in the config file",
        )
    }

    /// Wrap a setup failure so it prints with the usage line
    pub fn setup_error(err: impl Display) -> clap::Error {
        Self::command().error(ErrorKind::ValueValidation, err)
    }
}
