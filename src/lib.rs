//! assetd: static asset server with pluggable backends
//!
//! A [`handler::StaticServer`] resolves request paths against a
//! [`backend::Backend`] (host directory, zip archive, in-memory table or
//! caller-supplied functions) and serves the result with range and
//! conditional-request support.

pub mod backend;
pub mod cli;
pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;

pub use error::{ResolveError, SetupError};
pub use handler::StaticServer;
