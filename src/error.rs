//! Error types
//!
//! `SetupError` covers everything that can go wrong while building a server.
//! `ResolveError` is the per-request outcome of path resolution.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Construction-time failure, reported to the caller before serving starts
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("asset root is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("map key must not begin with '/': {0}")]
    InvalidMapKey(String),

    #[error("no error handler slot for status {0} (supported: 404, 500)")]
    UnsupportedStatus(u16),

    #[error("invalid zip archive {name}: {source}")]
    Archive {
        name: String,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
}

impl SetupError {
    pub(crate) fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

/// Terminal outcome of a failed resolution
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Path absent, a directory without an index document, or an index
    /// document that is itself a directory
    #[error("not found: {0}")]
    NotFound(String),

    /// The asset was found but could not be read
    #[error("internal error serving {path}: {source}")]
    Internal {
        path: String,
        #[source]
        source: io::Error,
    },
}
