//! Asset backend module
//!
//! Every asset source is reduced to the same two operations:
//! - `stat`: look up metadata for a path
//! - `open`: obtain a seekable reader for a file
//!
//! Paths handed to a backend are always cleaned, absolute and
//! forward-slash separated (`/`, `/css/site.css`).

mod archive;
mod map;
mod os;
mod raw;

pub use archive::ZipBackend;
pub use map::MapBackend;
pub use os::OsBackend;
pub use raw::RawBackend;

use crate::config::AssetSource;
use crate::error::SetupError;
use async_trait::async_trait;
use std::io;
use std::sync::Arc;
use std::time::SystemTime;
use tokio::io::{AsyncRead, AsyncSeek};

/// Reader handed out by [`Backend::open`]
pub type AssetReader = Box<dyn AssetRead>;

/// Metadata for a single asset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetInfo {
    /// Base name of the asset (`"index.html"`, `"/"` for the root)
    pub name: String,
    /// Last modification time, `None` when the source does not track it
    pub modified: Option<SystemTime>,
    pub is_dir: bool,
    pub size: u64,
}

impl AssetInfo {
    pub fn file(name: impl Into<String>, size: u64, modified: Option<SystemTime>) -> Self {
        Self {
            name: name.into(),
            modified,
            is_dir: false,
            size,
        }
    }

    pub fn dir(name: impl Into<String>, modified: Option<SystemTime>) -> Self {
        Self {
            name: name.into(),
            modified,
            is_dir: true,
            size: 0,
        }
    }
}

/// Explicit release of a reader's underlying resource
pub trait Closable {
    fn close(&mut self) -> io::Result<()>;
}

/// Seekable asset reader
///
/// Readers that hold a resource which must be released explicitly expose it
/// through [`AssetRead::as_closable`]; the resolver closes such readers after
/// serving. Readers that release everything on drop keep the default.
pub trait AssetRead: AsyncRead + AsyncSeek + Send + Unpin {
    fn as_closable(&mut self) -> Option<&mut dyn Closable> {
        None
    }
}

impl AssetRead for tokio::fs::File {}
impl AssetRead for io::Cursor<Vec<u8>> {}
impl AssetRead for io::Cursor<hyper::body::Bytes> {}
impl AssetRead for io::Cursor<&'static [u8]> {}

/// Uniform interface over an asset store
///
/// Implementations must be safe for concurrent use: one backend instance
/// serves every request of a server.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Look up metadata for `path`. Any error is treated as "not found".
    async fn stat(&self, path: &str) -> io::Result<AssetInfo>;

    /// Open `path` for reading.
    async fn open(&self, path: &str) -> io::Result<AssetReader>;
}

#[async_trait]
impl<B: Backend + ?Sized> Backend for Arc<B> {
    async fn stat(&self, path: &str) -> io::Result<AssetInfo> {
        (**self).stat(path).await
    }

    async fn open(&self, path: &str) -> io::Result<AssetReader> {
        (**self).open(path).await
    }
}

/// Build a backend from a configured asset source
pub fn from_source(source: &AssetSource) -> Result<Arc<dyn Backend>, SetupError> {
    let backend: Arc<dyn Backend> = match source {
        AssetSource::Dir { path } => Arc::new(OsBackend::new(path)?),
        AssetSource::Zip { path } => Arc::new(ZipBackend::open(path)?),
        AssetSource::Map { files } => Arc::new(MapBackend::new(files.clone())?),
    };
    Ok(backend)
}

/// Base name of a cleaned path (`/a/b.txt` -> `b.txt`, `/` -> `/`)
pub(crate) fn base_name(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return "/";
    }
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}

pub(crate) fn not_found(path: &str) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("no such asset: {path}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_base_name() {
        assert_eq!(base_name("/"), "/");
        assert_eq!(base_name("/index.html"), "index.html");
        assert_eq!(base_name("/sub/dir/app.js"), "app.js");
        assert_eq!(base_name("/sub/dir/"), "dir");
    }

    #[tokio::test]
    async fn test_from_source_map() {
        let files = HashMap::from([("a.txt".to_string(), "alpha".to_string())]);
        let backend = from_source(&AssetSource::Map { files }).unwrap();
        let info = backend.stat("/a.txt").await.unwrap();
        assert_eq!(info.size, 5);
        assert!(!info.is_dir);
    }

    #[test]
    fn test_from_source_missing_dir() {
        let source = AssetSource::Dir {
            path: "/definitely/not/here/assetd".into(),
        };
        assert!(from_source(&source).is_err());
    }
}
