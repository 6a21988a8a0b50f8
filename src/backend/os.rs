//! OS directory backend

use super::{base_name, AssetInfo, AssetReader, Backend};
use crate::error::SetupError;
use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Serves files beneath a directory on the local filesystem
///
/// Symlinks are followed. Request paths are joined below `root` after the
/// leading `/` is stripped; they are expected to be cleaned already.
#[derive(Debug, Clone)]
pub struct OsBackend {
    root: PathBuf,
}

impl OsBackend {
    pub fn new(root: impl AsRef<Path>) -> Result<Self, SetupError> {
        let root = root.as_ref();
        let meta = std::fs::metadata(root).map_err(|e| {
            SetupError::io(format!("cannot access asset root {}", root.display()), e)
        })?;
        if !meta.is_dir() {
            return Err(SetupError::NotADirectory(root.to_path_buf()));
        }
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    fn full_path(&self, path: &str) -> PathBuf {
        let relative = path.trim_start_matches('/');
        if relative.is_empty() {
            self.root.clone()
        } else {
            self.root.join(relative)
        }
    }
}

#[async_trait]
impl Backend for OsBackend {
    async fn stat(&self, path: &str) -> io::Result<AssetInfo> {
        let meta = fs::metadata(self.full_path(path)).await?;
        let modified = meta.modified().ok();
        let name = base_name(path);
        Ok(if meta.is_dir() {
            AssetInfo::dir(name, modified)
        } else {
            AssetInfo::file(name, meta.len(), modified)
        })
    }

    async fn open(&self, path: &str) -> io::Result<AssetReader> {
        let file = fs::File::open(self.full_path(path)).await?;
        Ok(Box::new(file))
    }
}
