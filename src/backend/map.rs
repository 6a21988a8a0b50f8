//! In-memory map backend

use super::{base_name, not_found, AssetInfo, AssetReader, Backend};
use crate::error::SetupError;
use crate::handler::path as request_path;
use async_trait::async_trait;
use hyper::body::Bytes;
use std::collections::{HashMap, HashSet};
use std::io;

/// Serves assets from a `path -> content` map
///
/// Keys are forward-slash separated and relative (`"sub/index.html"`).
/// Directories are implied by key prefixes; the root is always a directory.
/// A key must already be in clean form: no empty, `.` or `..` segments and
/// no leading or trailing slash.
#[derive(Debug, Clone, Default)]
pub struct MapBackend {
    files: HashMap<String, Bytes>,
    dirs: HashSet<String>,
}

impl MapBackend {
    pub fn new<K, V>(map: impl IntoIterator<Item = (K, V)>) -> Result<Self, SetupError>
    where
        K: Into<String>,
        V: Into<Bytes>,
    {
        let mut files = HashMap::new();
        let mut dirs = HashSet::from(["/".to_string()]);

        for (key, content) in map {
            let key = key.into();
            let path = format!("/{key}");
            if key.is_empty() || request_path::clean(&path) != path {
                return Err(SetupError::InvalidMapKey(key));
            }
            let mut parent = path.as_str();
            while let Some(idx) = parent.rfind('/') {
                parent = &parent[..idx];
                if parent.is_empty() {
                    break;
                }
                dirs.insert(parent.to_string());
            }
            files.insert(path, content.into());
        }

        Ok(Self { files, dirs })
    }

    fn lookup(&self, path: &str) -> io::Result<AssetInfo> {
        if let Some(content) = self.files.get(path) {
            return Ok(AssetInfo::file(base_name(path), content.len() as u64, None));
        }
        if self.dirs.contains(path) {
            return Ok(AssetInfo::dir(base_name(path), None));
        }
        Err(not_found(path))
    }
}

#[async_trait]
impl Backend for MapBackend {
    async fn stat(&self, path: &str) -> io::Result<AssetInfo> {
        self.lookup(path)
    }

    async fn open(&self, path: &str) -> io::Result<AssetReader> {
        let content = self.files.get(path).cloned().ok_or_else(|| not_found(path))?;
        Ok(Box::new(io::Cursor::new(content)))
    }
}
