//! Zip archive backend

use super::{base_name, not_found, AssetInfo, AssetReader, Backend};
use crate::error::SetupError;
use crate::handler::path as request_path;
use crate::logger;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::{self, Read, Seek};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

/// One indexed archive member
#[derive(Debug, Clone)]
struct Entry {
    /// Position in the archive, `None` for implied directories
    index: Option<usize>,
    info: AssetInfo,
}

/// Serves assets out of a zip archive
///
/// The central directory is indexed once at construction. Member contents
/// are decompressed on `open` on the blocking thread pool.
pub struct ZipBackend<R = File> {
    name: String,
    archive: Arc<Mutex<zip::ZipArchive<R>>>,
    entries: HashMap<String, Entry>,
}

impl ZipBackend<File> {
    /// Open the archive at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SetupError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            SetupError::io(format!("cannot open archive {}", path.display()), e)
        })?;
        let archive = zip::ZipArchive::new(file).map_err(|source| SetupError::Archive {
            name: path.display().to_string(),
            source,
        })?;
        Ok(Self::new(archive, path.display().to_string()))
    }
}

impl<R: Read + Seek> ZipBackend<R> {
    /// Wrap an already opened archive; `name` labels it in logs
    pub fn new(mut archive: zip::ZipArchive<R>, name: impl Into<String>) -> Self {
        let name = name.into();
        let mut entries = HashMap::new();
        entries.insert(
            "/".to_string(),
            Entry {
                index: None,
                info: AssetInfo::dir("/", None),
            },
        );

        for index in 0..archive.len() {
            let Ok(member) = archive.by_index(index) else {
                continue;
            };
            let raw_name = member.name().trim_start_matches('/');
            let path = format!("/{}", raw_name.trim_end_matches('/'));
            if path == "/" {
                continue;
            }
            if request_path::clean(&path) != path {
                logger::log_warning(&format!(
                    "Skipping zip member {:?} in {name}: not a clean path",
                    member.name()
                ));
                continue;
            }
            let modified = member.last_modified().and_then(|dt| {
                let date = NaiveDate::from_ymd_opt(
                    i32::from(dt.year()),
                    u32::from(dt.month()),
                    u32::from(dt.day()),
                )?;
                date.and_hms_opt(
                    u32::from(dt.hour()),
                    u32::from(dt.minute()),
                    u32::from(dt.second()),
                )
                .map(|naive| SystemTime::from(naive.and_utc()))
            });
            let info = if member.is_dir() {
                AssetInfo::dir(base_name(&path), modified)
            } else {
                AssetInfo::file(base_name(&path), member.size(), modified)
            };
            drop(member);

            insert_parents(&mut entries, &path);
            entries.insert(
                path,
                Entry {
                    index: Some(index),
                    info,
                },
            );
        }

        Self {
            name,
            archive: Arc::new(Mutex::new(archive)),
            entries,
        }
    }
}

/// Register implied parent directories of `path` that have no entry yet
fn insert_parents(entries: &mut HashMap<String, Entry>, path: &str) {
    let mut parent = path;
    while let Some(idx) = parent.rfind('/') {
        parent = &parent[..idx];
        if parent.is_empty() {
            break;
        }
        entries.entry(parent.to_string()).or_insert_with(|| Entry {
            index: None,
            info: AssetInfo::dir(base_name(parent), None),
        });
    }
}

impl<R> fmt::Debug for ZipBackend<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZipBackend")
            .field("name", &self.name)
            .field("entries", &self.entries.len())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<R> Backend for ZipBackend<R>
where
    R: Read + Seek + Send + 'static,
{
    async fn stat(&self, path: &str) -> io::Result<AssetInfo> {
        self.entries
            .get(path)
            .map(|entry| entry.info.clone())
            .ok_or_else(|| not_found(path))
    }

    async fn open(&self, path: &str) -> io::Result<AssetReader> {
        let entry = self.entries.get(path).ok_or_else(|| not_found(path))?;
        let Some(index) = entry.index.filter(|_| !entry.info.is_dir) else {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{path} is a directory"),
            ));
        };
        let capacity = usize::try_from(entry.info.size).unwrap_or(0);
        let archive = Arc::clone(&self.archive);

        let content = tokio::task::spawn_blocking(move || -> io::Result<Vec<u8>> {
            let mut archive = archive
                .lock()
                .map_err(|_| io::Error::other("zip archive lock poisoned"))?;
            let mut member = archive.by_index(index).map_err(io::Error::other)?;
            let mut buf = Vec::with_capacity(capacity);
            member.read_to_end(&mut buf)?;
            Ok(buf)
        })
        .await
        .map_err(io::Error::other)??;

        Ok(Box::new(io::Cursor::new(content)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tokio::io::AsyncReadExt;
    use zip::write::SimpleFileOptions;

    fn build_archive(
        files: &[(&str, &str)],
        dirs: &[&str],
    ) -> zip::ZipArchive<io::Cursor<Vec<u8>>> {
        let mut writer = zip::ZipWriter::new(io::Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        for dir in dirs {
            writer.add_directory(*dir, options).unwrap();
        }
        for (name, content) in files {
            writer.start_file(*name, options).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        let cursor = writer.finish().unwrap();
        zip::ZipArchive::new(io::Cursor::new(cursor.into_inner())).unwrap()
    }

    #[tokio::test]
    async fn test_stat_explicit_and_implied_dirs() {
        let archive = build_archive(&[("site/css/app.css", "a{}")], &["empty/"]);
        let backend = ZipBackend::new(archive, "test.zip");

        assert!(backend.stat("/").await.unwrap().is_dir);
        assert!(backend.stat("/site").await.unwrap().is_dir);
        assert!(backend.stat("/site/css").await.unwrap().is_dir);
        assert!(backend.stat("/empty").await.unwrap().is_dir);

        let css = backend.stat("/site/css/app.css").await.unwrap();
        assert!(!css.is_dir);
        assert_eq!(css.name, "app.css");
        assert_eq!(css.size, 3);
        assert!(css.modified.is_some());

        assert!(backend.stat("/site/missing.css").await.is_err());
    }

    #[tokio::test]
    async fn test_open_decompresses() {
        let archive = build_archive(&[("index.html", "<h1>zipped</h1>")], &[]);
        let backend = ZipBackend::new(archive, "test.zip");

        let mut reader = backend.open("/index.html").await.unwrap();
        let mut body = String::new();
        reader.read_to_string(&mut body).await.unwrap();
        assert_eq!(body, "<h1>zipped</h1>");

        assert!(backend.open("/").await.is_err());
        assert!(backend.open("/other.html").await.is_err());
    }

    #[tokio::test]
    async fn test_unclean_member_names_skipped() {
        let archive = build_archive(
            &[
                ("a/../b.txt", "dot"),
                ("a//c.txt", "double"),
                ("./d.txt", "here"),
                ("ok.txt", "ok"),
            ],
            &[],
        );
        let backend = ZipBackend::new(archive, "test.zip");

        assert!(backend.stat("/ok.txt").await.is_ok());
        for path in [
            "/a/../b.txt",
            "/b.txt",
            "/a//c.txt",
            "/a/c.txt",
            "/./d.txt",
            "/d.txt",
        ] {
            assert!(backend.stat(path).await.is_err(), "{path}");
        }
        assert!(backend.stat("/a").await.is_err());
    }

    #[test]
    fn test_open_rejects_non_archive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bogus.zip");
        std::fs::write(&path, "not a zip").unwrap();
        assert!(matches!(
            ZipBackend::open(&path),
            Err(SetupError::Archive { .. })
        ));
    }
}
