//! Request resolution
//!
//! Maps a request path onto a concrete asset of the bound backend:
//! clean the path, fall back to the index document for directories, open a
//! reader, hand it to the content-serving layer and release it afterwards.
//! Directory listings are never produced.

use super::error_pages::ErrorHandlers;
use super::path;
use super::router::RequestContext;
use crate::backend::{
    AssetInfo, AssetReader, Backend, MapBackend, OsBackend, RawBackend, ZipBackend,
};
use crate::error::{ResolveError, SetupError};
use crate::http;
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::fmt;
use std::io::{self, Read, Seek};
use std::path::Path;
use std::sync::Arc;

/// Default index document for directory requests
pub const DEFAULT_INDEX_FILE: &str = "index.html";

/// An asset ready to be served
pub struct ResolvedAsset {
    /// Cleaned backend path of the file
    pub path: String,
    pub info: AssetInfo,
    pub reader: AssetReader,
}

impl fmt::Debug for ResolvedAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedAsset")
            .field("path", &self.path)
            .field("info", &self.info)
            .finish_non_exhaustive()
    }
}

/// Static asset server bound to one backend
///
/// Holds no per-request state; share it behind an `Arc` across connections.
#[derive(Clone)]
pub struct StaticServer {
    backend: Arc<dyn Backend>,
    error_handlers: ErrorHandlers,
    index_file: String,
    diagnostics: bool,
}

impl StaticServer {
    pub fn new(backend: impl Backend + 'static) -> Self {
        Self::from_backend(Arc::new(backend))
    }

    pub fn from_backend(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            error_handlers: ErrorHandlers::default(),
            index_file: DEFAULT_INDEX_FILE.to_string(),
            diagnostics: false,
        }
    }

    /// Serve the OS directory `root`
    pub fn from_dir(root: impl AsRef<Path>) -> Result<Self, SetupError> {
        Ok(Self::new(OsBackend::new(root)?))
    }

    /// Serve a `path -> content` map; keys must not start with `/`
    pub fn from_map<K, V>(files: impl IntoIterator<Item = (K, V)>) -> Result<Self, SetupError>
    where
        K: Into<String>,
        V: Into<Bytes>,
    {
        Ok(Self::new(MapBackend::new(files)?))
    }

    /// Serve the members of a zip archive
    pub fn from_zip<R>(archive: zip::ZipArchive<R>, name: impl Into<String>) -> Self
    where
        R: Read + Seek + Send + 'static,
    {
        Self::new(ZipBackend::new(archive, name))
    }

    /// Serve through caller-supplied lookup functions
    pub fn raw<S, O>(stat: S, open: O) -> Self
    where
        S: Fn(&str) -> io::Result<AssetInfo> + Send + Sync + 'static,
        O: Fn(&str) -> io::Result<AssetReader> + Send + Sync + 'static,
    {
        Self::new(RawBackend::new(stat, open))
    }

    #[must_use]
    pub fn with_error_handlers(mut self, error_handlers: ErrorHandlers) -> Self {
        self.error_handlers = error_handlers;
        self
    }

    #[must_use]
    pub fn with_index_file(mut self, index_file: impl Into<String>) -> Self {
        self.index_file = index_file.into();
        self
    }

    /// Log one line per resolution step
    #[must_use]
    pub const fn with_diagnostics(mut self, enabled: bool) -> Self {
        self.diagnostics = enabled;
        self
    }

    fn trace(&self, message: &str) {
        if self.diagnostics {
            logger::log_diagnostic(message);
        }
    }

    /// Resolve a raw (still percent-encoded) request path to an open asset
    pub async fn resolve(&self, raw_path: &str) -> Result<ResolvedAsset, ResolveError> {
        let Some(decoded) = path::decode(raw_path) else {
            self.trace(&format!("Undecodable request path, not found: {raw_path}"));
            return Err(ResolveError::NotFound(raw_path.to_string()));
        };
        let mut req_path = path::clean(&decoded);

        let mut info = match self.backend.stat(&req_path).await {
            Ok(info) => info,
            Err(e) => {
                self.trace(&format!("Requested path not found ({e}): {req_path}"));
                return Err(ResolveError::NotFound(req_path));
            }
        };

        if info.is_dir {
            let index_path = path::join(&req_path, &self.index_file);
            self.trace(&format!(
                "Requested path is a directory, trying index document: {index_path}"
            ));
            info = match self.backend.stat(&index_path).await {
                Ok(index) if index.is_dir => {
                    self.trace(&format!(
                        "Index document is a directory, not found: {index_path}"
                    ));
                    return Err(ResolveError::NotFound(index_path));
                }
                Ok(index) => index,
                Err(_) => {
                    self.trace(&format!("Index document not found: {index_path}"));
                    return Err(ResolveError::NotFound(index_path));
                }
            };
            req_path = index_path;
        }

        match self.backend.open(&req_path).await {
            Ok(reader) => Ok(ResolvedAsset {
                path: req_path,
                info,
                reader,
            }),
            Err(source) => {
                self.trace(&format!("Failed to open asset ({source}): {req_path}"));
                Err(ResolveError::Internal {
                    path: req_path,
                    source,
                })
            }
        }
    }

    /// Produce the response for a GET/HEAD request
    pub async fn serve(&self, ctx: &RequestContext) -> Response<Full<Bytes>> {
        self.trace(&format!("Request for: {}", ctx.path));

        let mut asset = match self.resolve(&ctx.path).await {
            Ok(asset) => asset,
            Err(ResolveError::NotFound(_)) => return self.error_handlers.not_found(ctx),
            Err(err @ ResolveError::Internal { .. }) => {
                logger::log_error(&err.to_string());
                return self.error_handlers.internal_error(ctx);
            }
        };

        self.trace(&format!("Serving content for: {}", asset.path));
        let served = http::serve_content(
            ctx,
            &asset.info.name,
            asset.info.modified,
            &mut asset.reader,
        )
        .await;

        if let Some(closable) = asset.reader.as_closable() {
            if let Err(e) = closable.close() {
                logger::log_warning(&format!(
                    "Failed to close reader for {}: {e}",
                    asset.path
                ));
            }
        }

        served.unwrap_or_else(|e| {
            logger::log_error(&format!("Failed to serve {}: {e}", asset.path));
            self.error_handlers.internal_error(ctx)
        })
    }
}

impl fmt::Debug for StaticServer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticServer")
            .field("index_file", &self.index_file)
            .field("diagnostics", &self.diagnostics)
            .finish_non_exhaustive()
    }
}
