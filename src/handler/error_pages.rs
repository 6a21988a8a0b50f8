//! Error response handlers
//!
//! A server answers failed resolutions through a small table keyed by HTTP
//! status. Only 404 and 500 have slots; each falls back to a plain-text
//! default when the caller does not provide one.

use super::router::RequestContext;
use crate::error::SetupError;
use crate::http;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Writes the response for a failed request
pub type ErrorHandler = Arc<dyn Fn(&RequestContext) -> Response<Full<Bytes>> + Send + Sync>;

static DEFAULT_HANDLERS: OnceLock<ErrorHandlers> = OnceLock::new();

/// Handler table for 404 and 500 responses
#[derive(Clone)]
pub struct ErrorHandlers {
    not_found: ErrorHandler,
    internal_error: ErrorHandler,
}

impl ErrorHandlers {
    /// Build a table from a status -> handler map, keeping defaults for
    /// missing slots
    pub fn from_map(handlers: HashMap<u16, ErrorHandler>) -> Result<Self, SetupError> {
        handlers
            .into_iter()
            .try_fold(Self::default(), |table, (status, handler)| {
                table.with_arc(status, handler)
            })
    }

    /// Replace the handler for `status` (404 or 500)
    pub fn with_handler<F>(self, status: StatusCode, handler: F) -> Result<Self, SetupError>
    where
        F: Fn(&RequestContext) -> Response<Full<Bytes>> + Send + Sync + 'static,
    {
        self.with_arc(status.as_u16(), Arc::new(handler))
    }

    fn with_arc(mut self, status: u16, handler: ErrorHandler) -> Result<Self, SetupError> {
        match status {
            404 => self.not_found = handler,
            500 => self.internal_error = handler,
            other => return Err(SetupError::UnsupportedStatus(other)),
        }
        Ok(self)
    }

    pub fn not_found(&self, ctx: &RequestContext) -> Response<Full<Bytes>> {
        (self.not_found)(ctx)
    }

    pub fn internal_error(&self, ctx: &RequestContext) -> Response<Full<Bytes>> {
        (self.internal_error)(ctx)
    }
}

impl Default for ErrorHandlers {
    fn default() -> Self {
        DEFAULT_HANDLERS
            .get_or_init(|| Self {
                not_found: Arc::new(default_not_found),
                internal_error: Arc::new(default_internal_error),
            })
            .clone()
    }
}

fn default_not_found(_: &RequestContext) -> Response<Full<Bytes>> {
    http::build_404_response()
}

fn default_internal_error(_: &RequestContext) -> Response<Full<Bytes>> {
    http::build_500_response()
}

impl fmt::Debug for ErrorHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorHandlers").finish_non_exhaustive()
    }
}
