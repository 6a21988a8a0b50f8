//! Request handler module
//!
//! Path normalization, asset resolution, error responses and the HTTP
//! entry point that ties them together.

pub mod error_pages;
pub mod path;
pub mod resolver;
pub mod router;

// Re-export main entry points
pub use error_pages::{ErrorHandler, ErrorHandlers};
pub use resolver::{ResolvedAsset, StaticServer, DEFAULT_INDEX_FILE};
pub use router::{handle_request, RequestContext};
