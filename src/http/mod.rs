//! HTTP protocol layer module
//!
//! Content serving (ranges, conditional requests, content types) and
//! response builders, decoupled from asset resolution.

pub mod cache;
pub mod mime;
pub mod range;
pub mod response;
pub mod serve;

// Re-export commonly used items
pub use range::parse_range_header;
pub use response::{
    build_304_response, build_404_response, build_405_response, build_413_response,
    build_416_response, build_500_response, build_options_response,
};
pub use serve::serve_content;
