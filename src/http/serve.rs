//! Content serving
//!
//! Turns an opened asset into a response: conditional GET, byte ranges,
//! content type and HEAD handling.

use super::cache::{self, Validators};
use super::mime;
use super::range::{parse_range_header, RangeParseResult};
use super::response::{self, ContentMeta};
use crate::handler::RequestContext;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::io::{self, SeekFrom};
use std::time::SystemTime;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeek, AsyncSeekExt};

/// Serve `reader` as the asset `name`
///
/// The reader is consumed from wherever it is positioned; its size is taken
/// by seeking to the end. Read and seek failures are returned to the caller.
pub async fn serve_content<R>(
    ctx: &RequestContext,
    name: &str,
    modified: Option<SystemTime>,
    reader: &mut R,
) -> io::Result<Response<Full<Bytes>>>
where
    R: AsyncRead + AsyncSeek + Unpin + ?Sized,
{
    let size = reader.seek(SeekFrom::End(0)).await?;
    reader.seek(SeekFrom::Start(0)).await?;

    let validators = Validators::for_asset(size, modified);
    if let Some(v) = &validators {
        if cache::is_not_modified(
            ctx.if_none_match.as_deref(),
            ctx.if_modified_since.as_deref(),
            v,
        ) {
            return Ok(response::build_304_response(v));
        }
    }

    let content_type = match mime::from_name(name) {
        Some(content_type) => content_type,
        None => {
            let head = read_span(reader, 0, size.min(mime::SNIFF_LEN as u64)).await?;
            mime::sniff(&head)
        }
    };

    let meta = ContentMeta {
        content_type,
        total_size: size,
        validators: validators.as_ref(),
    };

    match parse_range_header(ctx.range_header.as_deref(), size) {
        RangeParseResult::Valid(range) => {
            let body = if ctx.is_head {
                Bytes::new()
            } else {
                read_span(reader, range.start, range.len()).await?
            };
            Ok(response::build_partial_response(&meta, range, body))
        }
        RangeParseResult::NotSatisfiable => Ok(response::build_416_response(size)),
        RangeParseResult::None => {
            let body = if ctx.is_head {
                Bytes::new()
            } else {
                read_span(reader, 0, size).await?
            };
            Ok(response::build_content_response(&meta, body))
        }
    }
}

/// Read `len` bytes starting at `start`
async fn read_span<R>(reader: &mut R, start: u64, len: u64) -> io::Result<Bytes>
where
    R: AsyncRead + AsyncSeek + Unpin + ?Sized,
{
    reader.seek(SeekFrom::Start(start)).await?;
    let mut buf = Vec::with_capacity(usize::try_from(len).unwrap_or(0));
    let read = (&mut *reader).take(len).read_to_end(&mut buf).await?;
    if (read as u64) < len {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("asset truncated: expected {len} bytes, read {read}"),
        ));
    }
    Ok(Bytes::from(buf))
}
