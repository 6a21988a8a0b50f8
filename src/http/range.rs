//! HTTP Range request parsing module
//!
//! Single `bytes` ranges only (RFC 7233). Multi-range requests are answered
//! with the full body.

/// Inclusive byte span within a body of known size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

#[allow(clippy::len_without_is_empty)]
impl ByteRange {
    #[inline]
    pub const fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// `Content-Range` header value for this span
    pub fn content_range(&self, total: u64) -> String {
        format!("bytes {}-{}/{total}", self.start, self.end)
    }
}

/// Outcome of inspecting a `Range` header
#[derive(Debug, PartialEq, Eq)]
pub enum RangeParseResult {
    Valid(ByteRange),
    /// Syntactically valid but outside the body - answer 416
    NotSatisfiable,
    /// Absent, malformed or unsupported - serve the full body
    None,
}

/// Parse a `Range` header against a body of `size` bytes
///
/// Accepted forms: `bytes=start-end`, `bytes=start-`, `bytes=-suffix`.
///
/// # Examples
/// ```
/// use assetd::http::range::{parse_range_header, ByteRange, RangeParseResult};
///
/// assert_eq!(
///     parse_range_header(Some("bytes=0-99"), 1000),
///     RangeParseResult::Valid(ByteRange { start: 0, end: 99 })
/// );
/// assert_eq!(parse_range_header(None, 1000), RangeParseResult::None);
/// ```
pub fn parse_range_header(range_header: Option<&str>, size: u64) -> RangeParseResult {
    let Some(spec) = range_header.and_then(|h| h.trim().strip_prefix("bytes=")) else {
        return RangeParseResult::None;
    };
    if spec.contains(',') {
        return RangeParseResult::None;
    }
    let Some((first, last)) = spec.split_once('-') else {
        return RangeParseResult::None;
    };
    let (first, last) = (first.trim(), last.trim());

    if first.is_empty() {
        suffix_range(last, size)
    } else {
        bounded_range(first, last, size)
    }
}

/// `-N`: the final N bytes
fn suffix_range(suffix: &str, size: u64) -> RangeParseResult {
    let Ok(suffix) = suffix.parse::<u64>() else {
        return RangeParseResult::None;
    };
    if suffix == 0 || size == 0 {
        return RangeParseResult::NotSatisfiable;
    }
    RangeParseResult::Valid(ByteRange {
        start: size.saturating_sub(suffix),
        end: size - 1,
    })
}

/// `A-` or `A-B`, with B clamped to the last byte
fn bounded_range(first: &str, last: &str, size: u64) -> RangeParseResult {
    let Ok(start) = first.parse::<u64>() else {
        return RangeParseResult::None;
    };
    if start >= size {
        return RangeParseResult::NotSatisfiable;
    }

    let end = if last.is_empty() {
        size - 1
    } else {
        match last.parse::<u64>() {
            Ok(end) if end < start => return RangeParseResult::None,
            Ok(end) => end.min(size - 1),
            Err(_) => return RangeParseResult::None,
        }
    };

    RangeParseResult::Valid(ByteRange { start, end })
}
