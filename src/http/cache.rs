//! HTTP cache validation module
//!
//! Validators (`ETag`, `Last-Modified`) and conditional request evaluation.

use chrono::{DateTime, Utc};
use std::time::{SystemTime, UNIX_EPOCH};

const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Validators derived from an asset's metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validators {
    pub etag: String,
    pub last_modified: DateTime<Utc>,
}

impl Validators {
    /// Build validators for an asset; `None` when the modification time is
    /// unknown or not after the epoch
    pub fn for_asset(size: u64, modified: Option<SystemTime>) -> Option<Self> {
        let modified = modified?;
        let secs = modified.duration_since(UNIX_EPOCH).ok()?.as_secs();
        if secs == 0 {
            return None;
        }
        let last_modified = DateTime::from_timestamp(i64::try_from(secs).ok()?, 0)?;
        Some(Self {
            etag: generate_etag(secs, size),
            last_modified,
        })
    }

    pub fn last_modified_header(&self) -> String {
        format_http_date(&self.last_modified)
    }
}

/// `ETag` from modification time and size, e.g. `"65a1b2c3-1f4"`
pub fn generate_etag(mtime_secs: u64, size: u64) -> String {
    format!("\"{mtime_secs:x}-{size:x}\"")
}

/// Check if client's `If-None-Match` header matches the server's `ETag`
///
/// Supports a single tag, a comma separated list, weak tags (`W/"..."`)
/// and the `*` wildcard.
pub fn check_etag_match(if_none_match: Option<&str>, etag: &str) -> bool {
    if_none_match.is_some_and(|client_etag| {
        client_etag.split(',').any(|e| {
            let e = e.trim();
            e == "*" || e.strip_prefix("W/").unwrap_or(e) == etag
        })
    })
}

/// Whether the resource is unchanged since the client's `If-Modified-Since`
pub fn not_modified_since(if_modified_since: Option<&str>, last_modified: &DateTime<Utc>) -> bool {
    if_modified_since
        .and_then(parse_http_date)
        .is_some_and(|since| *last_modified <= since)
}

/// Decide whether a conditional GET can be answered with 304
///
/// `If-None-Match` takes precedence; `If-Modified-Since` is only consulted
/// when no entity tags were sent.
pub fn is_not_modified(
    if_none_match: Option<&str>,
    if_modified_since: Option<&str>,
    validators: &Validators,
) -> bool {
    if if_none_match.is_some() {
        return check_etag_match(if_none_match, &validators.etag);
    }
    not_modified_since(if_modified_since, &validators.last_modified)
}

pub fn format_http_date(time: &DateTime<Utc>) -> String {
    time.format(HTTP_DATE_FORMAT).to_string()
}

pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(value.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn at(secs: u64) -> Option<SystemTime> {
        Some(UNIX_EPOCH + Duration::from_secs(secs))
    }

    #[test]
    fn test_validators() {
        let v = Validators::for_asset(500, at(784_111_777)).unwrap();
        assert_eq!(v.etag, "\"2ebc98a1-1f4\"");
        assert_eq!(v.last_modified_header(), "Sun, 06 Nov 1994 08:49:37 GMT");

        assert!(Validators::for_asset(500, None).is_none());
        assert!(Validators::for_asset(500, Some(UNIX_EPOCH)).is_none());
    }

    #[test]
    fn test_check_etag_match() {
        let etag = "\"abc123\"";
        assert!(check_etag_match(Some("\"abc123\""), etag));
        assert!(check_etag_match(Some("\"xyz\", \"abc123\""), etag));
        assert!(check_etag_match(Some("W/\"abc123\""), etag));
        assert!(check_etag_match(Some("*"), etag));
        assert!(!check_etag_match(Some("\"different\""), etag));
        assert!(!check_etag_match(None, etag));
    }

    #[test]
    fn test_http_date_round_trip() {
        let parsed = parse_http_date("Sun, 06 Nov 1994 08:49:37 GMT").unwrap();
        assert_eq!(parsed.timestamp(), 784_111_777);
        assert_eq!(format_http_date(&parsed), "Sun, 06 Nov 1994 08:49:37 GMT");
        assert!(parse_http_date("yesterday").is_none());
    }

    #[test]
    fn test_is_not_modified() {
        let v = Validators::for_asset(10, at(784_111_777)).unwrap();
        let same = "Sun, 06 Nov 1994 08:49:37 GMT";
        let earlier = "Sun, 06 Nov 1994 08:49:36 GMT";

        assert!(is_not_modified(None, Some(same), &v));
        assert!(!is_not_modified(None, Some(earlier), &v));
        assert!(!is_not_modified(None, None, &v));
        assert!(is_not_modified(Some(&v.etag), None, &v));
        // A non-matching tag wins over a matching date
        assert!(!is_not_modified(Some("\"other\""), Some(same), &v));
    }
}
