//! MIME type detection module
//!
//! Content-Type from the file extension, with content sniffing as the
//! fallback for unknown extensions.

const OCTET_STREAM: &str = "application/octet-stream";

const HTML_MARKERS: [&[u8]; 6] = [
    b"<!doctype html",
    b"<html",
    b"<head",
    b"<body",
    b"<h1",
    b"<p",
];

/// Number of leading bytes inspected by [`sniff`]
pub const SNIFF_LEN: usize = 512;

/// Look up the MIME type registered for a file extension
///
/// # Examples
/// ```
/// use assetd::http::mime::lookup;
/// assert_eq!(lookup("html"), Some("text/html; charset=utf-8"));
/// assert_eq!(lookup("MP4"), Some("video/mp4"));
/// assert_eq!(lookup("xyz"), None);
/// ```
pub fn lookup(extension: &str) -> Option<&'static str> {
    let content_type = match extension.to_ascii_lowercase().as_str() {
        // Text
        "html" | "htm" => "text/html; charset=utf-8",
        "css" => "text/css; charset=utf-8",
        "txt" | "md" => "text/plain; charset=utf-8",
        "xml" => "application/xml",
        "csv" => "text/csv; charset=utf-8",

        // JavaScript/WASM
        "js" | "mjs" => "text/javascript; charset=utf-8",
        "json" | "map" => "application/json",
        "wasm" => "application/wasm",

        // Images
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "webp" => "image/webp",
        "avif" => "image/avif",

        // Video
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "ogv" => "video/ogg",

        // Audio
        "mp3" => "audio/mpeg",
        "ogg" => "audio/ogg",
        "wav" => "audio/wav",
        "flac" => "audio/flac",

        // Fonts
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "otf" => "font/otf",

        // Documents
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "gz" => "application/gzip",

        _ => return None,
    };
    Some(content_type)
}

/// Content-Type for an asset name, if its extension is known
pub fn from_name(name: &str) -> Option<&'static str> {
    let (_, extension) = name.rsplit_once('.')?;
    lookup(extension)
}

/// Guess a Content-Type from the first bytes of a body
pub fn sniff(head: &[u8]) -> &'static str {
    let head = &head[..head.len().min(SNIFF_LEN)];
    let text = head
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .map_or(&[][..], |start| &head[start..]);

    if HTML_MARKERS.iter().any(|marker| {
        text.len() >= marker.len() && text[..marker.len()].eq_ignore_ascii_case(marker)
    }) {
        return "text/html; charset=utf-8";
    }

    if head.starts_with(b"%PDF-") {
        return "application/pdf";
    }
    if head.starts_with(b"\x89PNG\r\n\x1a\n") {
        return "image/png";
    }

    // A multi-byte character cut off by the sniff window still counts as text
    let utf8 = std::str::from_utf8(head).map_or_else(|e| e.error_len().is_none(), |_| true);
    if utf8 && !head.contains(&0) {
        return "text/plain; charset=utf-8";
    }
    OCTET_STREAM
}
