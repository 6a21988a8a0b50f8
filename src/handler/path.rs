//! Request path normalization

use percent_encoding::percent_decode_str;
use std::borrow::Cow;

/// Percent-decode a raw URI path. Returns `None` if the result is not UTF-8.
pub fn decode(raw: &str) -> Option<Cow<'_, str>> {
    percent_decode_str(raw).decode_utf8().ok()
}

/// Lexically clean a request path so it stays beneath `/`
///
/// Empty and `.` segments are dropped, `..` removes the previous segment
/// and is ignored at the root. The result always begins with `/` and has
/// no trailing slash unless it is the root itself.
pub fn clean(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    let mut cleaned = String::with_capacity(path.len() + 1);
    for segment in &segments {
        cleaned.push('/');
        cleaned.push_str(segment);
    }
    if cleaned.is_empty() {
        cleaned.push('/');
    }
    cleaned
}

/// Join a file name onto a cleaned directory path
pub fn join(dir: &str, name: &str) -> String {
    if dir.ends_with('/') {
        format!("{dir}{name}")
    } else {
        format!("{dir}/{name}")
    }
}
