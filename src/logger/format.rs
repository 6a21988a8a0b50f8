//! Access log formats
//!
//! `logging.access_log_format` selects one of:
//! - `combined`: NCSA combined (common plus referer and user agent)
//! - `common`: NCSA common log format
//! - `json`: one JSON object per line
//! - anything else: a pattern with `$variable` placeholders

use chrono::{DateTime, Local};
use std::borrow::Cow;

const CLF_TIME: &str = "%d/%b/%Y:%H:%M:%S %z";

/// Parsed `logging.access_log_format` value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessLogFormat {
    Combined,
    Common,
    Json,
    Pattern(String),
}

impl AccessLogFormat {
    pub fn parse(format: &str) -> Self {
        match format {
            "combined" => Self::Combined,
            "common" => Self::Common,
            "json" => Self::Json,
            pattern => Self::Pattern(pattern.to_string()),
        }
    }
}

/// Everything recorded about one served request
#[derive(Debug, Clone)]
pub struct AccessLogEntry {
    pub remote_addr: String,
    pub time: DateTime<Local>,
    pub method: String,
    /// Request path as received, still percent-encoded
    pub path: String,
    /// Query string without the leading `?`
    pub query: Option<String>,
    /// `1.0`, `1.1`, `2`
    pub http_version: String,
    pub status: u16,
    pub body_bytes: u64,
    pub referer: Option<String>,
    pub user_agent: Option<String>,
    pub request_time_us: u64,
}

impl AccessLogEntry {
    /// Entry stamped with the current local time; fill the rest in afterwards
    pub fn new(remote_addr: String, method: String, path: String) -> Self {
        Self {
            remote_addr,
            time: Local::now(),
            method,
            path,
            query: None,
            http_version: "1.1".to_string(),
            status: 200,
            body_bytes: 0,
            referer: None,
            user_agent: None,
            request_time_us: 0,
        }
    }

    /// Render with a format name or pattern as found in the configuration
    pub fn format(&self, format: &str) -> String {
        self.render(&AccessLogFormat::parse(format))
    }

    pub fn render(&self, format: &AccessLogFormat) -> String {
        match format {
            AccessLogFormat::Common => self.common(),
            AccessLogFormat::Combined => format!(
                "{} \"{}\" \"{}\"",
                self.common(),
                self.referer.as_deref().unwrap_or("-"),
                self.user_agent.as_deref().unwrap_or("-"),
            ),
            AccessLogFormat::Json => self.json(),
            AccessLogFormat::Pattern(pattern) => self.expand(pattern),
        }
    }

    fn request_uri(&self) -> Cow<'_, str> {
        match self.query {
            Some(ref q) => Cow::Owned(format!("{}?{q}", self.path)),
            None => Cow::Borrowed(&self.path),
        }
    }

    fn request_line(&self) -> String {
        format!(
            "{} {} HTTP/{}",
            self.method,
            self.request_uri(),
            self.http_version
        )
    }

    fn common(&self) -> String {
        format!(
            "{} - - [{}] \"{}\" {} {}",
            self.remote_addr,
            self.time.format(CLF_TIME),
            self.request_line(),
            self.status,
            self.body_bytes,
        )
    }

    fn json(&self) -> String {
        serde_json::json!({
            "remote_addr": self.remote_addr,
            "time": self.time.to_rfc3339(),
            "method": self.method,
            "path": self.path,
            "query": self.query,
            "http_version": self.http_version,
            "status": self.status,
            "body_bytes": self.body_bytes,
            "referer": self.referer,
            "user_agent": self.user_agent,
            "request_time_us": self.request_time_us,
        })
        .to_string()
    }

    /// Value of one `$variable`, `None` if the name is unknown
    fn variable(&self, name: &str) -> Option<Cow<'_, str>> {
        let value = match name {
            "remote_addr" => Cow::Borrowed(self.remote_addr.as_str()),
            "time_local" => Cow::Owned(self.time.format(CLF_TIME).to_string()),
            "time_iso8601" => Cow::Owned(self.time.to_rfc3339()),
            "request" => Cow::Owned(self.request_line()),
            "request_method" => Cow::Borrowed(self.method.as_str()),
            "request_uri" => self.request_uri(),
            "uri" => Cow::Borrowed(self.path.as_str()),
            "args" => Cow::Borrowed(self.query.as_deref().unwrap_or("")),
            "status" => Cow::Owned(self.status.to_string()),
            "body_bytes_sent" => Cow::Owned(self.body_bytes.to_string()),
            "http_referer" => Cow::Borrowed(self.referer.as_deref().unwrap_or("-")),
            "http_user_agent" => Cow::Borrowed(self.user_agent.as_deref().unwrap_or("-")),
            "request_time" => {
                #[allow(clippy::cast_precision_loss)]
                let secs = self.request_time_us as f64 / 1_000_000.0;
                Cow::Owned(format!("{secs:.3}"))
            }
            _ => return None,
        };
        Some(value)
    }

    /// Substitute `$name` placeholders; the longest name wins and unknown
    /// names are copied through unchanged
    fn expand(&self, pattern: &str) -> String {
        let mut out = String::with_capacity(pattern.len() + 64);
        let mut rest = pattern;
        while let Some(pos) = rest.find('$') {
            out.push_str(&rest[..pos]);
            let after = &rest[pos + 1..];
            let len = after
                .bytes()
                .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_')
                .count();
            let name = &after[..len];
            if let Some(value) = self.variable(name) {
                out.push_str(&value);
            } else {
                out.push('$');
                out.push_str(name);
            }
            rest = &after[len..];
        }
        out.push_str(rest);
        out
    }
}
