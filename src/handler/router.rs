//! Request dispatch module
//!
//! Entry point for HTTP request processing: method validation, request
//! context extraction, dispatch to the resolver and access logging.

use crate::config::AppState;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderMap, HeaderValue, SERVER};
use hyper::{Method, Request, Response, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Request data the resolver, the content layer and error handlers look at
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub method: Method,
    /// Raw (percent-encoded) URI path
    pub path: String,
    pub query: Option<String>,
    pub is_head: bool,
    pub if_none_match: Option<String>,
    pub if_modified_since: Option<String>,
    pub range_header: Option<String>,
}

impl RequestContext {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            is_head: method == Method::HEAD,
            method,
            path: path.into(),
            query: None,
            if_none_match: None,
            if_modified_since: None,
            range_header: None,
        }
    }

    pub fn from_request<B>(req: &Request<B>) -> Self {
        let headers = req.headers();
        Self {
            query: req.uri().query().map(ToString::to_string),
            if_none_match: header_string(headers, "if-none-match"),
            if_modified_since: header_string(headers, "if-modified-since"),
            range_header: header_string(headers, "range"),
            ..Self::new(req.method().clone(), req.uri().path())
        }
    }
}

fn header_string(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let ctx = RequestContext::from_request(&req);

    let http_config = &state.config.http;
    let rejected = check_http_method(&ctx.method, http_config.enable_cors)
        .or_else(|| check_body_size(req.headers(), http_config.max_body_size));
    let mut response = match rejected {
        Some(resp) => resp,
        None => state.server.serve(&ctx).await,
    };

    if let Ok(server_name) = HeaderValue::from_str(&state.config.http.server_name) {
        response.headers_mut().insert(SERVER, server_name);
    }

    if state.config.logging.access_log {
        let entry = access_entry(&req, &ctx, &response, peer_addr, started);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Check HTTP method and return appropriate response for non-GET/HEAD methods
fn check_http_method(method: &Method, enable_cors: bool) -> Option<Response<Full<Bytes>>> {
    match *method {
        Method::GET | Method::HEAD => None,
        Method::OPTIONS => Some(http::build_options_response(enable_cors)),
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            Some(http::build_405_response())
        }
    }
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size(headers: &HeaderMap, max_body_size: u64) -> Option<Response<Full<Bytes>>> {
    let size_str = headers.get("content-length")?.to_str().ok()?;
    match size_str.parse::<u64>() {
        Ok(size) if size > max_body_size => {
            logger::log_warning(&format!(
                "Request body too large: {size} bytes (max: {max_body_size})"
            ));
            Some(http::build_413_response())
        }
        Ok(_) => None,
        Err(_) => {
            logger::log_warning(&format!(
                "Invalid Content-Length value: '{size_str}', skipping size check"
            ));
            None
        }
    }
}

fn access_entry<B>(
    req: &Request<B>,
    ctx: &RequestContext,
    response: &Response<Full<Bytes>>,
    peer_addr: SocketAddr,
    started: Instant,
) -> AccessLogEntry {
    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        ctx.method.to_string(),
        ctx.path.clone(),
    );
    entry.query.clone_from(&ctx.query);
    entry.http_version = version_label(req.version()).to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = response.body().size_hint().exact().unwrap_or(0);
    entry.referer = header_string(req.headers(), "referer");
    entry.user_agent = header_string(req.headers(), "user-agent");
    let elapsed_us = started.elapsed().as_micros();
    entry.request_time_us = u64::try_from(elapsed_us).unwrap_or(u64::MAX);
    entry
}

const fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::handler::StaticServer;
    use http_body_util::BodyExt;
    use hyper::StatusCode;

    fn state() -> Arc<AppState> {
        let server = StaticServer::from_map([
            ("index.html", "root index file"),
            ("notes.txt", "0123456789"),
        ])
        .unwrap();
        let mut config = Config::default();
        config.logging.access_log = false;
        Arc::new(AppState::new(config, server))
    }

    fn peer() -> SocketAddr {
        "127.0.0.1:50000".parse().unwrap()
    }

    async fn send(req: Request<()>) -> Response<Full<Bytes>> {
        handle_request(req, state(), peer()).await.unwrap()
    }

    #[test]
    fn test_context_from_request() {
        let req = Request::builder()
            .method(Method::HEAD)
            .uri("/a%20b/c.txt?v=1")
            .header("Range", "bytes=0-1")
            .header("If-None-Match", "\"x\"")
            .body(())
            .unwrap();
        let ctx = RequestContext::from_request(&req);
        assert!(ctx.is_head);
        assert_eq!(ctx.path, "/a%20b/c.txt");
        assert_eq!(ctx.query.as_deref(), Some("v=1"));
        assert_eq!(ctx.range_header.as_deref(), Some("bytes=0-1"));
        assert_eq!(ctx.if_none_match.as_deref(), Some("\"x\""));
        assert_eq!(ctx.if_modified_since, None);
    }

    #[tokio::test]
    async fn test_get_and_head() {
        let resp = send(Request::get("/").body(()).unwrap()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.headers().contains_key(SERVER));
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(body, "root index file");

        let resp = send(Request::head("/notes.txt").body(()).unwrap()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()["content-length"], "10");
        assert!(resp.into_body().collect().await.unwrap().to_bytes().is_empty());
    }

    #[tokio::test]
    async fn test_range_through_router() {
        let req = Request::get("/notes.txt")
            .header("Range", "bytes=-3")
            .body(())
            .unwrap();
        let resp = send(req).await;
        assert_eq!(resp.status(), StatusCode::PARTIAL_CONTENT);
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(body, "789");
    }

    #[tokio::test]
    async fn test_method_filtering() {
        let resp = send(Request::post("/").body(()).unwrap()).await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);

        let resp = send(Request::options("/").body(()).unwrap()).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_body_too_large() {
        let req = Request::get("/")
            .header("Content-Length", "999999999999")
            .body(())
            .unwrap();
        assert_eq!(send(req).await.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn test_version_label() {
        assert_eq!(version_label(Version::HTTP_11), "1.1");
        assert_eq!(version_label(Version::HTTP_10), "1.0");
    }
}
