//! HTTP response building module
//!
//! Builders for the status codes the server emits, decoupled from request
//! resolution.

use super::cache::Validators;
use super::range::ByteRange;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{
    ACCEPT_RANGES, ALLOW, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE, ETAG, LAST_MODIFIED,
};
use hyper::http::response::Builder;
use hyper::{Response, StatusCode};

const ALLOWED_METHODS: &str = "GET, HEAD, OPTIONS";

/// Headers describing the body that is (or would be) sent
#[derive(Debug, Clone)]
pub struct ContentMeta<'a> {
    pub content_type: &'a str,
    pub total_size: u64,
    pub validators: Option<&'a Validators>,
}

/// Build 200 OK for a full body
///
/// `content_length` is sent even when `body` is empty for HEAD requests.
pub fn build_content_response(meta: &ContentMeta<'_>, body: Bytes) -> Response<Full<Bytes>> {
    content_builder(StatusCode::OK, meta)
        .header(CONTENT_LENGTH, meta.total_size)
        .body(Full::new(body))
        .unwrap_or_else(|e| fallback("200", &e))
}

/// Build 206 Partial Content response
pub fn build_partial_response(
    meta: &ContentMeta<'_>,
    range: ByteRange,
    body: Bytes,
) -> Response<Full<Bytes>> {
    content_builder(StatusCode::PARTIAL_CONTENT, meta)
        .header(CONTENT_LENGTH, range.len())
        .header(CONTENT_RANGE, range.content_range(meta.total_size))
        .body(Full::new(body))
        .unwrap_or_else(|e| fallback("206", &e))
}

fn content_builder(status: StatusCode, meta: &ContentMeta<'_>) -> Builder {
    let builder = Response::builder()
        .status(status)
        .header(CONTENT_TYPE, meta.content_type)
        .header(ACCEPT_RANGES, "bytes");
    with_validators(builder, meta.validators)
}

fn with_validators(builder: Builder, validators: Option<&Validators>) -> Builder {
    match validators {
        Some(v) => builder
            .header(ETAG, v.etag.as_str())
            .header(LAST_MODIFIED, v.last_modified_header()),
        None => builder,
    }
}

/// Build 304 Not Modified response
pub fn build_304_response(validators: &Validators) -> Response<Full<Bytes>> {
    with_validators(
        Response::builder().status(StatusCode::NOT_MODIFIED),
        Some(validators),
    )
    .body(Full::new(Bytes::new()))
    .unwrap_or_else(|e| fallback("304", &e))
}

/// Build 404 Not Found response
pub fn build_404_response() -> Response<Full<Bytes>> {
    plain_text(StatusCode::NOT_FOUND, "404 Not Found")
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> Response<Full<Bytes>> {
    let mut resp = plain_text(StatusCode::METHOD_NOT_ALLOWED, "405 Method Not Allowed");
    resp.headers_mut()
        .insert(ALLOW, hyper::header::HeaderValue::from_static(ALLOWED_METHODS));
    resp
}

/// Build 413 Payload Too Large response
pub fn build_413_response() -> Response<Full<Bytes>> {
    plain_text(StatusCode::PAYLOAD_TOO_LARGE, "413 Payload Too Large")
}

/// Build 416 Range Not Satisfiable response
pub fn build_416_response(total_size: u64) -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::RANGE_NOT_SATISFIABLE)
        .header(CONTENT_TYPE, "text/plain; charset=utf-8")
        .header(CONTENT_RANGE, format!("bytes */{total_size}"))
        .body(Full::new(Bytes::from("416 Range Not Satisfiable")))
        .unwrap_or_else(|e| fallback("416", &e))
}

/// Build 500 Internal Server Error response
pub fn build_500_response() -> Response<Full<Bytes>> {
    plain_text(StatusCode::INTERNAL_SERVER_ERROR, "500 Internal Server Error")
}

/// Build OPTIONS response (preflight request)
pub fn build_options_response(enable_cors: bool) -> Response<Full<Bytes>> {
    let mut builder = Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header(ALLOW, ALLOWED_METHODS);

    if enable_cors {
        builder = builder
            .header("Access-Control-Allow-Origin", "*")
            .header("Access-Control-Allow-Methods", ALLOWED_METHODS)
            .header(
                "Access-Control-Allow-Headers",
                "Range, If-None-Match, If-Modified-Since",
            )
            .header("Access-Control-Max-Age", "86400");
    }

    builder
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| fallback("OPTIONS", &e))
}

fn plain_text(status: StatusCode, body: &'static str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "text/plain; charset=utf-8")
        .header("X-Content-Type-Options", "nosniff")
        .body(Full::new(Bytes::from_static(body.as_bytes())))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            let mut resp = Response::new(Full::new(Bytes::from_static(body.as_bytes())));
            *resp.status_mut() = status;
            resp
        })
}

fn fallback(status: &str, error: &hyper::http::Error) -> Response<Full<Bytes>> {
    log_build_error(status, error);
    let mut resp = Response::new(Full::new(Bytes::new()));
    *resp.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    resp
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
