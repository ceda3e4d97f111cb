//! HTTP response building module
//!
//! Builders for the responses the resolution server emits, plus the
//! middleware step that stamps the cross-origin and identity headers on
//! every outgoing response.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::HeaderValue;
use hyper::Response;

/// Plain-text body sent for every missing resource
pub const NOT_FOUND_BODY: &str = "File not found";

/// Add the headers every response carries: permissive cross-origin
/// allowance and the server identity. Applied once after dispatch, for
/// success and failure responses alike.
pub fn apply_common_headers(response: &mut Response<Full<Bytes>>, server_name: &str) {
    let headers = response.headers_mut();
    headers.insert(
        "Access-Control-Allow-Origin",
        HeaderValue::from_static("*"),
    );
    if let Ok(value) = HeaderValue::from_str(server_name) {
        headers.insert("Server", value);
    }
}

/// Build the not-found response.
///
/// The original service answered missing resources with 301; `legacy`
/// preserves that exact status for clients built against it, otherwise the
/// status is an honest 404.
pub fn build_not_found_response(legacy: bool) -> Response<Full<Bytes>> {
    let status = if legacy { 301 } else { 404 };
    Response::builder()
        .status(status)
        .header("Content-Type", "text/plain")
        .body(Full::new(Bytes::from(NOT_FOUND_BODY)))
        .unwrap_or_else(|e| {
            log_build_error("not-found", &e);
            Response::new(Full::new(Bytes::from(NOT_FOUND_BODY)))
        })
}

/// Build the successful file response.
///
/// Bytes go out as `application/octet-stream`; the resolved file's base
/// name rides along in `id_header` (`fileid` or `pkid`), declared readable
/// by cross-origin callers through `Access-Control-Expose-Headers`. HEAD
/// requests get identical headers with an empty body.
pub fn build_file_response(
    data: Vec<u8>,
    basename: &str,
    id_header: &'static str,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let content_length = data.len();
    let body = if is_head {
        Bytes::new()
    } else {
        Bytes::from(data)
    };

    let mut builder = Response::builder()
        .status(200)
        .header("Content-Type", "application/octet-stream")
        .header("Content-Length", content_length)
        .header("Access-Control-Expose-Headers", id_header);

    // Sanitized names are always valid header values, but never trust that
    if let Ok(value) = HeaderValue::from_str(basename) {
        builder = builder.header(id_header, value);
    }

    builder.body(Full::new(body)).unwrap_or_else(|e| {
        log_build_error("200", &e);
        Response::new(Full::new(Bytes::new()))
    })
}

/// Build OPTIONS response (preflight request)
pub fn build_options_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(204)
        .header("Allow", "GET, HEAD, OPTIONS")
        .header("Access-Control-Allow-Methods", "GET, HEAD, OPTIONS")
        .header("Access-Control-Allow-Headers", "Content-Type")
        .header("Access-Control-Max-Age", "86400")
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error("OPTIONS", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(405)
        .header("Content-Type", "text/plain")
        .header("Allow", "GET, HEAD, OPTIONS")
        .body(Full::new(Bytes::from("405 Method Not Allowed")))
        .unwrap_or_else(|e| {
            log_build_error("405", &e);
            Response::new(Full::new(Bytes::from("405 Method Not Allowed")))
        })
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
