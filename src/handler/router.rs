//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: method validation, route
//! matching, dispatch to the fetch handler, and per-request access logging.
//! Every response, success or failure, leaves through the common-header
//! middleware so cross-origin allowance is uniform.

use crate::config::AppState;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use crate::sanitize::sanitize;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Method, Request, Response, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use super::fetch;

/// A parsed resolution request. Filenames are sanitized during parsing, so
/// a constructed route never carries characters the resolver must not see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `GET /pdftex/{format}/{filename}` — file lookup by kpathsea format code
    File { format: i64, name: String },
    /// `GET /pdftex/pk/{dpi}/{filename}` — PK bitmap font lookup by resolution
    Pk { dpi: u32, name: String },
}

/// Parse a request path against the route table.
///
/// The PK route is matched first: its `pk` segment is not an integer, so it
/// can never be mistaken for a format code, but checking it first keeps the
/// precedence explicit. The filename segment is percent-decoded before
/// sanitization, so an encoded space reaches the resolver as a space; a name
/// that sanitizes to nothing does not route at all.
#[must_use]
pub fn parse_route(path: &str) -> Option<Route> {
    let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();

    match segments.as_slice() {
        ["pdftex", "pk", dpi, name] => {
            let dpi = dpi.parse::<u32>().ok()?;
            let name = request_filename(name)?;
            Some(Route::Pk { dpi, name })
        }
        ["pdftex", format, name] => {
            let format = format.parse::<i64>().ok()?;
            let name = request_filename(name)?;
            Some(Route::File { format, name })
        }
        _ => None,
    }
}

/// Decode and sanitize a filename segment; empty results don't route
fn request_filename(segment: &str) -> Option<String> {
    let name = sanitize(&percent_decode(segment));
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// Decode `%XX` escapes in a path segment.
///
/// Hyper hands the request path over as-is, so escapes the client encoded
/// (spaces, most visibly) must be undone before sanitization. Malformed
/// escapes are kept literally; the sanitizer strips the `%` afterwards.
fn percent_decode(segment: &str) -> String {
    let bytes = segment.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let hi = hex_value(bytes[i + 1]);
            let lo = hex_value(bytes[i + 2]);
            if let (Some(hi), Some(lo)) = (hi, lo) {
                out.push(hi * 16 + lo);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }

    String::from_utf8_lossy(&out).into_owned()
}

const fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// Main entry point for HTTP request handling
pub async fn handle_request(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let version = req.version();
    let is_head = method == Method::HEAD;

    let show_headers = state.config.logging.show_headers;
    logger::log_headers_count(req.headers().len(), show_headers);

    let user_agent = req
        .headers()
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string);

    let mut response = match check_http_method(&method) {
        Some(resp) => resp,
        None => match parse_route(&path) {
            Some(route) => fetch::fetch_resource(&state, &route, is_head).await,
            None => http::build_not_found_response(state.config.http.legacy_not_found),
        },
    };

    http::apply_common_headers(&mut response, &state.config.http.server_name);

    if state.config.logging.access_log {
        let entry = access_entry(
            peer_addr,
            &method,
            &path,
            version,
            &response,
            user_agent,
            started,
        );
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Check HTTP method: GET/HEAD proceed, OPTIONS gets a preflight answer,
/// anything else is rejected
fn check_http_method(method: &Method) -> Option<Response<Full<Bytes>>> {
    match *method {
        Method::GET | Method::HEAD => None,
        Method::OPTIONS => Some(http::build_options_response()),
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            Some(http::build_405_response())
        }
    }
}

/// Assemble the access log entry for a finished request
fn access_entry(
    peer_addr: SocketAddr,
    method: &Method,
    path: &str,
    version: Version,
    response: &Response<Full<Bytes>>,
    user_agent: Option<String>,
    started: Instant,
) -> AccessLogEntry {
    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        method.to_string(),
        path.to_string(),
    );
    entry.http_version = match version {
        Version::HTTP_10 => "1.0".to_string(),
        _ => "1.1".to_string(),
    };
    entry.status = response.status().as_u16();
    entry.body_bytes = response
        .headers()
        .get("content-length")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    entry.user_agent = user_agent;
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
    entry
}
