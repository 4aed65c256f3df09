//! Request-side helpers.
//!
//! # Responsibilities
//! - Generate a UUID v4 request ID for every request
//! - Work out the origin a request was addressed to
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing, echoed on the response
//! - A configured origin always wins over request headers

use axum::http::header::HOST;
use axum::http::uri::Authority;
use axum::http::{HeaderValue, Request};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

pub const X_REQUEST_ID: &str = "x-request-id";
pub const X_FORWARDED_PROTO: &str = "x-forwarded-proto";

/// Generates `x-request-id` values.
#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeRequestId;

impl MakeRequestId for EdgeRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// The request ID set by [`EdgeRequestId`], or `"unknown"`.
pub fn request_id<B>(req: &Request<B>) -> &str {
    req.headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// `scheme://host[:port]` for `req`.
///
/// Uses `configured` when set. Otherwise the scheme is the first
/// `X-Forwarded-Proto` value (http/https only), then the URI scheme, then
/// `http`; the host is the `Host` header, then the URI authority.
pub fn request_origin<B>(req: &Request<B>, configured: Option<&str>) -> Option<String> {
    if let Some(origin) = configured {
        return Some(origin.to_string());
    }

    let host = req
        .headers()
        .get(HOST)
        .and_then(|h| h.to_str().ok())
        .filter(|h| h.parse::<Authority>().is_ok())
        .or_else(|| req.uri().authority().map(Authority::as_str))?;

    let scheme = req
        .headers()
        .get(X_FORWARDED_PROTO)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_ascii_lowercase())
        .filter(|v| v == "http" || v == "https")
        .or_else(|| req.uri().scheme_str().map(str::to_string))
        .unwrap_or_else(|| "http".to_string());

    Some(format!("{scheme}://{}", host.to_ascii_lowercase()))
}
