//! Redirect responses.

use axum::body::Body;
use axum::http::header::LOCATION;
use axum::http::{HeaderValue, StatusCode};
use axum::response::Response;

/// `Location` value for a redirect to `target`, resolved against `origin`
/// when known.
pub fn redirect_location(origin: Option<&str>, target: &str, query: Option<&str>) -> String {
    let mut location = match origin {
        Some(origin) => format!("{}{target}", origin.trim_end_matches('/')),
        None => target.to_string(),
    };
    if let Some(q) = query.filter(|q| !q.is_empty()) {
        location.push('?');
        location.push_str(q);
    }
    location
}

/// Empty-bodied redirect. `None` if `location` is not a valid header value.
pub fn redirect(location: &str, status: StatusCode) -> Option<Response> {
    let value = HeaderValue::from_str(location).ok()?;
    let mut response = Response::new(Body::empty());
    *response.status_mut() = status;
    response.headers_mut().insert(LOCATION, value);
    Some(response)
}
