//! Request descriptor consulted by the edge rules.
//!
//! Only the path, method, deployment mode and origin are visible to the
//! rule chain. Headers and body never reach the router.

use axum::http::Method;

/// Immutable view of one inbound request.
#[derive(Debug, Clone, Copy)]
pub struct EdgeRequest<'a> {
    path: &'a str,
    method: &'a Method,
    is_production: bool,
    origin: Option<&'a str>,
}

impl<'a> EdgeRequest<'a> {
    pub fn new(path: &'a str, method: &'a Method, is_production: bool) -> Self {
        Self {
            path,
            method,
            is_production,
            origin: None,
        }
    }

    /// Attach the `scheme://host[:port]` the request was addressed to.
    pub fn with_origin(mut self, origin: &'a str) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn path(&self) -> &'a str {
        self.path
    }

    pub fn method(&self) -> &'a Method {
        self.method
    }

    pub fn is_production(&self) -> bool {
        self.is_production
    }

    pub fn origin(&self) -> Option<&'a str> {
        self.origin
    }

    /// A path the rules can reason about. Anything else falls through to
    /// the default outcome untouched.
    pub fn is_well_formed(&self) -> bool {
        self.path.starts_with('/')
    }
}
