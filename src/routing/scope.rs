//! Which requests the edge router sees at all.
//!
//! Static assets and API traffic skip the router entirely and reach the
//! downstream service without any header mutation. Tests are literal, like
//! the rules: `/publications` is outside the scope because it starts with
//! `/public`.

use axum::http::Method;

use crate::routing::matcher::{Any, Matcher, PathContains};
use crate::routing::request::EdgeRequest;

const EXCLUDED_PREFIXES: [&str; 5] = ["/api", "/_next/static", "/_next/image", "/favicon.ico", "/public"];

/// Outer path filter applied before the rule chain.
#[derive(Debug)]
pub struct InvocationScope {
    excluded: Any,
}

impl InvocationScope {
    pub fn new(excluded_prefixes: &[&str], skip_dotted: bool) -> Self {
        let mut matchers: Vec<Box<dyn Matcher>> = vec![Box::new(Any::prefixes(excluded_prefixes))];
        if skip_dotted {
            matchers.push(Box::new(PathContains::new(".")));
        }
        Self {
            excluded: Any::new(matchers),
        }
    }

    /// Whether the router runs for `path`.
    pub fn covers(&self, path: &str) -> bool {
        let req = EdgeRequest::new(path, &Method::GET, false);
        !self.excluded.matches(&req)
    }
}

impl Default for InvocationScope {
    fn default() -> Self {
        Self::new(&EXCLUDED_PREFIXES, true)
    }
}
