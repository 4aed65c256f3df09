//! Rule dispatch.
//!
//! # Responsibilities
//! - Evaluate the rule chain for one request, first match wins
//! - Produce the default pass-through headers when nothing redirects
//! - Follow redirect chains to prove they terminate
//!
//! # Design Decisions
//! - Pure: no I/O, no shared mutable state, safe to call concurrently
//! - Total: malformed paths reach the default outcome, never a panic
//! - Immutable after construction, swapped whole on config reload

use std::sync::OnceLock;

use axum::http::{Method, StatusCode};

use crate::config::SiteConfig;
use crate::routing::canonical::canonical_link;
use crate::routing::request::EdgeRequest;
use crate::routing::rules::{Action, RuleKind, RuleSet};
use crate::security::headers::{ResponseHeaders, LINK};

/// Upper bound on redirects followed by [`EdgeRouter::trace`].
pub const MAX_REDIRECT_HOPS: usize = 8;

/// Result of routing one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Answer immediately with a redirect.
    Redirect {
        location: String,
        status: StatusCode,
        rule: RuleKind,
    },
    /// Run the downstream handler and merge `headers` into its response.
    Continue { headers: ResponseHeaders },
}

impl Outcome {
    pub fn is_redirect(&self) -> bool {
        matches!(self, Outcome::Redirect { .. })
    }

    pub fn location(&self) -> Option<&str> {
        match self {
            Outcome::Redirect { location, .. } => Some(location),
            Outcome::Continue { .. } => None,
        }
    }

    pub fn headers(&self) -> Option<&ResponseHeaders> {
        match self {
            Outcome::Continue { headers } => Some(headers),
            Outcome::Redirect { .. } => None,
        }
    }
}

/// One followed redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hop {
    pub from: String,
    pub to: String,
    pub rule: RuleKind,
}

/// A redirect chain that revisits a path or never settles.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("redirect loop starting at `{start}` after {} hops", hops.len())]
pub struct RedirectLoop {
    pub start: String,
    pub hops: Vec<Hop>,
}

/// The edge request router.
#[derive(Debug, Default)]
pub struct EdgeRouter {
    rules: RuleSet,
}

impl EdgeRouter {
    pub fn new(rules: RuleSet) -> Self {
        Self { rules }
    }

    /// Compile the router for a site configuration.
    pub fn from_site(site: &SiteConfig) -> Self {
        Self::new(RuleSet::from_site(site))
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Route one request.
    pub fn route(&self, req: &EdgeRequest<'_>) -> Outcome {
        if req.is_well_formed() {
            for rule in self.rules.rules() {
                if let Some(Action::Redirect { target, status }) = rule.evaluate(req) {
                    return Outcome::Redirect {
                        location: target.resolve(req.path()),
                        status: *status,
                        rule: rule.kind(),
                    };
                }
            }
        }
        Outcome::Continue {
            headers: self.default_headers(req),
        }
    }

    fn default_headers(&self, req: &EdgeRequest<'_>) -> ResponseHeaders {
        let mut headers = ResponseHeaders::security();
        if !req.is_well_formed() || self.rules.is_link_exempt(req) {
            return headers;
        }
        if let Some(origin) = req.origin() {
            headers.insert(LINK, canonical_link(origin, req.path()));
        }
        headers
    }

    /// Follow redirects starting at `path` until a pass-through outcome.
    ///
    /// Returns the hops taken, or [`RedirectLoop`] if a path repeats or
    /// more than [`MAX_REDIRECT_HOPS`] redirects are needed.
    pub fn trace(&self, path: &str, method: &Method, is_production: bool) -> Result<Vec<Hop>, RedirectLoop> {
        let mut hops: Vec<Hop> = Vec::new();
        let mut current = path.to_string();

        loop {
            let req = EdgeRequest::new(&current, method, is_production);
            let (location, rule) = match self.route(&req) {
                Outcome::Continue { .. } => return Ok(hops),
                Outcome::Redirect { location, rule, .. } => (location, rule),
            };

            let revisits = location == current
                || location == path
                || hops.iter().any(|h| h.from == location);
            hops.push(Hop {
                from: current,
                to: location.clone(),
                rule,
            });
            if revisits || hops.len() > MAX_REDIRECT_HOPS {
                return Err(RedirectLoop {
                    start: path.to_string(),
                    hops,
                });
            }
            current = location;
        }
    }
}

/// Route with the default rule set.
pub fn route(path: &str, method: &Method, is_production: bool, origin: Option<&str>) -> Outcome {
    static DEFAULT: OnceLock<EdgeRouter> = OnceLock::new();
    let router = DEFAULT.get_or_init(EdgeRouter::default);

    let req = EdgeRequest::new(path, method, is_production);
    match origin {
        Some(o) => router.route(&req.with_origin(o)),
        None => router.route(&req),
    }
}
