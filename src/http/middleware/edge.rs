//! Edge routing middleware.
//!
//! Runs the rule chain in front of every in-scope request: a redirect
//! answers immediately, a pass-through runs the downstream service and
//! merges the edge headers into its response.

use std::sync::Arc;

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::config::SiteConfig;
use crate::http::request::{request_id, request_origin};
use crate::http::response::{redirect, redirect_location};
use crate::observability::metrics;
use crate::routing::{EdgeRequest, EdgeRouter, InvocationScope, Outcome};

/// Everything the middleware needs, compiled from one `[site]` section.
#[derive(Debug)]
pub struct EdgeState {
    pub router: EdgeRouter,
    pub scope: InvocationScope,
    pub site: SiteConfig,
}

impl EdgeState {
    pub fn from_site(site: SiteConfig) -> Self {
        Self {
            router: EdgeRouter::from_site(&site),
            scope: InvocationScope::default(),
            site,
        }
    }
}

/// Rules shared by all connections, replaced whole on reload.
pub type SharedEdge = Arc<ArcSwap<EdgeState>>;

pub fn shared(site: SiteConfig) -> SharedEdge {
    Arc::new(ArcSwap::from_pointee(EdgeState::from_site(site)))
}

pub async fn edge_middleware(
    State(edge): State<SharedEdge>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let state = edge.load_full();
    let path = req.uri().path().to_owned();

    if !state.scope.covers(&path) {
        metrics::record_out_of_scope();
        return next.run(req).await;
    }

    let method = req.method().clone();
    let origin = request_origin(&req, state.site.origin.as_deref());
    let mut edge_req = EdgeRequest::new(&path, &method, state.site.production);
    if let Some(origin) = origin.as_deref() {
        edge_req = edge_req.with_origin(origin);
    }

    let outcome = state.router.route(&edge_req);
    metrics::record_outcome(&outcome);

    match outcome {
        Outcome::Redirect {
            location,
            status,
            rule,
        } => {
            let query = if state.site.preserve_query {
                req.uri().query()
            } else {
                None
            };
            let target = redirect_location(origin.as_deref(), &location, query);
            if let Some(response) = redirect(&target, status) {
                tracing::debug!(
                    request_id = %request_id(&req),
                    method = %method,
                    path = %path,
                    rule = %rule,
                    location = %target,
                    "Edge redirect"
                );
                return response;
            }

            tracing::warn!(
                request_id = %request_id(&req),
                path = %path,
                rule = %rule,
                "Redirect target is not a valid Location header, passing through"
            );
            metrics::record_unencodable_redirect(rule);
            next.run(req).await
        }
        Outcome::Continue { headers } => {
            let mut response = next.run(req).await;
            let skipped = headers.apply_to(response.headers_mut());
            if skipped > 0 {
                tracing::debug!(path = %path, skipped, "Edge headers skipped");
            }
            response
        }
    }
}
