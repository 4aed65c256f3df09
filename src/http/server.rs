//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the forwarding handler
//! - Wire up middleware (edge rules, timeout, concurrency, request ID, tracing)
//! - Bind server to listener
//! - Apply config reloads to the shared edge rules
//! - Forward pass-through requests to the upstream application

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{
        header::{self, HeaderName, HeaderValue},
        uri::Scheme,
        HeaderMap, Request, StatusCode, Uri, Version,
    },
    middleware,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::EdgeConfig;
use crate::http::middleware::edge::{self, edge_middleware, EdgeState, SharedEdge};
use crate::http::request::{request_id, EdgeRequestId, X_FORWARDED_PROTO};
use crate::lifecycle::shutdown;
use crate::observability::metrics;

const X_FORWARDED_FOR: &str = "x-forwarded-for";
const X_FORWARDED_HOST: &str = "x-forwarded-host";

/// Headers that describe one connection and must not be forwarded.
const HOP_BY_HOP: [HeaderName; 7] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    HeaderName::from_static("proxy-connection"),
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// State injected into the forwarding handler.
#[derive(Clone)]
pub struct AppState {
    pub client: Client<HttpConnector, Body>,
    pub upstream: Arc<str>,
}

/// HTTP server for the edge router.
pub struct HttpServer {
    router: Router,
    config: EdgeConfig,
    edge: SharedEdge,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: EdgeConfig) -> Self {
        let edge = edge::shared(config.site.clone());

        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        let state = AppState {
            client,
            upstream: Arc::from(config.upstream.address.as_str()),
        };

        let router = Self::build_router(&config, state, edge.clone());
        Self {
            router,
            config,
            edge,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &EdgeConfig, state: AppState, edge: SharedEdge) -> Router {
        Router::new()
            .route("/", any(forward_handler))
            .route("/{*path}", any(forward_handler))
            .with_state(state)
            .layer(middleware::from_fn_with_state(edge, edge_middleware))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(GlobalConcurrencyLimitLayer::new(config.listener.max_connections))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(EdgeRequestId))
    }

    /// The assembled router, for driving the server without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Handle to the live edge rules.
    pub fn edge(&self) -> SharedEdge {
        self.edge.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &EdgeConfig {
        &self.config
    }

    /// Run the server until `shutdown` fires, applying every config that
    /// arrives on `config_updates`.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<EdgeConfig>,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.address,
            production = self.config.site.production,
            rules = self.edge.load().router.rules().len(),
            "HTTP server starting"
        );

        let edge = self.edge.clone();
        // Only `[site]` ever changes here; the rest stays what the server runs.
        let mut current = self.config.clone();
        let mut stop = shutdown.resubscribe();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = stop.recv() => break,
                    update = config_updates.recv() => match update {
                        Some(next) => {
                            apply_update(&edge, &mut current, next);
                        }
                        None => break,
                    },
                }
            }
        });

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown::wait(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Whether `next` differs from `running` in a section that is only read
/// at startup.
pub fn restart_required(running: &EdgeConfig, next: &EdgeConfig) -> bool {
    running.listener != next.listener
        || running.upstream != next.upstream
        || running.timeouts != next.timeouts
        || running.observability != next.observability
}

/// Swap in the rules for `next` and record its `[site]` in `current`.
/// Returns whether the `[site]` section changed.
pub fn apply_update(edge: &SharedEdge, current: &mut EdgeConfig, next: EdgeConfig) -> bool {
    if restart_required(current, &next) {
        tracing::warn!("Listener, upstream, timeout and observability changes require a restart; applying [site] only");
    }
    if current.site == next.site {
        tracing::debug!("Config reloaded with unchanged [site] section");
        return false;
    }

    let state = EdgeState::from_site(next.site.clone());
    tracing::info!(
        production = next.site.production,
        rules = state.router.rules().len(),
        "Edge rules reloaded"
    );
    edge.store(Arc::new(state));
    current.site = next.site;
    true
}

/// Forward one request to the upstream application.
async fn forward_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let request_id = request_id(&request).to_string();
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);

    let (mut parts, body) = request.into_parts();
    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");

    let uri = match Uri::builder()
        .scheme(Scheme::HTTP)
        .authority(state.upstream.as_ref())
        .path_and_query(path_and_query)
        .build()
    {
        Ok(uri) => uri,
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Cannot build upstream URI");
            return (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response();
        }
    };

    tracing::debug!(
        request_id = %request_id,
        method = %parts.method,
        uri = %uri,
        "Forwarding request"
    );

    prepare_forward_headers(&mut parts.headers, peer);
    parts.uri = uri;
    parts.version = Version::HTTP_11;

    match state.client.request(Request::from_parts(parts, body)).await {
        Ok(response) => {
            metrics::record_upstream(response.status().as_u16(), start);
            let (parts, body): (_, hyper::body::Incoming) = response.into_parts();
            Response::from_parts(parts, Body::new(body))
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Upstream error");
            metrics::record_upstream(StatusCode::BAD_GATEWAY.as_u16(), start);
            (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
        }
    }
}

/// Strip hop-by-hop headers and add the `X-Forwarded-*` set.
fn prepare_forward_headers(headers: &mut HeaderMap, peer: Option<SocketAddr>) {
    for name in &HOP_BY_HOP {
        headers.remove(name);
    }

    if let Some(host) = headers.get(header::HOST).cloned() {
        headers.insert(X_FORWARDED_HOST, host);
    }
    if !headers.contains_key(X_FORWARDED_PROTO) {
        headers.insert(X_FORWARDED_PROTO, HeaderValue::from_static("http"));
    }
    if let Some(peer) = peer {
        let ip = peer.ip().to_string();
        let forwarded_for = match headers.get(X_FORWARDED_FOR).and_then(|v| v.to_str().ok()) {
            Some(existing) => format!("{existing}, {ip}"),
            None => ip,
        };
        if let Ok(value) = HeaderValue::from_str(&forwarded_for) {
            headers.insert(X_FORWARDED_FOR, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;

    #[test]
    fn test_forward_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("example.com"));
        headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.insert(X_FORWARDED_FOR, HeaderValue::from_static("203.0.113.7"));

        prepare_forward_headers(&mut headers, Some("10.0.0.2:5000".parse().unwrap()));

        assert!(headers.get(header::CONNECTION).is_none());
        assert_eq!(headers[X_FORWARDED_HOST], "example.com");
        assert_eq!(headers[X_FORWARDED_PROTO], "http");
        assert_eq!(headers[X_FORWARDED_FOR], "203.0.113.7, 10.0.0.2");
        assert_eq!(headers[header::HOST], "example.com");
    }

    #[test]
    fn test_forward_headers_keep_proto() {
        let mut headers = HeaderMap::new();
        headers.insert(X_FORWARDED_PROTO, HeaderValue::from_static("https"));
        prepare_forward_headers(&mut headers, None);
        assert_eq!(headers[X_FORWARDED_PROTO], "https");
        assert!(headers.get(X_FORWARDED_FOR).is_none());
    }

    #[test]
    fn test_apply_update_swaps_site_only_when_changed() {
        let mut current = EdgeConfig::default();
        let edge = edge::shared(current.site.clone());

        assert!(!apply_update(&edge, &mut current, EdgeConfig::default()));
        assert!(!edge.load().site.production);

        let mut next = EdgeConfig::default();
        next.site = SiteConfig {
            production: true,
            ..SiteConfig::default()
        };
        assert!(apply_update(&edge, &mut current, next));
        assert!(edge.load().site.production);
        assert!(current.site.production);
    }

    #[test]
    fn test_restart_only_sections_keep_running_values() {
        let mut current = EdgeConfig::default();
        let edge = edge::shared(current.site.clone());

        let mut moved = EdgeConfig::default();
        moved.upstream.address = "127.0.0.1:4000".into();
        moved.site.production = true;
        assert!(restart_required(&current, &moved));
        assert!(apply_update(&edge, &mut current, moved));

        assert_eq!(current.upstream.address, "127.0.0.1:3000");
        assert!(current.site.production);

        // Reverting the file matches what the server still runs.
        let mut reverted = EdgeConfig::default();
        reverted.site.production = true;
        assert!(!restart_required(&current, &reverted));

        let mut moved_again = reverted.clone();
        moved_again.upstream.address = "127.0.0.1:4000".into();
        assert!(restart_required(&current, &moved_again));
    }
}
