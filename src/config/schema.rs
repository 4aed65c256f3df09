//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the edge
//! router. All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the edge router.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct EdgeConfig {
    /// Listener configuration (bind address, concurrency).
    pub listener: ListenerConfig,

    /// Site rules: aliases, canonicalization, blocked routes.
    pub site: SiteConfig,

    /// Application server that pass-through requests are forwarded to.
    pub upstream: UpstreamConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum requests in flight (backpressure).
    pub max_connections: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_connections: 10_000,
        }
    }
}

/// A permanent redirect from a retired path.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct AliasConfig {
    pub from: String,
    pub to: String,
}

/// Edge rule configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SiteConfig {
    /// Public origin (e.g., "https://example.com"). Derived from the
    /// request when unset.
    pub origin: Option<String>,

    /// Production deployment. Enables blocked-route redirects.
    pub production: bool,

    /// Keep the query string on redirect `Location` values.
    pub preserve_query: bool,

    /// Legacy path aliases, checked first and in order.
    pub aliases: Vec<AliasConfig>,

    /// Append `/` to page paths.
    pub trailing_slash: bool,

    /// Prefixes exempt from trailing-slash redirects and the canonical link.
    pub passthrough_prefixes: Vec<String>,

    /// Prefixes redirected away in production.
    pub blocked_prefixes: Vec<String>,

    /// Exact paths redirected away in production.
    pub blocked_paths: Vec<String>,

    /// Where blocked routes redirect to.
    pub blocked_redirect: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            origin: None,
            production: false,
            preserve_query: false,
            aliases: vec![AliasConfig {
                from: "/home".to_string(),
                to: "/".to_string(),
            }],
            trailing_slash: true,
            passthrough_prefixes: vec!["/api".to_string(), "/_next".to_string()],
            blocked_prefixes: vec!["/test-".to_string()],
            blocked_paths: vec!["/template-test".to_string()],
            blocked_redirect: "/".to_string(),
        }
    }
}

/// Upstream application server.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Upstream address (e.g., "127.0.0.1:3000").
    pub address: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:3000".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
