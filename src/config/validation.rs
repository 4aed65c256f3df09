//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses, origin and rule paths
//! - Reject rule sets whose redirects loop
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: EdgeConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::{HeaderValue, Method, Uri};
use thiserror::Error;
use tokio::sync::Semaphore;
use url::Url;

use crate::config::schema::{EdgeConfig, SiteConfig};
use crate::routing::EdgeRouter;

/// One failed semantic check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address `{0}` is not a socket address")]
    BindAddress(String),

    #[error("listener.max_connections must be greater than zero")]
    MaxConnections,

    #[error("listener.max_connections `{0}` exceeds the limit of {max}", max = Semaphore::MAX_PERMITS)]
    MaxConnectionsTooLarge(usize),

    #[error("upstream.address `{0}` is not a host:port pair")]
    UpstreamAddress(String),

    #[error("site.origin `{0}` must be an http(s) URL without path, query or fragment")]
    Origin(String),

    #[error("{field} entry `{value}` must start with `/`")]
    RulePath { field: &'static str, value: String },

    #[error("{field} entry `{value:?}` contains characters not allowed in a header value")]
    RulePathCharacters { field: &'static str, value: String },

    #[error("{field} entry must not be empty")]
    EmptyRulePath { field: &'static str },

    #[error("redirect loop: {0}")]
    RedirectLoop(String),

    #[error("timeouts.request_secs must be greater than zero")]
    RequestTimeout,

    #[error("observability.metrics_address `{0}` is not a socket address")]
    MetricsAddress(String),
}

/// Validate every section, collecting all failures.
pub fn validate_config(config: &EdgeConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }
    if config.listener.max_connections == 0 {
        errors.push(ValidationError::MaxConnections);
    } else if config.listener.max_connections > Semaphore::MAX_PERMITS {
        errors.push(ValidationError::MaxConnectionsTooLarge(
            config.listener.max_connections,
        ));
    }
    if !is_authority_with_port(&config.upstream.address) {
        errors.push(ValidationError::UpstreamAddress(config.upstream.address.clone()));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::RequestTimeout);
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    errors.extend(validate_site(&config.site));

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Checks for the `[site]` section alone. Also run before a hot reload.
pub fn validate_site(site: &SiteConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if let Some(origin) = &site.origin {
        if normalize_origin(origin).is_none() {
            errors.push(ValidationError::Origin(origin.clone()));
        }
    }

    let path_lists: [(&'static str, Vec<&str>); 4] = [
        ("site.aliases", site.aliases.iter().flat_map(|a| [a.from.as_str(), a.to.as_str()]).collect()),
        ("site.passthrough_prefixes", site.passthrough_prefixes.iter().map(String::as_str).collect()),
        ("site.blocked_prefixes", site.blocked_prefixes.iter().map(String::as_str).collect()),
        ("site.blocked_paths", site.blocked_paths.iter().map(String::as_str).collect()),
    ];
    for (field, values) in path_lists {
        for value in values {
            check_rule_path(field, value, &mut errors);
        }
    }
    check_rule_path("site.blocked_redirect", &site.blocked_redirect, &mut errors);

    // Loop checks only make sense once every path is well formed.
    if errors.is_empty() {
        let router = EdgeRouter::from_site(site);
        let starts = site
            .aliases
            .iter()
            .flat_map(|a| [a.from.as_str(), a.to.as_str()])
            .chain(site.blocked_paths.iter().map(String::as_str))
            .chain(site.blocked_prefixes.iter().map(String::as_str))
            .chain(std::iter::once(site.blocked_redirect.as_str()));
        for start in starts {
            for production in [false, true] {
                if let Err(e) = router.trace(start, &Method::GET, production) {
                    let err = ValidationError::RedirectLoop(e.to_string());
                    if !errors.contains(&err) {
                        errors.push(err);
                    }
                }
            }
        }
    }

    errors
}

/// Reduce an origin to `scheme://host[:port]`. `None` if it is not an
/// http(s) URL or carries a path, query or fragment.
pub fn normalize_origin(origin: &str) -> Option<String> {
    let url = Url::parse(origin).ok()?;
    if !matches!(url.scheme(), "http" | "https") || !url.has_host() {
        return None;
    }
    if url.path() != "/" || url.query().is_some() || url.fragment().is_some() {
        return None;
    }
    Some(url.origin().ascii_serialization())
}

fn check_rule_path(field: &'static str, value: &str, errors: &mut Vec<ValidationError>) {
    if value.is_empty() {
        errors.push(ValidationError::EmptyRulePath { field });
    } else if !value.starts_with('/') {
        errors.push(ValidationError::RulePath {
            field,
            value: value.to_string(),
        });
    } else if HeaderValue::from_str(value).is_err() {
        // Redirect targets end up in `Location`.
        errors.push(ValidationError::RulePathCharacters {
            field,
            value: value.to_string(),
        });
    }
}

fn is_authority_with_port(address: &str) -> bool {
    match address.parse::<Uri>() {
        Ok(uri) => {
            uri.scheme().is_none()
                && uri.path_and_query().is_none()
                && uri
                    .authority()
                    .map(|a| a.as_str() == address && a.port_u16().is_some())
                    .unwrap_or(false)
        }
        Err(_) => false,
    }
}
