//! Rule-chain properties checked over a sweep of request paths.

use axum::http::{Method, StatusCode};
use edge_router::config::SiteConfig;
use edge_router::routing::{route, EdgeRequest, EdgeRouter, Outcome, RuleKind};

const ORIGIN: &str = "https://example.com";

fn sample_paths() -> Vec<String> {
    let segments = ["", "about", "home", "test-", "test-a", "template-test", "api", "_next", "blog.xml", "a b"];
    let mut paths = vec!["/".to_string(), "//".to_string()];
    for first in segments {
        paths.push(format!("/{first}"));
        paths.push(format!("/{first}/"));
        for second in segments {
            paths.push(format!("/{first}/{second}"));
            paths.push(format!("/{first}/{second}/"));
        }
    }
    paths
}

#[test]
fn test_every_outcome_is_well_formed() {
    for production in [false, true] {
        for path in sample_paths() {
            match route(&path, &Method::GET, production, Some(ORIGIN)) {
                Outcome::Redirect { location, status, .. } => {
                    assert_eq!(status, StatusCode::MOVED_PERMANENTLY, "path {path}");
                    assert!(location.starts_with('/'), "path {path} -> {location}");
                    assert_ne!(location, path, "self redirect at {path}");
                }
                Outcome::Continue { headers } => {
                    assert_eq!(headers.get("x-content-type-options"), Some("nosniff"));
                    assert_eq!(headers.get("x-frame-options"), Some("DENY"));
                    assert_eq!(headers.get("x-xss-protection"), Some("1; mode=block"));
                    assert_eq!(
                        headers.get("referrer-policy"),
                        Some("strict-origin-when-cross-origin")
                    );
                }
            }
        }
    }
}

#[test]
fn test_every_chain_terminates() {
    let router = EdgeRouter::default();
    for production in [false, true] {
        for path in sample_paths() {
            let hops = router
                .trace(&path, &Method::GET, production)
                .unwrap_or_else(|e| panic!("{e}"));
            assert!(hops.len() <= 2, "path {path} took {} hops", hops.len());
        }
    }
}

#[test]
fn test_development_never_blocks() {
    for path in sample_paths() {
        if let Outcome::Redirect { rule, .. } = route(&path, &Method::GET, false, None) {
            assert_ne!(rule, RuleKind::BlockedRoute, "path {path}");
        }
    }
}

#[test]
fn test_link_matches_request_path() {
    let router = EdgeRouter::default();
    let cases = [
        ("/", "https://example.com/"),
        ("/about/", "https://example.com/about"),
        ("/blog/post/", "https://example.com/blog/post"),
        ("/feed.xml", "https://example.com/feed.xml"),
    ];
    for (path, canonical) in cases {
        let req = EdgeRequest::new(path, &Method::GET, false).with_origin(ORIGIN);
        let outcome = router.route(&req);
        let link = outcome.headers().and_then(|h| h.get("link"));
        assert_eq!(link, Some(format!("<{canonical}>; rel=\"canonical\"").as_str()), "path {path}");
    }
}

#[test]
fn test_custom_site_rules() {
    let site = SiteConfig {
        aliases: vec![edge_router::config::AliasConfig {
            from: "/old-pricing".into(),
            to: "/pricing/".into(),
        }],
        blocked_prefixes: vec!["/internal".into()],
        blocked_paths: vec![],
        ..SiteConfig::default()
    };
    let router = EdgeRouter::from_site(&site);

    let hops = router.trace("/old-pricing", &Method::GET, false).unwrap();
    assert_eq!(hops.len(), 1);
    assert_eq!(hops[0].to, "/pricing/");
    assert_eq!(hops[0].rule, RuleKind::LegacyAlias);

    let hops = router.trace("/internal/tools/", &Method::GET, true).unwrap();
    assert_eq!(hops.last().unwrap().to, "/");

    let req = EdgeRequest::new("/test-a/", &Method::GET, true);
    assert!(!router.route(&req).is_redirect());
}
