//! End-to-end tests: real listener, real upstream, redirects not followed.

use std::time::Duration;

use edge_router::config::{EdgeConfig, SiteConfig};

mod common;

fn config_for(upstream: std::net::SocketAddr, site: SiteConfig) -> EdgeConfig {
    let mut config = EdgeConfig::default();
    config.upstream.address = upstream.to_string();
    config.site = site;
    config
}

fn example_site() -> SiteConfig {
    SiteConfig {
        origin: Some("https://example.com".into()),
        ..SiteConfig::default()
    }
}

#[tokio::test]
async fn test_trailing_slash_redirect() {
    let upstream = common::start_mock_upstream().await;
    let edge = common::start_edge(config_for(upstream, example_site())).await;

    let res = common::client()
        .get(format!("http://{}/pricing", edge.addr))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 301);
    assert_eq!(res.headers()["location"], "https://example.com/pricing/");
    assert!(res.headers().get("x-request-id").is_some());
    assert!(res.text().await.unwrap().is_empty());
    edge.shutdown.trigger();
}

#[tokio::test]
async fn test_alias_redirect_drops_query() {
    let upstream = common::start_mock_upstream().await;
    let edge = common::start_edge(config_for(upstream, example_site())).await;

    let res = common::client()
        .get(format!("http://{}/home?ref=nav", edge.addr))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 301);
    assert_eq!(res.headers()["location"], "https://example.com/");
    edge.shutdown.trigger();
}

#[tokio::test]
async fn test_pass_through_merges_edge_headers() {
    let upstream = common::start_mock_upstream().await;
    let edge = common::start_edge(config_for(upstream, example_site())).await;

    let res = common::client()
        .get(format!("http://{}/pricing/", edge.addr))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    let headers = res.headers().clone();
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["x-frame-options"], "DENY");
    assert_eq!(headers.get_all("x-frame-options").iter().count(), 1);
    assert_eq!(headers["x-xss-protection"], "1; mode=block");
    assert_eq!(headers["referrer-policy"], "strict-origin-when-cross-origin");
    assert_eq!(headers["link"], "<https://example.com/pricing>; rel=\"canonical\"");
    assert_eq!(headers["x-echo-forwarded-host"], edge.addr.to_string().as_str());
    assert_eq!(res.text().await.unwrap(), "page:/pricing/");
    edge.shutdown.trigger();
}

#[tokio::test]
async fn test_out_of_scope_is_untouched() {
    let upstream = common::start_mock_upstream().await;
    let edge = common::start_edge(config_for(upstream, example_site())).await;
    let client = common::client();

    for path in ["/api/keywords", "/_next/static/chunk.js", "/favicon.ico", "/robots.txt"] {
        let res = client
            .get(format!("http://{}{path}", edge.addr))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 200, "path {path}");
        assert_eq!(res.headers()["x-frame-options"], "SAMEORIGIN", "path {path}");
        assert!(res.headers().get("link").is_none(), "path {path}");
        assert_eq!(res.text().await.unwrap(), format!("page:{path}"));
    }
    edge.shutdown.trigger();
}

#[tokio::test]
async fn test_production_blocks_test_routes() {
    let upstream = common::start_mock_upstream().await;
    let site = SiteConfig {
        production: true,
        ..example_site()
    };
    let edge = common::start_edge(config_for(upstream, site)).await;
    let client = common::client();

    let res = client
        .get(format!("http://{}/test-checkout/", edge.addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 301);
    assert_eq!(res.headers()["location"], "https://example.com/");

    let res = client
        .get(format!("http://{}/checkout/", edge.addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    edge.shutdown.trigger();
}

#[tokio::test]
async fn test_origin_derived_from_request() {
    let upstream = common::start_mock_upstream().await;
    let edge = common::start_edge(config_for(upstream, SiteConfig::default())).await;
    let client = common::client();

    let res = client
        .get(format!("http://{}/about/", edge.addr))
        .send()
        .await
        .unwrap();
    assert_eq!(
        res.headers()["link"],
        format!("<http://{}/about>; rel=\"canonical\"", edge.addr).as_str()
    );

    let res = client
        .get(format!("http://{}/about", edge.addr))
        .header("x-forwarded-proto", "https")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 301);
    assert_eq!(
        res.headers()["location"],
        format!("https://{}/about/", edge.addr).as_str()
    );
    edge.shutdown.trigger();
}

#[tokio::test]
async fn test_upstream_down_returns_bad_gateway() {
    let unused = {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };
    let edge = common::start_edge(config_for(unused, example_site())).await;
    let client = common::client();

    let res = client
        .get(format!("http://{}/about/", edge.addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 502);
    assert_eq!(res.text().await.unwrap(), "Upstream request failed");

    // Redirects never reach the upstream.
    let res = client
        .get(format!("http://{}/about", edge.addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 301);
    edge.shutdown.trigger();
}

#[tokio::test]
async fn test_reload_applies_new_site_rules() {
    let upstream = common::start_mock_upstream().await;
    let config = config_for(upstream, example_site());
    let edge = common::start_edge(config.clone()).await;
    let client = common::client();

    let res = client
        .get(format!("http://{}/test-page/", edge.addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);

    let mut next = config;
    next.site.production = true;
    next.site.aliases.clear();
    edge.updates.send(next).unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    let res = client
        .get(format!("http://{}/test-page/", edge.addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 301);

    let res = client
        .get(format!("http://{}/home", edge.addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.headers()["location"], "https://example.com/home/");
    edge.shutdown.trigger();
}
