// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Forced heavy fetches and the borrowed browser session

use std::time::{Duration, Instant};

use pulse_scraper::content::{BrowserError, Dispatcher, FetchError, FetchRequest, ScrapeConfig};
use tokio_test::{assert_err, assert_ok};

use super::support::{article_page, fast_config, init_tracing, ok, ScriptedSession, ScriptedTransport};

#[tokio::test]
async fn test_heavy_domain_without_session_fails_with_zero_network_calls() {
    init_tracing();
    let config = fast_config();
    let url = "https://www.securityweek.com/new-ransomware-strain/";
    assert!(config.requires_heavy(url));

    let transport = ScriptedTransport::new(vec![ok(article_page(6))]);
    let dispatcher = Dispatcher::new(config.clone(), transport.clone()).unwrap();

    let request = FetchRequest::new(url)
        .unwrap()
        .force_heavy(config.requires_heavy(url));
    let report = dispatcher.fetch_with_report(request).await;

    let err = assert_err!(report.result);
    assert_eq!(
        err,
        FetchError::SessionUnavailable {
            url: url.to_string()
        }
    );
    assert_eq!(transport.calls(), 0);
    assert!(report.attempts.is_empty());
}

#[tokio::test]
async fn test_forced_heavy_uses_session_once_and_skips_http() {
    init_tracing();
    let transport = ScriptedTransport::new(vec![]);
    let dispatcher = Dispatcher::new(fast_config(), transport.clone()).unwrap();
    let mut session = ScriptedSession::rendering(article_page(7));

    let text = assert_ok!(
        dispatcher
            .fetch_url("https://www.cisa.gov/news/advisory", true, Some(&mut session))
            .await
    );

    assert!(text.raw.contains("Paragraph 6"));
    assert_eq!(transport.calls(), 0);
    assert_eq!(session.navigations.len(), 1);
    assert_eq!(session.source_reads, 1);
}

#[tokio::test]
async fn test_session_can_be_reused_by_sequential_fetches() {
    init_tracing();
    let transport = ScriptedTransport::new(vec![]);
    let dispatcher = Dispatcher::new(fast_config(), transport).unwrap();
    let mut session = ScriptedSession::rendering(article_page(6));

    for path in ["a", "b"] {
        let url = format!("https://darkreading.com/{}", path);
        let request = FetchRequest::new(&url)
            .unwrap()
            .force_heavy(true)
            .with_session(&mut session);
        assert_ok!(dispatcher.fetch(request).await);
    }

    assert_eq!(
        session.navigations,
        vec![
            "https://darkreading.com/a".to_string(),
            "https://darkreading.com/b".to_string()
        ]
    );
}

#[tokio::test]
async fn test_stalled_browser_does_not_outlive_heavy_timeout() {
    init_tracing();
    let config = ScrapeConfig {
        heavy_timeout_secs: 1,
        ..fast_config()
    };
    let transport = ScriptedTransport::new(vec![]);
    let dispatcher = Dispatcher::new(config, transport).unwrap();
    let mut session = ScriptedSession::rendering(article_page(6));
    session.stall_visibility = true;

    let started = Instant::now();
    let result = tokio::time::timeout(
        Duration::from_secs(5),
        dispatcher.fetch_url("https://example.com/stuck", true, Some(&mut session)),
    )
    .await
    .expect("fetch stays bounded by the heavy timeout");

    assert_ok!(result);
    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(session.source_reads, 1);
}

#[tokio::test]
async fn test_navigation_timeout_maps_to_timeout() {
    init_tracing();
    let transport = ScriptedTransport::new(vec![]);
    let dispatcher = Dispatcher::new(fast_config(), transport).unwrap();
    let mut session = ScriptedSession::failing(BrowserError::Timeout);

    let err = assert_err!(
        dispatcher
            .fetch_url("https://example.com/slow", true, Some(&mut session))
            .await
    );
    assert!(matches!(err, FetchError::Timeout { .. }));
    assert_eq!(session.source_reads, 0);
}

#[tokio::test]
async fn test_closed_session_reports_browser_error() {
    init_tracing();
    let transport = ScriptedTransport::new(vec![]);
    let dispatcher = Dispatcher::new(fast_config(), transport).unwrap();
    let mut session = ScriptedSession::failing(BrowserError::Closed);

    let err = assert_err!(
        dispatcher
            .fetch_url("https://example.com/story", true, Some(&mut session))
            .await
    );
    assert!(matches!(err, FetchError::Browser { .. }));
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_invalid_url_is_rejected_before_any_work() {
    let transport = ScriptedTransport::new(vec![]);
    let dispatcher = Dispatcher::new(fast_config(), transport.clone()).unwrap();

    let err = assert_err!(dispatcher.fetch_url("ftp://example.com/file", false, None).await);
    assert!(matches!(err, FetchError::InvalidUrl { .. }));
    assert!(!err.is_transient());
    assert_eq!(transport.calls(), 0);

    assert!(FetchRequest::new("not a url").is_err());
}

#[test]
fn test_heavy_domain_hint() {
    let config = ScrapeConfig::default();
    assert!(config.requires_heavy("https://darkreading.com/story"));
    assert!(config.requires_heavy("https://www.cisa.gov/alerts"));
    assert!(!config.requires_heavy("https://krebsonsecurity.com/2024/01/post/"));
    assert!(!config.requires_heavy("https://notcisa.gov/"));
}
