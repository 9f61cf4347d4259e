// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Strategy selection and cleaning over realistic markup

use pulse_scraper::content::parser::parse_markup;
use pulse_scraper::content::pipeline::{extract_from_markup, MarkupOutcome};
use pulse_scraper::content::strategy::StrategySet;

fn long_paragraphs(prefix: &str, count: usize) -> String {
    (0..count)
        .map(|i| {
            format!(
                "<p>{} paragraph {} describes the vulnerability, the affected versions and the patch timeline.</p>",
                prefix, i
            )
        })
        .collect()
}

#[test]
fn test_article_with_scripts_and_cookie_banner() {
    let markup = format!(
        "<html><body>\
         <article>\
           <script>window.dataLayer = window.dataLayer || [];</script>\
           {}\
           <script>trackPageView('article');</script>\
           <div class='cookie-banner'><p>We use cookies to improve your experience. Accept all cookies?</p></div>\
           <script src='/ads.js'></script>\
         </article>\
         </body></html>",
        long_paragraphs("Security", 3)
    );

    let document = parse_markup(&markup, "https://example.org/a").unwrap();
    let set = StrategySet::new();
    let extraction = set.extract("example.org", &document.html).unwrap();

    assert_eq!(extraction.strategy, "general");
    assert!(extraction.text.chars().count() > 200);
    assert!(extraction.text.contains("Security paragraph 2"));
    assert!(!extraction.text.contains("dataLayer"));
    assert!(!extraction.text.contains("trackPageView"));
    assert!(!extraction.text.contains("cookies"));
}

#[test]
fn test_domain_rule_preferred_when_it_clears_its_floor() {
    let markup = format!(
        "<html><body>\
         <div class='main-content'>{}</div>\
         <article class='post'><div class='entry-content'>{}</div><div class='sharing'>Share this</div></article>\
         </body></html>",
        long_paragraphs("Sidebar", 3),
        long_paragraphs("Krebs", 6)
    );

    let outcome = extract_from_markup(
        &StrategySet::new(),
        &markup,
        "krebsonsecurity.com",
        "https://krebsonsecurity.com/2024/05/story/",
        100,
    );

    match outcome {
        MarkupOutcome::Accepted { text, strategy } => {
            assert_eq!(strategy, "krebsonsecurity");
            assert!(text.raw.contains("Krebs paragraph 5"));
            assert!(!text.raw.contains("Sidebar"));
            assert!(!text.raw.contains("Share this"));
        }
        other => panic!("expected accepted text, got {:?}", other),
    }
}

#[test]
fn test_domain_rule_hands_over_to_general_when_thin() {
    let markup = format!(
        "<html><body><div class='entry-content'><p>Teaser only.</p></div><main>{}</main></body></html>",
        long_paragraphs("Main", 4)
    );

    let outcome = extract_from_markup(
        &StrategySet::new(),
        &markup,
        "krebsonsecurity.com",
        "https://krebsonsecurity.com/2024/05/thin/",
        100,
    );

    match outcome {
        MarkupOutcome::Accepted { text, strategy } => {
            assert_eq!(strategy, "general");
            assert!(text.raw.contains("Main paragraph 3"));
        }
        other => panic!("expected general fallback, got {:?}", other),
    }
}

#[test]
fn test_subdomain_uses_registered_rule() {
    let set = StrategySet::new();
    assert!(set.lookup("www.securityweek.com").is_some());
    assert!(set.lookup("securityweek.com").is_some());
    assert!(set.lookup("example.com").is_none());
}

#[test]
fn test_short_page_is_never_accepted() {
    let outcome = extract_from_markup(
        &StrategySet::new(),
        "<html><body><article><p>Breaking: details to follow.</p></article></body></html>",
        "example.com",
        "https://example.com/breaking",
        100,
    );
    assert!(matches!(outcome, MarkupOutcome::TooShort { .. }));
}
