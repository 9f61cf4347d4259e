// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Per-site extraction rules

use scraper::Selector;

use super::prune::{compile_selectors, PrunedNode};
use super::ExtractionStrategy;

/// Floor most site rules apply before trusting a candidate
pub const DOMAIN_MIN_CHARS: usize = 500;

/// How a site's candidate node is turned into text
pub enum TextMode {
    /// Every text node on its own line
    Lines,
    /// One paragraph per matching content element
    ContentTags(Selector),
}

/// Site rule: ordered candidate selectors, a noise denylist and a floor
pub struct DomainStrategy {
    name: &'static str,
    candidates: Vec<Selector>,
    noise: Vec<Selector>,
    min_chars: usize,
    text_mode: TextMode,
}

impl DomainStrategy {
    pub fn new(name: &'static str, candidates: &[&str], noise: &[&str], min_chars: usize) -> Self {
        Self {
            name,
            candidates: compile_selectors(candidates),
            noise: compile_selectors(noise),
            min_chars,
            text_mode: TextMode::Lines,
        }
    }

    /// Read text block-by-block from the given content tags instead of line-by-line
    pub fn with_content_tags(mut self, tags: &str) -> Self {
        if let Some(selector) = compile_selectors(&[tags]).pop() {
            self.text_mode = TextMode::ContentTags(selector);
        }
        self
    }
}

impl ExtractionStrategy for DomainStrategy {
    fn name(&self) -> &'static str {
        self.name
    }

    fn candidate_selectors(&self) -> &[Selector] {
        &self.candidates
    }

    fn noise_selectors(&self) -> &[Selector] {
        &self.noise
    }

    fn min_chars(&self) -> usize {
        self.min_chars
    }

    fn candidate_text(&self, node: &PrunedNode) -> String {
        match &self.text_mode {
            TextMode::Lines => node.text_lines(),
            TextMode::ContentTags(tags) => node.text_of_tags(tags),
        }
    }
}

/// Built-in site rules as `(domain, strategy)` pairs
pub fn known_domains() -> Vec<(&'static str, DomainStrategy)> {
    vec![
        ("thehackernews.com", hackernews()),
        ("cio.com", cio()),
        ("csoonline.com", csoonline()),
        ("securityweek.com", securityweek()),
        ("krebsonsecurity.com", krebs()),
    ]
}

fn hackernews() -> DomainStrategy {
    DomainStrategy::new(
        "thehackernews",
        &["div.articlebody.clear.cf"],
        &["script", "style", "noscript"],
        100,
    )
    .with_content_tags("p, h1, h2, h3, h4, h5, h6, blockquote, li")
}

fn cio() -> DomainStrategy {
    DomainStrategy::new(
        "cio",
        &[
            "div.content-body",
            "div.article-content",
            "div.post-content",
            "div[data-module=\"ArticleBody\"]",
            "div.body-copy",
            "section.article-body",
            "div.entry-content",
            "article .content",
        ],
        &[
            "script", "style", "nav", "footer", "header", "aside", "form", "img", "figure",
            "figcaption", ".social-share", ".ad", ".comments", ".related-articles",
            ".newsletter-signup", ".author-info", ".tags", ".category-links", ".timestamp",
            ".byline", "blockquote.twitter-tweet",
        ],
        DOMAIN_MIN_CHARS,
    )
}

fn csoonline() -> DomainStrategy {
    DomainStrategy::new(
        "csoonline",
        &[
            "div[data-module=\"ArticleBody\"]",
            "div.article-body",
            "div.content-body",
            "section.article-content",
            "div.post-body",
        ],
        &[
            "script", "style", ".social-share", ".ad", ".newsletter", ".related", ".author-info",
            ".tags", ".category-links", ".timestamp", ".byline",
        ],
        DOMAIN_MIN_CHARS,
    )
}

fn securityweek() -> DomainStrategy {
    DomainStrategy::new(
        "securityweek",
        &["div.body-text", "div.article-body", "div.post-content", "section.content"],
        &["script", "style", ".social", ".ad", ".comments", ".tags", ".byline"],
        DOMAIN_MIN_CHARS,
    )
}

fn krebs() -> DomainStrategy {
    DomainStrategy::new(
        "krebsonsecurity",
        &["div.entry-content", "div.post-content", "article .content"],
        &[
            "script", "style", ".social", ".ad", ".comments", ".jp-relatedposts", ".sharedaddy",
            ".sd-social-icon", ".wpcnt",
        ],
        DOMAIN_MIN_CHARS,
    )
}
