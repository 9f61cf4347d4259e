// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Fallback extraction for sites without a dedicated rule
//!
//! Tries semantic containers, then `<article>`, then class/id pattern
//! matches and finally `<body>`. If no container clears the floor after
//! line filtering, every substantial `<p>` on the page is joined instead.

use std::sync::OnceLock;

use regex::Regex;
use scraper::{Html, Selector};
use tracing::debug;

use super::prune::{char_count, collapse_inline, compile_selectors};
use super::ExtractionStrategy;
use crate::content::normalize::{cached_regex, normalize};

/// A container's pruned text must exceed this before line filtering
pub const GENERAL_CANDIDATE_MIN_CHARS: usize = 200;
/// Filtered, normalized text must exceed this to be accepted
pub const GENERAL_MIN_CHARS: usize = 200;
/// Joined paragraphs must exceed this
pub const PARAGRAPH_JOIN_MIN_CHARS: usize = 300;
/// Paragraphs at or under this length are skipped when joining
pub const PARAGRAPH_MIN_CHARS: usize = 20;

const CONTENT_SELECTORS: &[&str] = &[
    "div.article-body",
    "div.body-content",
    "div.article-content",
    "div.entry-content",
    "div.td-post-content",
    "main.content",
    "div[itemprop=\"articleBody\"]",
    "article",
    ".post-content",
    "div[class*=\"content\"]",
    "div[id*=\"content\"]",
    "body",
];

const NOISE_SELECTORS: &[&str] = &[
    "script", "style", "noscript", "nav", "footer", "header", "aside", "form", "img", "figure",
    "figcaption", "svg", "iframe", "embed", "object",
    ".social-share", ".social", ".ad", ".ads", ".advertisement",
    ".comments", ".comment", ".related", ".sidebar", ".widget",
    ".newsletter", ".signup", ".subscribe", ".promo", ".promotion",
    ".breadcrumb", ".navigation", ".nav", ".menu", ".share",
    "[class*=\"ad\"]", "[id*=\"ad\"]", ".dropcap",
    ".meta", ".post-meta", ".article-meta",
    ".author-box", ".tags-list", ".category-list",
    ".entry-header", ".post-header",
    ".jp-relatedposts", ".sharedaddy", ".sd-social-icon",
    "[class*=\"cookie\"]", "[id*=\"cookie\"]", "[class*=\"consent\"]",
    "a[href*=\"mailto:\"]", "a[href*=\"tel:\"]",
];

fn date_only_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    cached_regex(
        &RE,
        r"(?i)^\W*(\d{1,2}\s+(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\s+\d{4}|\d{4}-\d{2}-\d{2})\W*$",
    )
}

fn nav_label_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    cached_regex(
        &RE,
        r"(?i)^(home|news|about|contact|share|subscribe|follow|tags?|categories)\b",
    )
}

fn engagement_count_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    cached_regex(&RE, r"(?i)^\d+\s+(comments?|shares?|likes?)")
}

fn month_lead_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    cached_regex(
        &RE,
        r"^(January|February|March|April|May|June|July|August|September|October|November|December)\b",
    )
}

/// Heuristic extraction for any page
pub struct GeneralStrategy {
    candidates: Vec<Selector>,
    noise: Vec<Selector>,
    paragraphs: Option<Selector>,
}

impl GeneralStrategy {
    pub fn new() -> Self {
        Self {
            candidates: compile_selectors(CONTENT_SELECTORS),
            noise: compile_selectors(NOISE_SELECTORS),
            paragraphs: Selector::parse("p").ok(),
        }
    }

    /// Join every paragraph longer than [`PARAGRAPH_MIN_CHARS`]
    fn join_paragraphs(&self, document: &Html) -> Option<String> {
        let selector = self.paragraphs.as_ref()?;
        let joined = document
            .select(selector)
            .map(|p| collapse_inline(p.text()))
            .filter(|text| char_count(text) > PARAGRAPH_MIN_CHARS)
            .collect::<Vec<_>>()
            .join("\n\n");

        if char_count(&joined) > PARAGRAPH_JOIN_MIN_CHARS {
            normalize(&joined)
        } else {
            None
        }
    }
}

impl Default for GeneralStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractionStrategy for GeneralStrategy {
    fn name(&self) -> &'static str {
        "general"
    }

    fn candidate_selectors(&self) -> &[Selector] {
        &self.candidates
    }

    fn noise_selectors(&self) -> &[Selector] {
        &self.noise
    }

    fn min_chars(&self) -> usize {
        GENERAL_MIN_CHARS
    }

    fn extract(&self, document: &Html) -> Option<String> {
        for selector in &self.candidates {
            let Some(node) = document.select(selector).next() else {
                continue;
            };
            let text = self.prune_noise(node).text_lines();
            if char_count(&text) <= GENERAL_CANDIDATE_MIN_CHARS {
                continue;
            }

            let filtered = filter_lines(&text);
            match normalize(&filtered) {
                Some(clean) if char_count(&clean) > GENERAL_MIN_CHARS => return Some(clean),
                _ => debug!(
                    "General candidate <{}> too thin after filtering",
                    node.value().name()
                ),
            }
        }

        self.join_paragraphs(document)
    }
}

/// Drop short lines that look like dates, navigation labels or counters
pub fn filter_lines(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| is_content_line(line))
        .collect::<Vec<_>>()
        .join("\n")
}

fn is_content_line(line: &str) -> bool {
    let len = char_count(line);
    if len > 50 {
        return true;
    }
    len > 10
        && line.matches(' ').count() > 2
        && ![
            date_only_re(),
            nav_label_re(),
            engagement_count_re(),
            month_lead_re(),
        ]
        .into_iter()
        .flatten()
        .any(|re| re.is_match(line))
}
