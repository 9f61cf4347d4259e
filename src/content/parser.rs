// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Markup parsing with prioritized backends
//!
//! html5ever rarely fails outright, but truncated or mislabelled responses
//! can leave it with an empty `<body>`. Each backend is tried in order and
//! the first one that yields a body with content wins.

use std::fmt;

use scraper::{Html, Node, Selector};
use tracing::{debug, warn};

/// Parser backends in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserBackend {
    /// Full HTML5 document parse
    Document,
    /// Document parse after stripping NULs and anything before the first tag
    Recovered,
    /// Fragment parse wrapped in a synthetic document body
    Fragment,
}

impl ParserBackend {
    pub const PRIORITY: [ParserBackend; 3] = [Self::Document, Self::Recovered, Self::Fragment];

    fn parse(self, markup: &str) -> Html {
        match self {
            Self::Document => Html::parse_document(markup),
            Self::Recovered => Html::parse_document(&recover_markup(markup)),
            Self::Fragment => {
                let fragment = Html::parse_fragment(markup);
                let inner = fragment.root_element().inner_html();
                Html::parse_document(&format!("<html><body>{}</body></html>", inner))
            }
        }
    }
}

impl fmt::Display for ParserBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Document => write!(f, "document"),
            Self::Recovered => write!(f, "recovered"),
            Self::Fragment => write!(f, "fragment"),
        }
    }
}

/// A parsed page plus the backend that produced it
pub struct ParsedDocument {
    pub html: Html,
    pub backend: ParserBackend,
}

impl fmt::Debug for ParsedDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParsedDocument")
            .field("backend", &self.backend)
            .finish_non_exhaustive()
    }
}

/// Parse `markup`, returning `None` when no backend finds a usable body
pub fn parse_markup(markup: &str, url: &str) -> Option<ParsedDocument> {
    for backend in ParserBackend::PRIORITY {
        let html = backend.parse(markup);
        if has_body_content(&html) {
            debug!("Parsed {} with {} backend", url, backend);
            return Some(ParsedDocument { html, backend });
        }
        warn!("Parser '{}' produced an empty body for {}", backend, url);
    }
    None
}

/// True if `<body>` holds an element or non-whitespace text
pub fn has_body_content(html: &Html) -> bool {
    let Ok(body_selector) = Selector::parse("body") else {
        return false;
    };
    let Some(body) = html.select(&body_selector).next() else {
        return false;
    };
    body.children().any(|child| match child.value() {
        Node::Element(_) => true,
        Node::Text(text) => !text.trim().is_empty(),
        _ => false,
    })
}

fn recover_markup(markup: &str) -> String {
    let cleaned: String = markup
        .trim_start_matches('\u{feff}')
        .chars()
        .filter(|c| *c != '\0')
        .collect();
    match cleaned.find('<') {
        Some(start) => cleaned[start..].to_string(),
        None => cleaned,
    }
}
