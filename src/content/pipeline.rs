// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Markup → article text, shared by both fetch tiers
//!
//! Runs synchronously: the parsed DOM is not `Send` and must never be held
//! across an await point.

use tracing::{debug, warn};

use super::normalize;
use super::parser::parse_markup;
use super::strategy::prune::char_count;
use super::strategy::StrategySet;
use super::types::ExtractedText;

/// Result of running markup through parsing, extraction and normalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupOutcome {
    Accepted {
        text: ExtractedText,
        strategy: &'static str,
    },
    /// Parsed fine, but nothing cleared the minimum length
    TooShort { chars: usize },
    /// No parser backend produced a usable body
    Unparseable,
}

/// Parse `markup` and extract its article text
pub fn extract_from_markup(
    strategies: &StrategySet,
    markup: &str,
    domain: &str,
    url: &str,
    min_chars: usize,
) -> MarkupOutcome {
    let Some(document) = parse_markup(markup, url) else {
        return MarkupOutcome::Unparseable;
    };

    let Some(extraction) = strategies.extract(domain, &document.html) else {
        debug!("No strategy produced text for {}", url);
        return MarkupOutcome::TooShort { chars: 0 };
    };

    match normalize::accept(&extraction.text, min_chars) {
        Some(text) => {
            debug!(
                "Extracted {} chars from {} via {} strategy",
                text.length, url, extraction.strategy
            );
            MarkupOutcome::Accepted {
                text,
                strategy: extraction.strategy,
            }
        }
        None => {
            let chars = char_count(extraction.text.trim());
            warn!(
                "Extracted content too short for {} (length: {}, need > {})",
                url, chars, min_chars
            );
            MarkupOutcome::TooShort { chars }
        }
    }
}
