// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Content extraction strategies
//!
//! A registry maps domains to site rules; everything else goes through
//! [`GeneralStrategy`]. A site rule that cannot clear its own floor also
//! hands over to the general strategy, so the most specific match that
//! passes its quality bar always wins.
//!
//! ```text
//! domain → DomainStrategy ─(too thin)─┐
//!    └──(unregistered)────────────→ GeneralStrategy → paragraph join
//! ```

pub mod domains;
pub mod general;
pub mod prune;

use std::sync::Arc;

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::content::config::domain_matches;
use crate::content::normalize::normalize;

pub use domains::{known_domains, DomainStrategy, TextMode, DOMAIN_MIN_CHARS};
pub use general::GeneralStrategy;
pub use prune::{compile_selectors, PrunedNode};

use prune::char_count;

/// A rule set for locating and cleaning article text in a parsed page
pub trait ExtractionStrategy: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &'static str;

    /// Candidate containers in priority order
    fn candidate_selectors(&self) -> &[Selector];

    /// Sub-elements removed from a candidate before reading its text
    fn noise_selectors(&self) -> &[Selector];

    /// Normalized text must be longer than this for a candidate to win
    fn min_chars(&self) -> usize;

    /// First node matched by any candidate selector
    fn select_candidate_node<'a>(&self, document: &'a Html) -> Option<ElementRef<'a>> {
        self.candidate_selectors()
            .iter()
            .find_map(|selector| document.select(selector).next())
    }

    /// Copy of `node` with the noise denylist removed
    fn prune_noise(&self, node: ElementRef<'_>) -> PrunedNode {
        PrunedNode::new(node, self.noise_selectors())
    }

    /// Raw text of a pruned candidate
    fn candidate_text(&self, node: &PrunedNode) -> String {
        node.text_lines()
    }

    /// Walk the candidates in order and return the first normalized text
    /// above the floor
    fn extract(&self, document: &Html) -> Option<String> {
        for selector in self.candidate_selectors() {
            let Some(node) = document.select(selector).next() else {
                continue;
            };
            let pruned = self.prune_noise(node);
            if let Some(text) = normalize(&self.candidate_text(&pruned)) {
                let len = char_count(&text);
                if len > self.min_chars() {
                    return Some(text);
                }
                debug!(
                    "{}: candidate <{}> has {} chars, floor is {}",
                    self.name(),
                    node.value().name(),
                    len,
                    self.min_chars()
                );
            }
        }
        None
    }
}

/// Text produced by the strategy set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    /// Strategy that produced the text
    pub strategy: &'static str,
    pub text: String,
}

/// Domain → strategy table with a general fallback
pub struct StrategySet {
    domains: Vec<(String, Arc<dyn ExtractionStrategy>)>,
    general: Arc<dyn ExtractionStrategy>,
}

impl StrategySet {
    /// Built-in site rules plus the general fallback
    pub fn new() -> Self {
        let mut set = Self::general_only();
        for (domain, strategy) in known_domains() {
            set.register(domain, Arc::new(strategy));
        }
        set
    }

    /// No site rules; every domain uses the general strategy
    pub fn general_only() -> Self {
        Self {
            domains: Vec::new(),
            general: Arc::new(GeneralStrategy::new()),
        }
    }

    /// Add or replace the rule for `domain` (also covers its subdomains)
    pub fn register(&mut self, domain: &str, strategy: Arc<dyn ExtractionStrategy>) {
        let domain = domain.trim().to_lowercase();
        self.domains.retain(|(d, _)| *d != domain);
        self.domains.push((domain, strategy));
    }

    /// Site rule for `domain`: exact match first, then parent domains
    pub fn lookup(&self, domain: &str) -> Option<&Arc<dyn ExtractionStrategy>> {
        let domain = domain.to_lowercase();
        self.domains
            .iter()
            .find(|(d, _)| *d == domain)
            .or_else(|| self.domains.iter().find(|(d, _)| domain_matches(&domain, d)))
            .map(|(_, strategy)| strategy)
    }

    /// Extract article text for a page served from `domain`
    pub fn extract(&self, domain: &str, document: &Html) -> Option<Extraction> {
        if let Some(strategy) = self.lookup(domain) {
            if let Some(text) = strategy.extract(document) {
                return Some(Extraction {
                    strategy: strategy.name(),
                    text,
                });
            }
            debug!(
                "{} rule found nothing usable on {}, falling back to general",
                strategy.name(),
                domain
            );
        }

        self.general.extract(document).map(|text| Extraction {
            strategy: self.general.name(),
            text,
        })
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }
}

impl Default for StrategySet {
    fn default() -> Self {
        Self::new()
    }
}
