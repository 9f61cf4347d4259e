// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Heavy tier: render the page in a borrowed headless-browser session
//!
//! One navigation per call and no internal retries; sessions are expensive
//! and a caller that wants another attempt asks again.

use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::backoff::sleep_random;
use super::browser::{BrowserError, BrowserSession};
use super::config::ScrapeConfig;
use super::pipeline::{extract_from_markup, MarkupOutcome};
use super::strategy::StrategySet;
use super::types::ExtractedText;

/// Content containers worth waiting for, most specific first
pub const WAIT_SELECTORS: &[&str] = &[
    "div[data-module=\"ArticleBody\"]",
    "div.article-content",
    "div.post-content",
    "div.entry-content",
    "article",
    "div.body-text",
    "div.main-content",
    "section.article-body",
    "div.content-body",
    "div.article-body",
];

/// Renders pages through a [`BrowserSession`] and extracts their text
pub struct HeavyFetcher {
    strategies: Arc<StrategySet>,
    wait_selectors: Vec<String>,
    timeout: Duration,
    poll_interval: Duration,
    settle: RangeInclusive<Duration>,
    min_chars: usize,
}

impl HeavyFetcher {
    pub fn new(config: &ScrapeConfig, strategies: Arc<StrategySet>) -> Self {
        Self {
            strategies,
            wait_selectors: WAIT_SELECTORS.iter().map(|s| s.to_string()).collect(),
            timeout: config.heavy_timeout(),
            poll_interval: config.poll_interval(),
            settle: config.settle_range(),
            min_chars: config.min_content_chars,
        }
    }

    /// Navigate, wait for content, settle, then extract.
    ///
    /// `Ok(None)` means the page rendered but held no usable article text.
    pub async fn fetch(
        &self,
        session: &mut dyn BrowserSession,
        url: &str,
        domain: &str,
    ) -> Result<Option<ExtractedText>, BrowserError> {
        info!("Attempting heavy fetch for {}", url);

        match tokio::time::timeout(self.timeout, session.navigate(url)).await {
            Ok(result) => result?,
            Err(_) => {
                warn!("Navigation to {} exceeded {:?}", url, self.timeout);
                return Err(BrowserError::Timeout);
            }
        }

        match self.wait_for_content(session).await? {
            Some(selector) => debug!("Found content element '{}' for {}", selector, url),
            None => warn!(
                "No content selector became visible for {} within {:?}; using whatever rendered",
                url, self.timeout
            ),
        }

        // Deferred scripts often fill the body after the container appears
        sleep_random(&self.settle).await;

        let markup = match tokio::time::timeout(self.timeout, session.page_source()).await {
            Ok(result) => result?,
            Err(_) => {
                warn!("Reading page source for {} exceeded {:?}", url, self.timeout);
                return Err(BrowserError::Timeout);
            }
        };
        match extract_from_markup(&self.strategies, &markup, domain, url, self.min_chars) {
            MarkupOutcome::Accepted { text, .. } => Ok(Some(text)),
            MarkupOutcome::TooShort { chars } => {
                warn!("Heavy fetch content too short for {} (length: {})", url, chars);
                Ok(None)
            }
            MarkupOutcome::Unparseable => {
                warn!("Rendered page for {} could not be parsed", url);
                Ok(None)
            }
        }
    }

    /// Poll the wait list until one selector is visible or the budget runs
    /// out. Returns the winning selector, if any. A visibility check that
    /// never answers counts against the same budget.
    async fn wait_for_content(
        &self,
        session: &mut dyn BrowserSession,
    ) -> Result<Option<String>, BrowserError> {
        match tokio::time::timeout(self.timeout, self.poll_wait_list(session)).await {
            Ok(found) => found,
            Err(_) => Ok(None),
        }
    }

    async fn poll_wait_list(
        &self,
        session: &mut dyn BrowserSession,
    ) -> Result<Option<String>, BrowserError> {
        loop {
            for selector in &self.wait_selectors {
                match session.is_visible(selector).await {
                    Ok(true) => return Ok(Some(selector.clone())),
                    Ok(false) => {}
                    Err(BrowserError::Closed) => return Err(BrowserError::Closed),
                    Err(e) => debug!("Visibility check for '{}' failed: {}", selector, e),
                }
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}
