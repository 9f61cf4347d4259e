// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Lightweight tier: plain HTTP with rotating identity, politeness delays
//! and exponential backoff

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::backoff::{sleep_backoff, sleep_random};
use super::config::ScrapeConfig;
use super::identity::IdentityProfile;
use super::pipeline::{extract_from_markup, MarkupOutcome};
use super::strategy::StrategySet;
use super::transport::{HttpTransport, TransportError};
use super::types::{AttemptOutcome, ExtractedText, FetchAttempt, FetchTier};

/// Why the lightweight tier gave up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LightFailure {
    /// 403/429; retrying with the same transport is pointless
    Blocked { status: u16 },
    Timeout,
    Network(String),
    /// Non-blocking HTTP error status
    Status(u16),
    ParseFailure,
    /// Parsed fine but the article text was under the floor
    TooShort { chars: usize },
}

impl fmt::Display for LightFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blocked { status } => write!(f, "blocked with HTTP {}", status),
            Self::Timeout => write!(f, "timed out"),
            Self::Network(msg) => write!(f, "{}", msg),
            Self::Status(status) => write!(f, "HTTP {}", status),
            Self::ParseFailure => write!(f, "unparseable markup"),
            Self::TooShort { chars } => write!(f, "content too short ({} chars)", chars),
        }
    }
}

/// Everything the dispatcher needs to decide what happens next
#[derive(Debug, Clone, Default)]
pub struct LightReport {
    pub text: Option<ExtractedText>,
    pub attempts: Vec<FetchAttempt>,
    /// Failure of the final attempt, `None` on success
    pub failure: Option<LightFailure>,
}

impl LightReport {
    pub fn is_success(&self) -> bool {
        self.text.is_some()
    }

    pub fn blocked_status(&self) -> Option<u16> {
        match self.failure {
            Some(LightFailure::Blocked { status }) => Some(status),
            _ => None,
        }
    }

    pub fn is_too_short(&self) -> bool {
        matches!(self.failure, Some(LightFailure::TooShort { .. }))
    }

    fn record(&mut self, attempt: u32, outcome: AttemptOutcome) {
        self.attempts
            .push(FetchAttempt::new(FetchTier::Lightweight, attempt + 1, outcome));
    }
}

/// HTTP fetcher for pages that do not need script execution
pub struct LightweightFetcher {
    transport: Arc<dyn HttpTransport>,
    strategies: Arc<StrategySet>,
    config: ScrapeConfig,
}

impl LightweightFetcher {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        strategies: Arc<StrategySet>,
        config: ScrapeConfig,
    ) -> Self {
        Self {
            transport,
            strategies,
            config,
        }
    }

    /// Run the retry loop for `url`.
    ///
    /// Blocks and too-short content end the loop at once; timeouts, network
    /// errors, other HTTP errors and unparseable bodies are retried with
    /// backoff until the budget is spent.
    pub async fn fetch(&self, url: &str, domain: &str) -> LightReport {
        let mut report = LightReport::default();
        let max_retries = self.config.max_retries;

        for attempt in 0..max_retries {
            sleep_random(&self.config.delay_range()).await;

            let headers = IdentityProfile::random(&mut rand::thread_rng()).headers();
            debug!(
                "Lightweight attempt {}/{} for {}",
                attempt + 1,
                max_retries,
                url
            );

            let failure = match self
                .transport
                .get(url, headers, self.config.light_timeout())
                .await
            {
                Ok(response) if response.is_anti_bot() => {
                    warn!(
                        "Anti-bot response (HTTP {}) from {}; not retrying",
                        response.status, url
                    );
                    report.record(attempt, AttemptOutcome::Blocked);
                    report.failure = Some(LightFailure::Blocked {
                        status: response.status,
                    });
                    return report;
                }
                Ok(response) if !response.is_success() => {
                    warn!("HTTP {} for {}", response.status, url);
                    report.record(attempt, AttemptOutcome::NetworkError);
                    LightFailure::Status(response.status)
                }
                Ok(response) => match extract_from_markup(
                    &self.strategies,
                    &response.body,
                    domain,
                    url,
                    self.config.min_content_chars,
                ) {
                    MarkupOutcome::Accepted { text, strategy } => {
                        info!(
                            "Fetched {} chars from {} ({} strategy)",
                            text.length, url, strategy
                        );
                        report.record(attempt, AttemptOutcome::Success);
                        report.text = Some(text);
                        report.failure = None;
                        return report;
                    }
                    MarkupOutcome::TooShort { chars } => {
                        // Same markup comes back on retry
                        report.record(attempt, AttemptOutcome::TooShort);
                        report.failure = Some(LightFailure::TooShort { chars });
                        return report;
                    }
                    MarkupOutcome::Unparseable => {
                        warn!("Could not parse response body from {}", url);
                        report.record(attempt, AttemptOutcome::ParseFailure);
                        LightFailure::ParseFailure
                    }
                },
                Err(TransportError::Timeout { timeout_ms }) => {
                    warn!("Request to {} timed out after {}ms", url, timeout_ms);
                    report.record(attempt, AttemptOutcome::Timeout);
                    LightFailure::Timeout
                }
                Err(TransportError::Network(message)) => {
                    warn!("Request to {} failed: {}", url, message);
                    report.record(attempt, AttemptOutcome::NetworkError);
                    LightFailure::Network(message)
                }
            };
            report.failure = Some(failure);

            if attempt + 1 < max_retries {
                let delay = sleep_backoff(attempt, self.config.backoff_unit()).await;
                debug!("Backed off {:?} before retrying {}", delay, url);
            }
        }

        warn!(
            "Lightweight tier exhausted {} attempts for {}",
            max_retries, url
        );
        report
    }
}
