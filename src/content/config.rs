// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Configuration for article fetching
//!
//! Timeouts, retry budget, politeness delays and the heavy-domain allowlist.

use std::env;
use std::ops::RangeInclusive;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Sites known to need JavaScript rendering
pub const DEFAULT_HEAVY_DOMAINS: &[&str] = &[
    "securityweek.com",
    "darkreading.com",
    "itsecurityguru.org",
    "cdt.org",
    "cisa.gov",
];

/// Configuration failures, raised before any fetch runs
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{field} must be at least 1")]
    Zero { field: &'static str },

    #[error("{field} range is inverted ({min} > {max})")]
    InvertedRange {
        field: &'static str,
        min: u64,
        max: u64,
    },

    /// The HTTP client could not be built
    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// Configuration for the two-tier fetcher
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    /// Per-request timeout for the lightweight tier (default: 20)
    pub light_timeout_secs: u64,
    /// Element-wait budget for the heavy tier (default: 30)
    pub heavy_timeout_secs: u64,
    /// Lightweight attempts before giving up (default: 3)
    pub max_retries: u32,
    /// Politeness delay before each request, lower bound (default: 1000)
    pub delay_min_ms: u64,
    /// Politeness delay before each request, upper bound (default: 5000)
    pub delay_max_ms: u64,
    /// Backoff unit; attempt n waits unit * (2^n + jitter) (default: 1000)
    pub backoff_unit_ms: u64,
    /// Settle pause after the heavy-tier wait, lower bound (default: 2000)
    pub settle_min_ms: u64,
    /// Settle pause after the heavy-tier wait, upper bound (default: 5000)
    pub settle_max_ms: u64,
    /// How often the heavy tier re-checks selector visibility (default: 250)
    pub poll_interval_ms: u64,
    /// Extracted text must be longer than this to count (default: 100)
    pub min_content_chars: usize,
    /// Let a too-short lightweight result fall back to the heavy tier (default: true)
    pub fallback_on_short_content: bool,
    /// Domains the caller should force through the heavy tier
    pub heavy_domains: Vec<String>,
}

impl ScrapeConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            light_timeout_secs: env_or("SCRAPER_LIGHT_TIMEOUT_SECS", defaults.light_timeout_secs),
            heavy_timeout_secs: env_or("SCRAPER_HEAVY_TIMEOUT_SECS", defaults.heavy_timeout_secs),
            max_retries: env_or("SCRAPER_MAX_RETRIES", defaults.max_retries),
            delay_min_ms: env_or("SCRAPER_DELAY_MIN_MS", defaults.delay_min_ms),
            delay_max_ms: env_or("SCRAPER_DELAY_MAX_MS", defaults.delay_max_ms),
            backoff_unit_ms: env_or("SCRAPER_BACKOFF_UNIT_MS", defaults.backoff_unit_ms),
            settle_min_ms: env_or("SCRAPER_SETTLE_MIN_MS", defaults.settle_min_ms),
            settle_max_ms: env_or("SCRAPER_SETTLE_MAX_MS", defaults.settle_max_ms),
            poll_interval_ms: env_or("SCRAPER_POLL_INTERVAL_MS", defaults.poll_interval_ms),
            min_content_chars: env_or("SCRAPER_MIN_CONTENT_CHARS", defaults.min_content_chars),
            fallback_on_short_content: env::var("SCRAPER_FALLBACK_ON_SHORT")
                .map(|v| v.to_lowercase() != "false")
                .unwrap_or(defaults.fallback_on_short_content),
            heavy_domains: env::var("SCRAPER_HEAVY_DOMAINS")
                .map(|v| parse_domain_list(&v))
                .unwrap_or(defaults.heavy_domains),
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_retries == 0 {
            return Err(ConfigError::Zero {
                field: "max_retries",
            });
        }
        if self.light_timeout_secs == 0 {
            return Err(ConfigError::Zero {
                field: "light_timeout_secs",
            });
        }
        if self.heavy_timeout_secs == 0 {
            return Err(ConfigError::Zero {
                field: "heavy_timeout_secs",
            });
        }
        if self.min_content_chars == 0 {
            return Err(ConfigError::Zero {
                field: "min_content_chars",
            });
        }
        if self.delay_min_ms > self.delay_max_ms {
            return Err(ConfigError::InvertedRange {
                field: "delay",
                min: self.delay_min_ms,
                max: self.delay_max_ms,
            });
        }
        if self.settle_min_ms > self.settle_max_ms {
            return Err(ConfigError::InvertedRange {
                field: "settle",
                min: self.settle_min_ms,
                max: self.settle_max_ms,
            });
        }
        Ok(())
    }

    /// Whether the caller should set the force-heavy hint for `url`
    pub fn requires_heavy(&self, url: &str) -> bool {
        let Some(host) = Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_lowercase))
        else {
            return false;
        };
        self.heavy_domains
            .iter()
            .any(|domain| domain_matches(&host, domain))
    }

    pub fn light_timeout(&self) -> Duration {
        Duration::from_secs(self.light_timeout_secs)
    }

    pub fn heavy_timeout(&self) -> Duration {
        Duration::from_secs(self.heavy_timeout_secs)
    }

    pub fn delay_range(&self) -> RangeInclusive<Duration> {
        Duration::from_millis(self.delay_min_ms)..=Duration::from_millis(self.delay_max_ms)
    }

    pub fn settle_range(&self) -> RangeInclusive<Duration> {
        Duration::from_millis(self.settle_min_ms)..=Duration::from_millis(self.settle_max_ms)
    }

    pub fn backoff_unit(&self) -> Duration {
        Duration::from_millis(self.backoff_unit_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            light_timeout_secs: 20,
            heavy_timeout_secs: 30,
            max_retries: 3,
            delay_min_ms: 1000,
            delay_max_ms: 5000,
            backoff_unit_ms: 1000,
            settle_min_ms: 2000,
            settle_max_ms: 5000,
            poll_interval_ms: 250,
            min_content_chars: 100,
            fallback_on_short_content: true,
            heavy_domains: DEFAULT_HEAVY_DOMAINS.iter().map(|d| d.to_string()).collect(),
        }
    }
}

/// `host` is `pattern` itself or one of its subdomains
pub(crate) fn domain_matches(host: &str, pattern: &str) -> bool {
    let pattern = pattern.trim().trim_start_matches('.').to_lowercase();
    if pattern.is_empty() {
        return false;
    }
    host == pattern
        || host
            .strip_suffix(pattern.as_str())
            .is_some_and(|prefix| prefix.ends_with('.'))
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn parse_domain_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|d| d.trim().to_lowercase())
        .filter(|d| !d.is_empty())
        .collect()
}
