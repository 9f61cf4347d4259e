// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Core types for article content fetching

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use super::browser::BrowserSession;

/// Which fetch tier produced an attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FetchTier {
    /// Plain HTTP request without script execution
    Lightweight,
    /// Headless-browser navigation
    Heavy,
}

impl fmt::Display for FetchTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lightweight => write!(f, "lightweight"),
            Self::Heavy => write!(f, "heavy"),
        }
    }
}

/// Outcome of a single fetch attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AttemptOutcome {
    Success,
    /// HTTP 403/429
    Blocked,
    Timeout,
    ParseFailure,
    TooShort,
    /// Connection error or non-blocking HTTP error status
    NetworkError,
}

/// One iteration of a tier's retry loop. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchAttempt {
    pub tier: FetchTier,
    /// 1-based attempt number within the tier
    pub attempt_number: u32,
    pub outcome: AttemptOutcome,
}

impl FetchAttempt {
    pub fn new(tier: FetchTier, attempt_number: u32, outcome: AttemptOutcome) -> Self {
        Self {
            tier,
            attempt_number,
            outcome,
        }
    }
}

/// Article text that cleared the minimum-content threshold
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedText {
    /// Normalized article body
    pub raw: String,
    /// Length in characters (not bytes)
    pub length: usize,
}

impl ExtractedText {
    /// Accept `text` only if its trimmed length exceeds `min_chars`
    pub fn accept(text: &str, min_chars: usize) -> Option<Self> {
        let trimmed = text.trim();
        let length = trimmed.chars().count();
        if length > min_chars {
            Some(Self {
                raw: trimmed.to_string(),
                length,
            })
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn into_string(self) -> String {
        self.raw
    }
}

/// Terminal failures reported to the caller
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Parsing worked but nothing cleared the content threshold
    #[error("No content extracted from: {url}")]
    NoContent { url: String },

    /// The site answered 403/429 and no other tier recovered
    #[error("Anti-bot block (HTTP {status}) for: {url}")]
    AntiBotBlocked { url: String, status: u16 },

    #[error("Timeout fetching: {url}")]
    Timeout { url: String },

    /// The heavy tier was required but no browser session was supplied
    #[error("Browser session unavailable for: {url}")]
    SessionUnavailable { url: String },

    /// Transient network errors outlasted the retry budget
    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },

    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The headless browser failed while driving the page
    #[error("Browser error for {url}: {message}")]
    Browser { url: String, message: String },
}

impl FetchError {
    /// True for infrastructure problems worth retrying later, false when
    /// the page simply has nothing worth storing.
    pub fn is_transient(&self) -> bool {
        !matches!(self, Self::NoContent { .. } | Self::InvalidUrl { .. })
    }

    pub fn url(&self) -> &str {
        match self {
            Self::NoContent { url }
            | Self::AntiBotBlocked { url, .. }
            | Self::Timeout { url }
            | Self::SessionUnavailable { url }
            | Self::Network { url, .. }
            | Self::InvalidUrl { url, .. }
            | Self::Browser { url, .. } => url,
        }
    }
}

/// A single article fetch. Consumed by the dispatcher, so the browser
/// session it borrows is driven by at most one fetch at a time.
pub struct FetchRequest<'s> {
    url: Url,
    domain: String,
    force_heavy: bool,
    session: Option<&'s mut dyn BrowserSession>,
}

impl<'s> FetchRequest<'s> {
    /// Build a request for an absolute http(s) URL
    pub fn new(url: &str) -> Result<Self, FetchError> {
        let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        if !["http", "https"].contains(&parsed.scheme()) {
            return Err(FetchError::InvalidUrl {
                url: url.to_string(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        let domain = match parsed.host_str() {
            Some(host) if !host.is_empty() => host.to_lowercase(),
            _ => {
                return Err(FetchError::InvalidUrl {
                    url: url.to_string(),
                    reason: "missing host".to_string(),
                })
            }
        };

        Ok(Self {
            url: parsed,
            domain,
            force_heavy: false,
            session: None,
        })
    }

    /// Skip the lightweight tier and go straight to the browser
    pub fn force_heavy(mut self, force: bool) -> Self {
        self.force_heavy = force;
        self
    }

    /// Lend an externally owned browser session to this fetch
    pub fn with_session(mut self, session: &'s mut dyn BrowserSession) -> Self {
        self.session = Some(session);
        self
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn url_str(&self) -> &str {
        self.url.as_str()
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn is_force_heavy(&self) -> bool {
        self.force_heavy
    }

    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    pub(crate) fn into_parts(self) -> (Url, String, bool, Option<&'s mut dyn BrowserSession>) {
        (self.url, self.domain, self.force_heavy, self.session)
    }
}

impl fmt::Debug for FetchRequest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchRequest")
            .field("url", &self.url.as_str())
            .field("domain", &self.domain)
            .field("force_heavy", &self.force_heavy)
            .field("session", &self.session.is_some())
            .finish()
    }
}
