// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Two-tier fetch dispatcher
//!
//! ```text
//! Idle ─┬─(force heavy)──────────────────────────────┐
//!       └→ LightAttempt ─┬→ Success                  │
//!                        ├→ Blocked ──────┐          │
//!                        └→ Insufficient ─┴→ HeavyAttempt ─┬→ Success
//!                                         (session?)      └→ Fail
//! ```
//!
//! The heavy tier runs at most once per fetch: the borrowed session is
//! taken out of the request the first time it is used.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use super::browser::{BrowserError, BrowserSession};
use super::config::{ConfigError, ScrapeConfig};
use super::heavy::HeavyFetcher;
use super::light::{LightFailure, LightReport, LightweightFetcher};
use super::strategy::StrategySet;
use super::transport::{HttpTransport, ReqwestTransport};
use super::types::{AttemptOutcome, ExtractedText, FetchAttempt, FetchError, FetchRequest, FetchTier};

/// Dispatcher states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    Idle,
    LightAttempt,
    /// Lightweight tier saw 403/429
    Blocked,
    /// Lightweight tier exhausted retries or found too little text
    Insufficient,
    HeavyAttempt,
    Success,
    Fail,
}

/// Inputs that drive a state change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signals {
    pub force_heavy: bool,
    pub has_session: bool,
    /// Whether a too-short lightweight result may escalate
    pub fallback_on_short: bool,
}

/// Lightweight result, reduced to what the state machine cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightVerdict {
    Success,
    Blocked,
    TooShort,
    Exhausted,
}

impl From<&LightReport> for LightVerdict {
    fn from(report: &LightReport) -> Self {
        if report.is_success() {
            Self::Success
        } else if report.blocked_status().is_some() {
            Self::Blocked
        } else if report.is_too_short() {
            Self::TooShort
        } else {
            Self::Exhausted
        }
    }
}

impl DispatchState {
    /// Leave `Idle`
    pub fn start(signals: Signals) -> Self {
        if !signals.force_heavy {
            Self::LightAttempt
        } else if signals.has_session {
            Self::HeavyAttempt
        } else {
            Self::Fail
        }
    }

    /// Leave `LightAttempt`
    pub fn after_light(verdict: LightVerdict, signals: Signals) -> Self {
        match verdict {
            LightVerdict::Success => Self::Success,
            LightVerdict::Blocked => Self::Blocked,
            LightVerdict::TooShort if !signals.fallback_on_short => Self::Fail,
            LightVerdict::TooShort | LightVerdict::Exhausted => Self::Insufficient,
        }
    }

    /// Leave `Blocked` or `Insufficient`
    pub fn escalate(self, signals: Signals) -> Self {
        match self {
            Self::Blocked | Self::Insufficient if signals.has_session => Self::HeavyAttempt,
            Self::Blocked | Self::Insufficient => Self::Fail,
            other => other,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Fail)
    }
}

/// Terminal result plus what it took to get there
#[derive(Debug, Clone)]
pub struct FetchReport {
    pub result: Result<ExtractedText, FetchError>,
    /// Every attempt in order, lightweight first
    pub attempts: Vec<FetchAttempt>,
    pub heavy_used: bool,
    /// Whether any attempt was answered with 403/429
    pub anti_bot_blocked: bool,
}

/// Chooses a tier per request and falls back between them
pub struct Dispatcher {
    config: ScrapeConfig,
    light: LightweightFetcher,
    heavy: HeavyFetcher,
}

impl Dispatcher {
    /// Dispatcher over an arbitrary transport with the built-in strategies
    pub fn new(config: ScrapeConfig, transport: Arc<dyn HttpTransport>) -> Result<Self, ConfigError> {
        Self::with_strategies(config, transport, Arc::new(StrategySet::new()))
    }

    pub fn with_strategies(
        config: ScrapeConfig,
        transport: Arc<dyn HttpTransport>,
        strategies: Arc<StrategySet>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let light = LightweightFetcher::new(transport, strategies.clone(), config.clone());
        let heavy = HeavyFetcher::new(&config, strategies);
        Ok(Self {
            config,
            light,
            heavy,
        })
    }

    /// Dispatcher over a `reqwest` transport
    pub fn from_config(config: ScrapeConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let transport =
            ReqwestTransport::new().map_err(|e| ConfigError::HttpClient(e.to_string()))?;
        Self::new(config, Arc::new(transport))
    }

    pub fn config(&self) -> &ScrapeConfig {
        &self.config
    }

    /// Fetch article text for `request`
    pub async fn fetch(&self, request: FetchRequest<'_>) -> Result<ExtractedText, FetchError> {
        self.fetch_with_report(request).await.result
    }

    /// Parse `url` and fetch it in one call
    pub async fn fetch_url(
        &self,
        url: &str,
        force_heavy: bool,
        session: Option<&mut dyn BrowserSession>,
    ) -> Result<ExtractedText, FetchError> {
        let mut request = FetchRequest::new(url)?.force_heavy(force_heavy);
        if let Some(session) = session {
            request = request.with_session(session);
        }
        self.fetch(request).await
    }

    /// Fetch and keep the attempt log
    pub async fn fetch_with_report(&self, request: FetchRequest<'_>) -> FetchReport {
        let (url, domain, force_heavy, mut session) = request.into_parts();
        let url = url.as_str();
        let signals = Signals {
            force_heavy,
            has_session: session.is_some(),
            fallback_on_short: self.config.fallback_on_short_content,
        };

        let mut report = FetchReport {
            result: Err(FetchError::NoContent {
                url: url.to_string(),
            }),
            attempts: Vec::new(),
            heavy_used: false,
            anti_bot_blocked: false,
        };
        let mut light_report: Option<LightReport> = None;
        let mut heavy_error: Option<BrowserError> = None;
        let mut state = DispatchState::Idle;

        while !state.is_terminal() {
            let next = match state {
                DispatchState::Idle => DispatchState::start(signals),
                DispatchState::LightAttempt => {
                    debug!("Lightweight fetch for {}", url);
                    let light = self.light.fetch(url, &domain).await;
                    report.attempts.extend(light.attempts.iter().cloned());
                    report.anti_bot_blocked |= light.blocked_status().is_some();
                    let next = DispatchState::after_light(LightVerdict::from(&light), signals);
                    if let Some(text) = light.text.clone() {
                        report.result = Ok(text);
                    }
                    light_report = Some(light);
                    next
                }
                DispatchState::Blocked | DispatchState::Insufficient => {
                    let next = state.escalate(signals);
                    if next == DispatchState::HeavyAttempt {
                        info!("Falling back to heavy fetch for {} ({:?})", url, state);
                    }
                    next
                }
                DispatchState::HeavyAttempt => match session.take() {
                    Some(session) => {
                        report.heavy_used = true;
                        let (outcome, next) = match self.heavy.fetch(session, url, &domain).await {
                            Ok(Some(text)) => {
                                info!("Heavy fetch succeeded for {} ({} chars)", url, text.length);
                                report.result = Ok(text);
                                (AttemptOutcome::Success, DispatchState::Success)
                            }
                            Ok(None) => (AttemptOutcome::TooShort, DispatchState::Fail),
                            Err(e) => {
                                let outcome = match e {
                                    BrowserError::Timeout => AttemptOutcome::Timeout,
                                    _ => AttemptOutcome::NetworkError,
                                };
                                heavy_error = Some(e);
                                (outcome, DispatchState::Fail)
                            }
                        };
                        report
                            .attempts
                            .push(FetchAttempt::new(FetchTier::Heavy, 1, outcome));
                        next
                    }
                    None => DispatchState::Fail,
                },
                DispatchState::Success | DispatchState::Fail => state,
            };
            debug!("Dispatch {:?} -> {:?} for {}", state, next, url);
            state = next;
        }

        if state == DispatchState::Fail {
            let failure = terminal_error(
                url,
                report.heavy_used,
                light_report.as_ref(),
                heavy_error,
            );
            error!("Fetch failed for {}: {}", url, failure);
            report.result = Err(failure);
        }
        report
    }
}

/// Pick the failure the caller sees. A heavy attempt speaks last.
fn terminal_error(
    url: &str,
    heavy_used: bool,
    light: Option<&LightReport>,
    heavy_error: Option<BrowserError>,
) -> FetchError {
    let url = url.to_string();

    if heavy_used {
        return match heavy_error {
            // A challenge page renders but carries no article; keep the block visible
            None => match light.and_then(LightReport::blocked_status) {
                Some(status) => FetchError::AntiBotBlocked { url, status },
                None => FetchError::NoContent { url },
            },
            Some(BrowserError::Timeout) => FetchError::Timeout { url },
            Some(e) => FetchError::Browser {
                url,
                message: e.to_string(),
            },
        };
    }

    let Some(light) = light else {
        // Forced heavy with nothing to drive it
        warn!("Heavy fetch required for {} but no session supplied", url);
        return FetchError::SessionUnavailable { url };
    };

    match &light.failure {
        Some(LightFailure::Blocked { status }) => FetchError::AntiBotBlocked {
            url,
            status: *status,
        },
        Some(LightFailure::Timeout) => FetchError::Timeout { url },
        Some(LightFailure::Network(message)) => FetchError::Network {
            url,
            message: message.clone(),
        },
        Some(LightFailure::Status(status)) => FetchError::Network {
            url,
            message: format!("HTTP {}", status),
        },
        Some(LightFailure::TooShort { .. }) | Some(LightFailure::ParseFailure) | None => {
            FetchError::NoContent { url }
        }
    }
}
