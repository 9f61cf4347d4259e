// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Article content fetching with a lightweight and a heavy tier
//!
//! Pulls the article body out of a news page. Plain HTTP is tried first;
//! pages that block automated traffic or need script execution fall back
//! to a caller-owned headless-browser session.
//!
//! ## Architecture
//!
//! ```text
//! FetchRequest → Dispatcher ─→ LightweightFetcher (HTTP, retries) ─┐
//!                    │                                            ├→ parser → StrategySet → normalize → ExtractedText
//!                    └─(blocked/thin)→ HeavyFetcher (browser) ────┘
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let config = ScrapeConfig::from_env();
//! let dispatcher = Dispatcher::from_config(config.clone())?;
//!
//! let url = "https://www.securityweek.com/some-story/";
//! let request = FetchRequest::new(url)?
//!     .force_heavy(config.requires_heavy(url))
//!     .with_session(&mut session);
//! let text = dispatcher.fetch(request).await?;
//! ```

pub mod backoff;
pub mod browser;
pub mod config;
pub mod dispatcher;
pub mod heavy;
pub mod identity;
pub mod light;
pub mod normalize;
pub mod parser;
pub mod pipeline;
pub mod strategy;
pub mod transport;
pub mod types;

pub use browser::{BrowserError, BrowserSession};
#[cfg(feature = "headless")]
pub use browser::ChromiumSession;
pub use config::{ConfigError, ScrapeConfig};
pub use dispatcher::{DispatchState, Dispatcher, FetchReport};
pub use heavy::HeavyFetcher;
pub use light::{LightFailure, LightReport, LightweightFetcher};
pub use normalize::normalize;
pub use strategy::{ExtractionStrategy, GeneralStrategy, StrategySet};
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport, TransportError};
pub use types::{AttemptOutcome, ExtractedText, FetchAttempt, FetchError, FetchRequest, FetchTier};
