// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Headless-browser session capability
//!
//! The heavy tier only borrows a session. Launching and closing a browser
//! is the caller's job; methods take `&mut self` so one session can never
//! drive two navigations at once.

use async_trait::async_trait;
use thiserror::Error;

/// Browser-side failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BrowserError {
    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("browser operation timed out")]
    Timeout,

    #[error("script evaluation failed: {0}")]
    Evaluation(String),

    #[error("browser session closed")]
    Closed,
}

/// What the heavy tier needs from a JavaScript-capable browser
#[async_trait]
pub trait BrowserSession: Send {
    /// Load `url` in the session's page
    async fn navigate(&mut self, url: &str) -> Result<(), BrowserError>;

    /// Whether an element matching the CSS `selector` is currently visible
    async fn is_visible(&mut self, selector: &str) -> Result<bool, BrowserError>;

    /// Serialized DOM of the rendered page
    async fn page_source(&mut self) -> Result<String, BrowserError>;
}

#[cfg(feature = "headless")]
pub use chromium::ChromiumSession;

#[cfg(feature = "headless")]
mod chromium {
    use async_trait::async_trait;
    use chromiumoxide::browser::{Browser, BrowserConfig};
    use chromiumoxide::Page;
    use futures::StreamExt;
    use tokio::task::JoinHandle;
    use tracing::{debug, warn};

    use super::{BrowserError, BrowserSession};

    const LAUNCH_ARGS: &[&str] = &[
        "--disable-blink-features=AutomationControlled",
        "--disable-dev-shm-usage",
        "--disable-gpu",
        "--no-sandbox",
        "--window-size=1920,1080",
        "--disable-extensions",
        "--no-first-run",
    ];

    /// Chromium driven over CDP. Created and closed by the caller.
    pub struct ChromiumSession {
        browser: Browser,
        page: Page,
        handler: JoinHandle<()>,
    }

    impl ChromiumSession {
        /// Launch a headless Chromium with one blank page
        pub async fn launch() -> Result<Self, BrowserError> {
            let config = BrowserConfig::builder()
                .args(LAUNCH_ARGS.iter().copied())
                .build()
                .map_err(BrowserError::Navigation)?;

            let (browser, mut handler) = Browser::launch(config)
                .await
                .map_err(|e| BrowserError::Navigation(format!("failed to launch browser: {}", e)))?;

            let handler = tokio::spawn(async move {
                while handler.next().await.is_some() {}
            });

            let page = browser
                .new_page("about:blank")
                .await
                .map_err(|e| BrowserError::Navigation(format!("failed to open page: {}", e)))?;

            debug!("Headless Chromium session launched");
            Ok(Self {
                browser,
                page,
                handler,
            })
        }

        /// Shut the browser down and stop the CDP handler
        pub async fn close(mut self) {
            if let Err(e) = self.browser.close().await {
                warn!("Error closing browser: {}", e);
            }
            let _ = self.browser.wait().await;
            self.handler.abort();
        }
    }

    #[async_trait]
    impl BrowserSession for ChromiumSession {
        async fn navigate(&mut self, url: &str) -> Result<(), BrowserError> {
            self.page
                .goto(url)
                .await
                .map(|_| ())
                .map_err(|e| BrowserError::Navigation(e.to_string()))
        }

        async fn is_visible(&mut self, selector: &str) -> Result<bool, BrowserError> {
            let selector = serde_json::to_string(selector)
                .map_err(|e| BrowserError::Evaluation(e.to_string()))?;
            let script = format!(
                "(() => {{ const el = document.querySelector({}); if (!el) return false; \
                 const s = window.getComputedStyle(el); const r = el.getBoundingClientRect(); \
                 return s.display !== 'none' && s.visibility !== 'hidden' && r.width > 0 && r.height > 0; }})()",
                selector
            );
            self.page
                .evaluate(script)
                .await
                .map_err(|e| BrowserError::Evaluation(e.to_string()))?
                .into_value::<bool>()
                .map_err(|e| BrowserError::Evaluation(e.to_string()))
        }

        async fn page_source(&mut self) -> Result<String, BrowserError> {
            self.page
                .content()
                .await
                .map_err(|e| BrowserError::Evaluation(e.to_string()))
        }
    }
}
