// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Scripted transport and browser session shared by the content tests

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use pulse_scraper::content::{
    BrowserError, BrowserSession, HttpResponse, HttpTransport, ScrapeConfig, TransportError,
};
use reqwest::header::HeaderMap;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Defaults with every delay removed
pub fn fast_config() -> ScrapeConfig {
    ScrapeConfig {
        delay_min_ms: 0,
        delay_max_ms: 0,
        backoff_unit_ms: 0,
        settle_min_ms: 0,
        settle_max_ms: 0,
        poll_interval_ms: 1,
        heavy_timeout_secs: 1,
        ..ScrapeConfig::default()
    }
}

pub fn article_page(paragraphs: usize) -> String {
    let body: String = (0..paragraphs)
        .map(|i| {
            format!(
                "<p>Paragraph {} explains how the intrusion unfolded across several networks.</p>",
                i
            )
        })
        .collect();
    format!(
        "<html><head><title>Story</title></head><body><nav><a href='/'>Home</a></nav>\
         <article>{}</article><footer>Copyright 2025 Example Media</footer></body></html>",
        body
    )
}

pub fn ok(body: impl Into<String>) -> Result<HttpResponse, TransportError> {
    Ok(HttpResponse {
        status: 200,
        body: body.into(),
    })
}

pub fn status(code: u16) -> Result<HttpResponse, TransportError> {
    Ok(HttpResponse {
        status: code,
        body: String::new(),
    })
}

/// Replays canned responses in order and counts requests
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    calls: AtomicUsize,
    urls: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    pub fn new(responses: Vec<Result<HttpResponse, TransportError>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            calls: AtomicUsize::new(0),
            urls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn get(
        &self,
        url: &str,
        _headers: HeaderMap,
        _timeout: Duration,
    ) -> Result<HttpResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.urls.lock().unwrap().push(url.to_string());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Network("no scripted response".into())))
    }
}

/// Serves one rendered page and records what it was asked to do
pub struct ScriptedSession {
    pub rendered: String,
    pub visible: Vec<&'static str>,
    pub navigations: Vec<String>,
    pub source_reads: usize,
    pub fail_navigation: Option<BrowserError>,
    /// Visibility checks never answer
    pub stall_visibility: bool,
}

impl ScriptedSession {
    pub fn rendering(markup: impl Into<String>) -> Self {
        Self {
            rendered: markup.into(),
            visible: vec!["article"],
            navigations: Vec::new(),
            source_reads: 0,
            fail_navigation: None,
            stall_visibility: false,
        }
    }

    pub fn failing(error: BrowserError) -> Self {
        Self {
            fail_navigation: Some(error),
            ..Self::rendering(String::new())
        }
    }
}

#[async_trait]
impl BrowserSession for ScriptedSession {
    async fn navigate(&mut self, url: &str) -> Result<(), BrowserError> {
        self.navigations.push(url.to_string());
        match &self.fail_navigation {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }

    async fn is_visible(&mut self, selector: &str) -> Result<bool, BrowserError> {
        if self.stall_visibility {
            std::future::pending::<()>().await;
        }
        Ok(self.visible.contains(&selector))
    }

    async fn page_source(&mut self) -> Result<String, BrowserError> {
        self.source_reads += 1;
        Ok(self.rendered.clone())
    }
}
