// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! HTTP transport for the lightweight tier

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::Client;
use thiserror::Error;

/// A decoded HTTP response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    /// Body decoded with the declared charset, invalid sequences replaced
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// 403 and 429 are read as automated-traffic rejection
    pub fn is_anti_bot(&self) -> bool {
        matches!(self.status, 403 | 429)
    }
}

/// Transport-level failures; all of them are retryable
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("network error: {0}")]
    Network(String),
}

/// Performs a single GET. Retries, delays and identity belong to the caller.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(
        &self,
        url: &str,
        headers: HeaderMap,
        timeout: Duration,
    ) -> Result<HttpResponse, TransportError>;
}

/// `reqwest`-backed transport with cookie-less, redirect-following GETs
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a transport with the default client settings
    pub fn new() -> Result<Self, TransportError> {
        let client = Client::builder()
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| TransportError::Network(format!("failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// Wrap a preconfigured client (proxies, custom TLS)
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(
        &self,
        url: &str,
        headers: HeaderMap,
        timeout: Duration,
    ) -> Result<HttpResponse, TransportError> {
        let timeout_ms = timeout.as_millis() as u64;
        let map_err = |e: reqwest::Error| {
            if e.is_timeout() {
                TransportError::Timeout { timeout_ms }
            } else {
                TransportError::Network(e.to_string())
            }
        };

        let response = self
            .client
            .get(url)
            .headers(headers)
            .timeout(timeout)
            .send()
            .await
            .map_err(map_err)?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            // Error bodies are never parsed
            return Ok(HttpResponse {
                status,
                body: String::new(),
            });
        }

        // Charset from Content-Type, UTF-8 otherwise; malformed bytes become U+FFFD
        let body = response.text().await.map_err(map_err)?;

        Ok(HttpResponse { status, body })
    }
}
