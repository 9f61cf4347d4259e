// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Browser identity headers for the lightweight tier

use rand::seq::SliceRandom;
use rand::Rng;
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_ENCODING, ACCEPT_LANGUAGE, CACHE_CONTROL, CONNECTION,
    DNT, UPGRADE_INSECURE_REQUESTS, USER_AGENT,
};

/// User-Agent pool, one drawn per attempt
pub const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/125.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:127.0) Gecko/20100101 Firefox/127.0",
    "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:109.0) Gecko/20100101 Firefox/115.0",
    "Mozilla/5.0 (Linux; Android 10; SM-G973F) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/109.0.0.0 Mobile Safari/537.36",
];

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.9";

/// Headers sent with every attempt, apart from the User-Agent
fn standard_headers() -> [(HeaderName, &'static str); 7] {
    [
        (ACCEPT, ACCEPT_HTML),
        (ACCEPT_LANGUAGE, "en-US,en;q=0.9,es;q=0.8"),
        (ACCEPT_ENCODING, "gzip, deflate, br"),
        (CONNECTION, "keep-alive"),
        (UPGRADE_INSECURE_REQUESTS, "1"),
        (DNT, "1"),
        (CACHE_CONTROL, "max-age=0"),
    ]
}

/// Fetch metadata a real navigation sends
const FETCH_METADATA: &[(&str, &str)] = &[
    ("sec-fetch-dest", "document"),
    ("sec-fetch-mode", "navigate"),
    ("sec-fetch-site", "cross-site"),
    ("sec-fetch-user", "?1"),
];

/// A User-Agent plus the realistic header set that goes with it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityProfile {
    pub user_agent: &'static str,
}

impl IdentityProfile {
    /// Draw a profile from the pool
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let user_agent = USER_AGENTS.choose(rng).copied().unwrap_or(USER_AGENTS[0]);
        Self { user_agent }
    }

    /// Full header map for a request
    pub fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(self.user_agent));
        for (name, value) in standard_headers() {
            headers.insert(name, HeaderValue::from_static(value));
        }
        for (name, value) in FETCH_METADATA {
            headers.insert(HeaderName::from_static(name), HeaderValue::from_static(value));
        }
        headers
    }
}
