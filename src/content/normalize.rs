// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Whitespace and boilerplate cleanup for extracted text
//!
//! `normalize` is idempotent: every line it keeps passes its own filters
//! again unchanged, and blank-line runs are already collapsed.

use std::sync::OnceLock;

use regex::Regex;
use tracing::warn;

use super::types::ExtractedText;

/// Compile `pattern` into `cell` on first use. An invalid pattern is
/// logged once and matches nothing.
pub(crate) fn cached_regex(
    cell: &'static OnceLock<Option<Regex>>,
    pattern: &str,
) -> Option<&'static Regex> {
    cell.get_or_init(|| match Regex::new(pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            warn!("Ignoring invalid pattern '{}': {}", pattern, e);
            None
        }
    })
    .as_ref()
}

/// Share/print/follow prompts that start a line
fn prompt_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    cached_regex(
        &RE,
        r"(?i)^(share|tweet|pin|like|follow|subscribe|view comments|print article|email article|topics|related content)\b",
    )
}

/// Cookie, privacy and copyright notices anywhere in a line
fn notice_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    cached_regex(
        &RE,
        r"(?i)(cookie|privacy policy|terms of service|copyright|all rights reserved|powered by)",
    )
}

/// Lines made only of digits, whitespace and punctuation
fn symbol_only_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    cached_regex(&RE, r"^[\d\s\W]*$")
}

/// Clean extracted text; `None` if nothing survives
pub fn normalize(raw: &str) -> Option<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut pending_blank = false;

    for line in raw.lines() {
        let line = line.split_whitespace().collect::<Vec<_>>().join(" ");
        if line.is_empty() {
            pending_blank = true;
            continue;
        }
        if is_boilerplate(&line) || is_noise(&line) {
            continue;
        }
        if pending_blank && !lines.is_empty() {
            lines.push(String::new());
        }
        pending_blank = false;
        lines.push(line);
    }

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

/// Normalize and apply the minimum-content gate in one step
pub fn accept(raw: &str, min_chars: usize) -> Option<ExtractedText> {
    normalize(raw).and_then(|text| ExtractedText::accept(&text, min_chars))
}

fn is_boilerplate(line: &str) -> bool {
    [prompt_re(), notice_re()]
        .into_iter()
        .flatten()
        .any(|re| re.is_match(line))
}

/// Very short, space-free or symbol-only residue
fn is_noise(line: &str) -> bool {
    let len = line.chars().count();
    if len > 20 {
        return false;
    }
    !(len > 5 && line.contains(' ') && !symbol_only_re().is_some_and(|re| re.is_match(line)))
}
