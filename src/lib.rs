// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod content;

pub use content::{
    Dispatcher, ExtractedText, FetchError, FetchReport, FetchRequest, ScrapeConfig,
};
