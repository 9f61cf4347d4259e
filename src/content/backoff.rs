// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Retry backoff and politeness delays
//!
//! Jitter keeps retries from synchronizing across URLs and makes the
//! request timing look less mechanical.

use std::ops::RangeInclusive;
use std::time::Duration;

use rand::Rng;

/// Delay before retry `attempt + 1`: `unit * (2^attempt + uniform(0, 1))`
pub fn backoff_delay<R: Rng + ?Sized>(attempt: u32, unit: Duration, rng: &mut R) -> Duration {
    let jitter: f64 = rng.gen_range(0.0..1.0);
    unit.mul_f64(backoff_base(attempt) + jitter)
}

/// Mean of [`backoff_delay`] for `attempt`
pub fn expected_backoff(attempt: u32, unit: Duration) -> Duration {
    unit.mul_f64(backoff_base(attempt) + 0.5)
}

/// Uniform random duration inside `range`
pub fn random_delay<R: Rng + ?Sized>(range: &RangeInclusive<Duration>, rng: &mut R) -> Duration {
    let (min, max) = (*range.start(), *range.end());
    if max <= min {
        return min;
    }
    let min_ms = min.as_millis() as u64;
    let max_ms = max.as_millis() as u64;
    Duration::from_millis(rng.gen_range(min_ms..=max_ms))
}

/// Sleep for a random duration inside `range`
pub async fn sleep_random(range: &RangeInclusive<Duration>) {
    // ThreadRng is !Send, so draw before awaiting
    let delay = random_delay(range, &mut rand::thread_rng());
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

/// Sleep out the backoff for a failed `attempt`, returning the delay used
pub async fn sleep_backoff(attempt: u32, unit: Duration) -> Duration {
    let delay = backoff_delay(attempt, unit, &mut rand::thread_rng());
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
    delay
}

fn backoff_base(attempt: u32) -> f64 {
    2f64.powi(attempt.min(16) as i32)
}
