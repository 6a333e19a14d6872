// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Per-key exponential backoff for rate-limited requeues.
//!
//! Each failing key gets its own failure count. The delay before the key
//! becomes visible again doubles with every failure, is capped, and has
//! jitter applied so that a burst of failures does not come back in lockstep.

use crate::constants::{
    REQUEUE_BASE_DELAY_MILLIS, REQUEUE_MAX_DELAY_SECS, REQUEUE_RANDOMIZATION_FACTOR,
};
use rand::Rng;
use std::time::Duration;

/// Backoff multiplier (exponential growth factor)
const BACKOFF_MULTIPLIER: f64 = 2.0;

/// Exponential backoff parameters for a single key.
#[derive(Clone, Debug, PartialEq)]
pub struct ItemBackoff {
    /// Delay after the first failure
    pub base_delay: Duration,
    /// Upper bound on any delay
    pub max_delay: Duration,
    /// Backoff multiplier (typically 2.0 for doubling)
    pub multiplier: f64,
    /// Randomization factor (e.g., 0.1 for ±10%)
    pub randomization_factor: f64,
}

impl Default for ItemBackoff {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_millis(REQUEUE_BASE_DELAY_MILLIS),
            max_delay: Duration::from_secs(REQUEUE_MAX_DELAY_SECS),
            multiplier: BACKOFF_MULTIPLIER,
            randomization_factor: REQUEUE_RANDOMIZATION_FACTOR,
        }
    }
}

impl ItemBackoff {
    /// Backoff without jitter, for deterministic schedules.
    #[must_use]
    pub fn without_jitter(mut self) -> Self {
        self.randomization_factor = 0.0;
        self
    }

    /// Delay before retry number `failures` (zero-based), before jitter.
    ///
    /// # Retry Schedule
    ///
    /// With the default settings:
    ///
    /// 1. 5ms
    /// 2. 10ms
    /// 3. 20ms
    /// 4. 40ms
    ///
    /// and so on until the 1000s cap.
    #[must_use]
    pub fn base_interval(&self, failures: u32) -> Duration {
        let exponent = i32::try_from(failures).unwrap_or(i32::MAX);
        let secs = self.base_delay.as_secs_f64() * self.multiplier.powi(exponent);
        if !secs.is_finite() || secs >= self.max_delay.as_secs_f64() {
            return self.max_delay;
        }
        Duration::from_secs_f64(secs)
    }

    /// Delay before retry number `failures`, with jitter applied.
    #[must_use]
    pub fn delay(&self, failures: u32) -> Duration {
        self.apply_jitter(self.base_interval(failures))
    }

    fn apply_jitter(&self, interval: Duration) -> Duration {
        if self.randomization_factor == 0.0 {
            return interval;
        }

        let secs = interval.as_secs_f64();
        let delta = secs * self.randomization_factor;
        let min = secs - delta;
        let max = secs + delta;

        let jittered = rand::rng().random_range(min..=max);

        Duration::from_secs_f64(jittered.max(0.0))
    }
}

#[cfg(test)]
#[path = "backoff_tests.rs"]
mod backoff_tests;
