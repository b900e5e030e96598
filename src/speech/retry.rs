//! Retry budget and backoff schedule for rate-limited synthesis calls.

use crate::defaults::{MAX_RETRIES, RETRY_BASE_DELAY_MS};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How the wait grows between successive retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backoff {
    /// Retry k waits `base * k`.
    #[default]
    Linear,
    /// Retry k waits `base * 2^(k-1)`.
    Exponential,
}

/// Retry policy applied to rate-limit failures only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub backoff: Backoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: MAX_RETRIES,
            base_delay: Duration::from_millis(RETRY_BASE_DELAY_MS),
            backoff: Backoff::Linear,
        }
    }
}

impl RetryPolicy {
    /// Policy that never retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Wait before retry number `retry` (1-based), or `None` once the
    /// budget is spent.
    pub fn delay_for(&self, retry: u32) -> Option<Duration> {
        if retry == 0 || retry > self.max_retries {
            return None;
        }
        let factor = match self.backoff {
            Backoff::Linear => retry,
            Backoff::Exponential => 1u32.checked_shl(retry - 1).unwrap_or(u32::MAX),
        };
        Some(self.base_delay.saturating_mul(factor))
    }

    /// Sum of every wait the policy can impose on one call.
    pub fn worst_case_wait(&self) -> Duration {
        (1..=self.max_retries)
            .filter_map(|retry| self.delay_for(retry))
            .fold(Duration::ZERO, Duration::saturating_add)
    }
}
