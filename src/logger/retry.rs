use std::time::Duration;

use crate::foundation::error::{CertError, CertResult};

/// Bounded exponential backoff for the record logger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    pub base_backoff_ms: u64,
    pub backoff_multiplier: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_backoff_ms: 200,
            backoff_multiplier: 2,
        }
    }
}

impl RetryPolicy {
    pub fn validate(&self) -> CertResult<()> {
        if self.max_attempts == 0 {
            return Err(CertError::config("retry.max_attempts must be >= 1"));
        }
        if self.base_backoff_ms == 0 {
            return Err(CertError::config("retry.base_backoff_ms must be > 0"));
        }
        // Delays must strictly grow between attempts.
        if self.backoff_multiplier < 2 {
            return Err(CertError::config("retry.backoff_multiplier must be >= 2"));
        }
        Ok(())
    }

    /// Delay to wait after failed attempt `attempt` (1-based): `base * multiplier^(attempt-1)`.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = u64::from(self.backoff_multiplier).saturating_pow(attempt.saturating_sub(1));
        Duration::from_millis(self.base_backoff_ms.saturating_mul(factor))
    }

    /// Every delay the policy can produce, in order.
    pub fn schedule(&self) -> Vec<Duration> {
        (1..self.max_attempts).map(|a| self.delay_after(a)).collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/logger/retry.rs"]
mod tests;
