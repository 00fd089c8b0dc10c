use crate::logger::{entry::LogEntry, retry::RetryPolicy, store::TabularStore};

/// Successful append.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Ack {
    /// Attempt (1-based) that succeeded.
    pub attempts: u32,
}

/// Append failed on every attempt. Operator-facing only; never blocks delivery.
#[derive(thiserror::Error, Debug)]
#[error("log append failed after {attempts} attempt(s): {cause:#}")]
pub struct LogError {
    pub attempts: u32,
    /// Failure of the last attempt.
    pub cause: anyhow::Error,
}

/// Appends [`LogEntry`] rows with bounded retry and exponential backoff.
pub struct RecordLogger<S> {
    store: S,
    policy: RetryPolicy,
}

impl<S: TabularStore> RecordLogger<S> {
    pub fn new(store: S, policy: RetryPolicy) -> Self {
        Self { store, policy }
    }

    /// All error classes are retried the same way; the loop runs at most
    /// `policy.max_attempts` times and stops at the first success.
    #[tracing::instrument(skip_all, fields(max_attempts = self.policy.max_attempts))]
    pub async fn append(&self, entry: &LogEntry) -> Result<Ack, LogError> {
        let row = entry.row();
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1u32;
        loop {
            match self.store.append_row(&row).await {
                Ok(()) => {
                    tracing::debug!(attempt, "row appended");
                    return Ok(Ack { attempts: attempt });
                }
                Err(cause) if attempt >= max_attempts => {
                    tracing::warn!(attempt, error = %format!("{cause:#}"), "giving up on row append");
                    return Err(LogError {
                        attempts: attempt,
                        cause,
                    });
                }
                Err(cause) => {
                    let delay = self.policy.delay_after(attempt);
                    tracing::debug!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %format!("{cause:#}"),
                        "row append failed, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/logger/record.rs"]
mod tests;
