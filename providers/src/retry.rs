use crate::models::{BaseProvider, Message};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tools::ToolSpec;

/// How often and how patiently a failed model query is retried.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RetryPolicy {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Base delay; attempt `n` waits `n * backoff_ms` before retrying.
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
}

fn default_max_retries() -> u32 {
    3
}

fn default_backoff_ms() -> u64 {
    200
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_retries: default_max_retries(),
            backoff_ms: default_backoff_ms(),
        }
    }
}

impl RetryPolicy {
    pub fn none() -> Self {
        RetryPolicy {
            max_retries: 0,
            backoff_ms: 0,
        }
    }

    fn delay(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.backoff_ms.saturating_mul(u64::from(attempt) + 1))
    }
}

/// Wraps a provider so transient failures are retried before they reach
/// the caller. The last error is returned once the policy is exhausted.
#[derive(Debug, Clone)]
pub struct SafeProvider<P> {
    inner: P,
    policy: RetryPolicy,
}

impl<P: BaseProvider> SafeProvider<P> {
    pub fn new(inner: P, policy: RetryPolicy) -> Self {
        SafeProvider { inner, policy }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }
}

impl<P: BaseProvider> BaseProvider for SafeProvider<P> {
    async fn query(&self, messages: &[Message], tools: &[ToolSpec]) -> Result<Message> {
        let mut attempt = 0;
        loop {
            match self.inner.query(messages, tools).await {
                Ok(message) => return Ok(message),
                Err(err) if attempt < self.policy.max_retries => {
                    tracing::warn!(
                        attempt = attempt + 1,
                        max_retries = self.policy.max_retries,
                        error = %err,
                        "Model query failed, retrying"
                    );
                    tokio::time::sleep(self.policy.delay(attempt)).await;
                    attempt += 1;
                }
                Err(err) => {
                    tracing::error!(attempts = attempt + 1, error = %err, "Model query failed");
                    return Err(err.context(format!(
                        "Model query failed after {} attempt(s)",
                        attempt + 1
                    )));
                }
            }
        }
    }
}
