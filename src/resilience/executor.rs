//! Bounded-retry execution of remote operations.
//!
//! The delay between attempts is fixed, with no backoff or jitter. That
//! keeps attempt timing predictable for callers, but a client facing heavy
//! throttling would want exponential backoff instead.

use crate::errors::{TeamsError, TeamsResult};
use crate::observability::ExecutorMetrics;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Attempt budget for one call site
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptConfig {
    /// Maximum number of attempts; zero still runs the operation once
    pub max_retries: u32,
    /// Fixed delay between failed attempts
    pub retry_delay: Duration,
    /// Deadline applied to each attempt separately
    pub per_attempt_timeout: Duration,
}

impl Default for AttemptConfig {
    fn default() -> Self {
        Self {
            max_retries: crate::DEFAULT_MAX_RETRIES,
            retry_delay: Duration::from_secs(crate::DEFAULT_RETRY_DELAY_SECS),
            per_attempt_timeout: Duration::from_secs(crate::DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl AttemptConfig {
    /// Create a new attempt configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum attempts
    pub fn max_retries(mut self, n: u32) -> Self {
        self.max_retries = n;
        self
    }

    /// Set the delay between attempts
    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Set the per-attempt timeout
    pub fn per_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.per_attempt_timeout = timeout;
        self
    }

    fn attempts(&self) -> u32 {
        self.max_retries.max(1)
    }
}

/// Runs remote operations under an [`AttemptConfig`], recording metrics
#[derive(Debug, Clone)]
pub struct RequestExecutor {
    config: AttemptConfig,
    metrics: Arc<ExecutorMetrics>,
}

impl Default for RequestExecutor {
    fn default() -> Self {
        Self::new(AttemptConfig::default())
    }
}

impl RequestExecutor {
    /// Create a new executor
    pub fn new(config: AttemptConfig) -> Self {
        Self {
            config,
            metrics: Arc::new(ExecutorMetrics::new()),
        }
    }

    /// Get the attempt configuration
    pub fn config(&self) -> &AttemptConfig {
        &self.config
    }

    /// Get the metrics recorded by this executor
    pub fn metrics(&self) -> &Arc<ExecutorMetrics> {
        &self.metrics
    }

    /// Execute an operation with this executor's configuration
    pub async fn execute<F, Fut, T>(
        &self,
        endpoint: &str,
        cancel: &CancellationToken,
        operation: F,
    ) -> TeamsResult<T>
    where
        F: Fn(CancellationToken) -> Fut,
        Fut: Future<Output = TeamsResult<T>>,
    {
        run_attempts(&self.config, endpoint, cancel, Some(self.metrics.as_ref()), operation).await
    }

    /// Execute an operation with a call-site specific configuration
    pub async fn execute_with<F, Fut, T>(
        &self,
        config: &AttemptConfig,
        endpoint: &str,
        cancel: &CancellationToken,
        operation: F,
    ) -> TeamsResult<T>
    where
        F: Fn(CancellationToken) -> Fut,
        Fut: Future<Output = TeamsResult<T>>,
    {
        run_attempts(config, endpoint, cancel, Some(self.metrics.as_ref()), operation).await
    }
}

/// Execute an operation with bounded retries.
///
/// Each attempt receives its own child token of `cancel`, cancelled when the
/// attempt ends or times out. When every attempt fails, the last error is
/// returned as [`TeamsError::Api`]: its code/message pair verbatim, or a
/// `ParsingError` pair built from its description. Caller cancellation
/// returns [`TeamsError::Cancelled`] without further attempts.
pub async fn execute<F, Fut, T>(
    config: &AttemptConfig,
    cancel: &CancellationToken,
    operation: F,
) -> TeamsResult<T>
where
    F: Fn(CancellationToken) -> Fut,
    Fut: Future<Output = TeamsResult<T>>,
{
    run_attempts(config, "", cancel, None, operation).await
}

async fn run_attempts<F, Fut, T>(
    config: &AttemptConfig,
    endpoint: &str,
    cancel: &CancellationToken,
    metrics: Option<&ExecutorMetrics>,
    operation: F,
) -> TeamsResult<T>
where
    F: Fn(CancellationToken) -> Fut,
    Fut: Future<Output = TeamsResult<T>>,
{
    let max_attempts = config.attempts();
    let mut attempt = 0;

    loop {
        attempt += 1;

        if cancel.is_cancelled() {
            return Err(cancelled(metrics));
        }
        if let Some(metrics) = metrics {
            metrics.record_attempt(attempt > 1);
        }

        let attempt_token = cancel.child_token();
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            result = tokio::time::timeout(
                config.per_attempt_timeout,
                operation(attempt_token.clone()),
            ) => Some(result),
        };
        attempt_token.cancel();

        let error = match outcome {
            None => return Err(cancelled(metrics)),
            Some(Ok(Ok(value))) => {
                if attempt > 1 {
                    debug!(endpoint, attempt, "Operation succeeded after retry");
                }
                return Ok(value);
            }
            Some(Ok(Err(error))) => {
                if error.is_cancelled() && cancel.is_cancelled() {
                    return Err(cancelled(metrics));
                }
                error
            }
            Some(Err(_elapsed)) => {
                if let Some(metrics) = metrics {
                    metrics.record_timeout();
                }
                TeamsError::Timeout(config.per_attempt_timeout)
            }
        };

        if attempt >= max_attempts {
            warn!(
                endpoint,
                attempt,
                max_retries = config.max_retries,
                error = %error,
                "Operation failed permanently"
            );
            if let Some(metrics) = metrics {
                metrics.record_endpoint_failure(endpoint);
            }
            return Err(TeamsError::Api(error.into_api_error()));
        }

        debug!(
            endpoint,
            attempt,
            delay_ms = config.retry_delay.as_millis() as u64,
            error = %error,
            "Retrying operation"
        );

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(cancelled(metrics)),
            _ = tokio::time::sleep(config.retry_delay) => {}
        }
    }
}

fn cancelled(metrics: Option<&ExecutorMetrics>) -> TeamsError {
    if let Some(metrics) = metrics {
        metrics.record_cancellation();
    }
    TeamsError::Cancelled
}
