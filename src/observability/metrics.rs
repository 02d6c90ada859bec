//! Metrics collection for the request executor.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters updated by [`crate::resilience::RequestExecutor`]
#[derive(Debug, Default)]
pub struct ExecutorMetrics {
    /// Attempts started, including the first one
    attempts: AtomicU64,
    /// Attempts that were retries of a failed one
    retries: AtomicU64,
    /// Attempts that exceeded their deadline
    timeouts: AtomicU64,
    /// Calls that failed after exhausting every attempt
    failures: AtomicU64,
    /// Calls aborted by caller cancellation
    cancellations: AtomicU64,
    /// Exhausted calls by endpoint
    failures_by_endpoint: RwLock<HashMap<String, u64>>,
}

impl ExecutorMetrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the start of an attempt
    pub fn record_attempt(&self, is_retry: bool) {
        self.attempts.fetch_add(1, Ordering::Relaxed);
        if is_retry {
            self.retries.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record an attempt timeout
    pub fn record_timeout(&self) {
        self.timeouts.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a call that exhausted its attempts
    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a call that exhausted its attempts against an endpoint
    pub fn record_endpoint_failure(&self, endpoint: &str) {
        self.record_failure();
        *self
            .failures_by_endpoint
            .write()
            .entry(endpoint.to_string())
            .or_insert(0) += 1;
    }

    /// Record a cancelled call
    pub fn record_cancellation(&self) {
        self.cancellations.fetch_add(1, Ordering::Relaxed);
    }

    /// Failures recorded for an endpoint
    pub fn endpoint_failures(&self, endpoint: &str) -> u64 {
        self.failures_by_endpoint
            .read()
            .get(endpoint)
            .copied()
            .unwrap_or(0)
    }

    /// Get all counters as a snapshot
    pub fn snapshot(&self) -> ExecutorMetricsSnapshot {
        ExecutorMetricsSnapshot {
            attempts: self.attempts.load(Ordering::Relaxed),
            retries: self.retries.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            cancellations: self.cancellations.load(Ordering::Relaxed),
        }
    }

    /// Reset all counters
    pub fn reset(&self) {
        self.attempts.store(0, Ordering::Relaxed);
        self.retries.store(0, Ordering::Relaxed);
        self.timeouts.store(0, Ordering::Relaxed);
        self.failures.store(0, Ordering::Relaxed);
        self.cancellations.store(0, Ordering::Relaxed);
        self.failures_by_endpoint.write().clear();
    }
}

/// Point-in-time copy of [`ExecutorMetrics`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutorMetricsSnapshot {
    /// Attempts started
    pub attempts: u64,
    /// Retry attempts
    pub retries: u64,
    /// Attempt timeouts
    pub timeouts: u64,
    /// Exhausted calls
    pub failures: u64,
    /// Cancelled calls
    pub cancellations: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attempts_and_retries() {
        let metrics = ExecutorMetrics::new();

        metrics.record_attempt(false);
        metrics.record_attempt(true);
        metrics.record_timeout();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.attempts, 2);
        assert_eq!(snapshot.retries, 1);
        assert_eq!(snapshot.timeouts, 1);
    }

    #[test]
    fn test_endpoint_failures_and_reset() {
        let metrics = ExecutorMetrics::new();

        metrics.record_endpoint_failure("teams.list");
        metrics.record_endpoint_failure("teams.list");
        metrics.record_endpoint_failure("search.query");

        assert_eq!(metrics.endpoint_failures("teams.list"), 2);
        assert_eq!(metrics.snapshot().failures, 3);

        metrics.reset();
        assert_eq!(metrics.endpoint_failures("teams.list"), 0);
        assert_eq!(metrics.snapshot().failures, 0);
    }
}
