//! Counters for the translation stage.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct TranslateMetrics {
    pub requests: Arc<AtomicU64>,
    pub successes: Arc<AtomicU64>,
    pub failures: Arc<AtomicU64>,
    pub fallback_to_source: Arc<AtomicU64>,
    pub retries: Arc<AtomicU64>,
    pub last_latency_ms: Arc<AtomicU64>,
}

impl TranslateMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_request(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_success(&self, latency_ms: u64) {
        self.successes.fetch_add(1, Ordering::Relaxed);
        self.last_latency_ms.store(latency_ms, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fallback(&self) {
        self.fallback_to_source.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_retry(&self) {
        self.retries.fetch_add(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_fallbacks_separately_from_failures() {
        let m = TranslateMetrics::new();
        m.record_failure();
        m.record_fallback();
        assert_eq!(m.failures.load(Ordering::Relaxed), 1);
        assert_eq!(m.fallback_to_source.load(Ordering::Relaxed), 1);
    }
}
