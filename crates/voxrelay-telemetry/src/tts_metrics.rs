//! Counters for synthesis and the audio sink's device-fallback ladder.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct TtsMetrics {
    pub synth_requests: Arc<AtomicU64>,
    pub synth_successes: Arc<AtomicU64>,
    pub synth_failures: Arc<AtomicU64>,
    pub sink_rate_fallbacks: Arc<AtomicU64>,
    pub sink_device_fallbacks: Arc<AtomicU64>,
    pub sink_discarded_utterances: Arc<AtomicU64>,
    pub last_synth_latency_ms: Arc<AtomicU64>,
}

impl TtsMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_synth_request(&self) {
        self.synth_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_synth_success(&self, latency_ms: u64) {
        self.synth_successes.fetch_add(1, Ordering::Relaxed);
        self.last_synth_latency_ms.store(latency_ms, Ordering::Relaxed);
    }

    pub fn record_synth_failure(&self) {
        self.synth_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rate_fallback(&self) {
        self.sink_rate_fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_device_fallback(&self) {
        self.sink_device_fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_discarded_utterance(&self) {
        self.sink_discarded_utterances.fetch_add(1, Ordering::Relaxed);
    }
}
