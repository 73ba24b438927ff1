//! Pulls batches of samples off the capture ring buffer and wraps them as
//! timestamped [`AudioFrame`]s, tracking the device's current sample rate
//! and channel count so the chunker can detect format changes.

use std::sync::Arc;
use std::time::Instant;

use voxrelay_telemetry::{BufferType, PipelineMetrics};

use super::capture::AudioFrame;
use super::ring_buffer::AudioConsumer;

pub struct FrameReader {
    consumer: AudioConsumer,
    sample_rate: u32,
    channels: u16,
    capacity: usize,
    metrics: Option<Arc<PipelineMetrics>>,
}

impl FrameReader {
    pub fn new(
        consumer: AudioConsumer,
        sample_rate: u32,
        channels: u16,
        capacity: usize,
        metrics: Option<Arc<PipelineMetrics>>,
    ) -> Self {
        Self {
            consumer,
            sample_rate,
            channels,
            capacity,
            metrics,
        }
    }

    pub fn update_device_config(&mut self, sample_rate: u32, channels: u16) {
        self.sample_rate = sample_rate;
        self.channels = channels;
    }

    /// Drain up to `max_samples` from the ring buffer. Returns `None` when
    /// nothing is currently buffered; the caller is expected to poll.
    pub fn read_frame(&mut self, max_samples: usize) -> Option<AudioFrame> {
        let max_samples = max_samples.min(self.capacity);
        let samples = self.consumer.read(max_samples);
        if samples.is_empty() {
            return None;
        }
        if let Some(metrics) = &self.metrics {
            metrics.update_buffer_fill(
                BufferType::Capture,
                (self.consumer.available() * 100 / self.capacity.max(1)).min(100),
            );
        }
        Some(AudioFrame {
            samples,
            timestamp: Instant::now(),
            sample_rate: self.sample_rate,
            channels: self.channels,
        })
    }
}
