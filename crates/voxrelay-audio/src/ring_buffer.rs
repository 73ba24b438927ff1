//! SPSC sample ring buffer connecting the blocking capture thread to the
//! async chunker task. The capture callback is the sole producer; the
//! chunker's [`FrameReader`](super::frame_reader::FrameReader) is the sole
//! consumer. When the buffer is full the producer drops the oldest samples
//! rather than blocking the audio callback.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use voxrelay_foundation::AudioError;

struct Inner {
    buf: VecDeque<i16>,
    capacity: usize,
    dropped: u64,
}

pub struct AudioRingBuffer {
    inner: Arc<Mutex<Inner>>,
}

impl AudioRingBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                buf: VecDeque::with_capacity(capacity),
                capacity,
                dropped: 0,
            })),
        }
    }

    pub fn split(self) -> (AudioProducer, AudioConsumer) {
        (
            AudioProducer {
                inner: self.inner.clone(),
            },
            AudioConsumer { inner: self.inner },
        )
    }
}

pub struct AudioProducer {
    inner: Arc<Mutex<Inner>>,
}

impl AudioProducer {
    /// Append `samples`, dropping the oldest buffered samples first if the
    /// ring is at capacity. Always returns `Ok(samples.len())`: overflow is
    /// handled by eviction, not by rejecting the write.
    pub fn write(&mut self, samples: &[i16]) -> Result<usize, AudioError> {
        let mut inner = self.inner.lock();
        let capacity = inner.capacity;
        for &sample in samples {
            if inner.buf.len() >= capacity {
                inner.buf.pop_front();
                inner.dropped += 1;
            }
            inner.buf.push_back(sample);
        }
        Ok(samples.len())
    }

    pub fn dropped_count(&self) -> u64 {
        self.inner.lock().dropped
    }
}

pub struct AudioConsumer {
    inner: Arc<Mutex<Inner>>,
}

impl AudioConsumer {
    /// Drain up to `max_samples` from the front of the ring, oldest first.
    /// Returns fewer samples (or none) if the ring holds less than requested.
    pub fn read(&mut self, max_samples: usize) -> Vec<i16> {
        let mut inner = self.inner.lock();
        let n = max_samples.min(inner.buf.len());
        inner.buf.drain(..n).collect()
    }

    pub fn available(&self) -> usize {
        self.inner.lock().buf.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_samples_in_order() {
        let (mut producer, mut consumer) = AudioRingBuffer::new(16).split();
        producer.write(&[1, 2, 3, 4]).unwrap();
        assert_eq!(consumer.read(4), vec![1, 2, 3, 4]);
    }

    #[test]
    fn overflow_drops_oldest_samples() {
        let (mut producer, mut consumer) = AudioRingBuffer::new(4).split();
        producer.write(&[1, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(consumer.read(4), vec![3, 4, 5, 6]);
        assert_eq!(producer.dropped_count(), 2);
    }

    #[test]
    fn partial_read_leaves_remainder() {
        let (mut producer, mut consumer) = AudioRingBuffer::new(16).split();
        producer.write(&[1, 2, 3, 4]).unwrap();
        assert_eq!(consumer.read(2), vec![1, 2]);
        assert_eq!(consumer.available(), 2);
        assert_eq!(consumer.read(8), vec![3, 4]);
    }
}
