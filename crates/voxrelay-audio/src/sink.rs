//! Audio Sink: plays synthesized utterances to an output device.
//!
//! Mirrors `AudioCapture`'s device-opening and format-conversion approach,
//! but in the output direction and for whole-utterance buffers rather than
//! a continuous callback stream: a synthesizer hands us one finished PCM16
//! buffer at a time, we play it to completion, then return.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Host, SampleFormat, StreamConfig};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use voxrelay_foundation::{AudioError, HealthMonitor, HealthStatus};
use voxrelay_telemetry::TtsMetrics;

use super::resampler::StreamResampler;

/// First fallback rate tried when a device rejects the synthesizer's declared rate.
const FALLBACK_RATE_PRIMARY: u32 = 48_000;
/// Used instead of the primary fallback when the declared rate was already 48 kHz.
const FALLBACK_RATE_SECONDARY: u32 = 44_100;

pub struct AudioSink {
    host: Host,
    device_name: Option<String>,
    metrics: Arc<TtsMetrics>,
    health: Option<HealthMonitor>,
}

impl AudioSink {
    pub fn new(device_name: Option<String>, metrics: Arc<TtsMetrics>) -> Self {
        Self {
            host: cpal::default_host(),
            device_name,
            metrics,
            health: None,
        }
    }

    /// Attach a [`HealthMonitor`] the sink reports its `"sink"` component
    /// status to: `Healthy` on the declared rate, `Degraded` on a fallback,
    /// `Failed` once the whole ladder is exhausted.
    pub fn with_health(mut self, health: HealthMonitor) -> Self {
        self.health = Some(health);
        self
    }

    /// Play one finished utterance of mono PCM16 audio, following the
    /// declared-rate -> resample -> system-default fallback ladder. Never
    /// returns an error: an utterance that cannot be played on any device is
    /// logged and discarded, since a playback failure must not abort the
    /// pipeline.
    pub fn play(&self, pcm: &[i16], rate: u32, channels: u16) {
        if pcm.is_empty() {
            return;
        }

        if let Err(e) = self.try_open_and_play(self.device_name.as_deref(), pcm, rate, channels) {
            tracing::warn!(
                "sink: declared rate {}Hz rejected by configured device: {}",
                rate,
                e
            );
        } else {
            self.report_health(HealthStatus::Healthy);
            return;
        }

        let fallback_rate = if rate == FALLBACK_RATE_PRIMARY {
            FALLBACK_RATE_SECONDARY
        } else {
            FALLBACK_RATE_PRIMARY
        };
        self.metrics.record_rate_fallback();
        let mut resampler = StreamResampler::new(rate, fallback_rate);
        let resampled = resampler.process(pcm);

        match self.try_open_and_play(
            self.device_name.as_deref(),
            &resampled,
            fallback_rate,
            channels,
        ) {
            Ok(()) => {
                self.report_health(HealthStatus::Degraded {
                    reason: format!("resampled to {fallback_rate}Hz after rate rejection"),
                });
                return;
            }
            Err(e) => {
                tracing::warn!(
                    "sink: fallback rate {}Hz rejected by configured device: {}",
                    fallback_rate,
                    e
                );
            }
        }

        self.metrics.record_device_fallback();
        match self.try_open_and_play(None, &resampled, fallback_rate, channels) {
            Ok(()) => {
                self.report_health(HealthStatus::Degraded {
                    reason: "fell back to the system default output device".to_string(),
                });
                return;
            }
            Err(e) => {
                tracing::warn!(
                    "sink: fallback rate {}Hz rejected by system default device: {}",
                    fallback_rate,
                    e
                );
            }
        }

        self.metrics.record_discarded_utterance();
        tracing::error!("sink: exhausted device and rate fallbacks; discarding utterance audio");
        self.report_health(HealthStatus::Failed {
            reason: "exhausted device and rate fallback ladder".to_string(),
        });
    }

    fn report_health(&self, status: HealthStatus) {
        if let Some(health) = &self.health {
            health.report("sink", status);
        }
    }

    fn try_open_and_play(
        &self,
        device_name: Option<&str>,
        pcm: &[i16],
        rate: u32,
        channels: u16,
    ) -> Result<(), AudioError> {
        let device = self.open_device(device_name)?;
        let (config, sample_format) = self.negotiate_config(&device, rate, channels)?;
        play_blocking(&device, &config, sample_format, pcm)
    }

    fn open_device(&self, name: Option<&str>) -> Result<Device, AudioError> {
        if let Some(preferred) = name {
            if let Some(device) = self.find_device_by_name(preferred) {
                return Ok(device);
            }
            return Err(AudioError::DeviceNotFound {
                name: Some(preferred.to_string()),
            });
        }
        self.host
            .default_output_device()
            .ok_or(AudioError::DeviceNotFound { name: None })
    }

    fn find_device_by_name(&self, name: &str) -> Option<Device> {
        let devices = self.host.output_devices().ok()?;
        for device in devices {
            if let Ok(device_name) = device.name() {
                if device_name == name {
                    return Some(device);
                }
            }
        }
        None
    }

    /// Require an exact match on the requested rate: this is what lets the
    /// caller detect "declared rate rejected" and move on to resampling,
    /// rather than silently playing back at the wrong speed.
    fn negotiate_config(
        &self,
        device: &Device,
        rate: u32,
        channels: u16,
    ) -> Result<(StreamConfig, SampleFormat), AudioError> {
        let supported = device.supported_output_configs()?;

        for candidate in supported {
            if candidate.channels() != channels {
                continue;
            }
            if candidate.min_sample_rate().0 <= rate && candidate.max_sample_rate().0 >= rate {
                return Ok((
                    StreamConfig {
                        channels,
                        sample_rate: cpal::SampleRate(rate),
                        buffer_size: cpal::BufferSize::Default,
                    },
                    candidate.sample_format(),
                ));
            }
        }

        Err(AudioError::FormatNotSupported {
            format: format!("{}Hz/{}ch", rate, channels),
        })
    }
}

/// Plays `pcm` to completion on `device` and blocks the caller until done.
/// One utterance at a time; no ring buffer needed since the whole buffer is
/// already in memory by the time the synthesizer hands it to us.
fn play_blocking(
    device: &Device,
    config: &StreamConfig,
    sample_format: SampleFormat,
    pcm: &[i16],
) -> Result<(), AudioError> {
    let buffer = Arc::new(pcm.to_vec());
    let cursor = Arc::new(AtomicUsize::new(0));
    let finished = Arc::new(Mutex::new(false));

    let buf = Arc::clone(&buffer);
    let pos = Arc::clone(&cursor);
    let done = Arc::clone(&finished);

    let err_fn = |err: cpal::StreamError| {
        tracing::error!("sink: stream error: {}", err);
    };

    macro_rules! fill {
        ($data:expr, $convert:expr) => {{
            let start = pos.fetch_add($data.len(), Ordering::SeqCst);
            for (i, slot) in $data.iter_mut().enumerate() {
                let idx = start + i;
                *slot = if idx < buf.len() {
                    $convert(buf[idx])
                } else {
                    *done.lock() = true;
                    $convert(0i16)
                };
            }
            if start + $data.len() >= buf.len() {
                *done.lock() = true;
            }
        }};
    }

    let stream = match sample_format {
        SampleFormat::I16 => device.build_output_stream(
            config,
            move |data: &mut [i16], _| fill!(data, |s: i16| s),
            err_fn,
            None,
        )?,
        SampleFormat::F32 => device.build_output_stream(
            config,
            move |data: &mut [f32], _| fill!(data, |s: i16| s as f32 / 32768.0),
            err_fn,
            None,
        )?,
        SampleFormat::U16 => device.build_output_stream(
            config,
            move |data: &mut [u16], _| fill!(data, |s: i16| (s as i32 + 32768) as u16),
            err_fn,
            None,
        )?,
        SampleFormat::U32 => device.build_output_stream(
            config,
            move |data: &mut [u32], _| {
                fill!(data, |s: i16| {
                    let centered = (s as i64) << 16;
                    (centered + 2_147_483_648i64) as u32
                })
            },
            err_fn,
            None,
        )?,
        SampleFormat::F64 => device.build_output_stream(
            config,
            move |data: &mut [f64], _| fill!(data, |s: i16| s as f64 / 32768.0),
            err_fn,
            None,
        )?,
        other => {
            return Err(AudioError::FormatNotSupported {
                format: format!("{:?}", other),
            });
        }
    };

    stream.play()?;

    let samples_per_sec = config.sample_rate.0.max(1) as u64 * config.channels.max(1) as u64;
    let duration_ms = (pcm.len() as u64 * 1000) / samples_per_sec;
    let deadline = Duration::from_millis(duration_ms + 500);
    let poll_interval = Duration::from_millis(20);
    let mut waited = Duration::ZERO;
    while !*finished.lock() && waited < deadline {
        thread::sleep(poll_interval);
        waited += poll_interval;
    }

    drop(stream);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_rate_alternates_48k_and_44_1k() {
        let primary_declared = FALLBACK_RATE_PRIMARY;
        let fallback = if primary_declared == FALLBACK_RATE_PRIMARY {
            FALLBACK_RATE_SECONDARY
        } else {
            FALLBACK_RATE_PRIMARY
        };
        assert_eq!(fallback, FALLBACK_RATE_SECONDARY);

        let other_declared = 16_000u32;
        let fallback2 = if other_declared == FALLBACK_RATE_PRIMARY {
            FALLBACK_RATE_SECONDARY
        } else {
            FALLBACK_RATE_PRIMARY
        };
        assert_eq!(fallback2, FALLBACK_RATE_PRIMARY);
    }

    #[test]
    fn empty_pcm_is_a_no_op() {
        let sink = AudioSink::new(None, Arc::new(TtsMetrics::new()));
        // Must not panic or attempt to open a device for empty input.
        sink.play(&[], 24_000, 1);
    }
}
