//! Wraps a [`VadEngine`] to turn a stream of fixed-size PCM16 frames into
//! discrete [`Utterance`]s: buffers samples while `Speech` is active and
//! enforces the `min_speech_ms`/`max_utterance_ms` guards. In `ServerSide`
//! mode there is no local VAD boundary at all — every frame is buffered and
//! the caller finalizes via [`Segmenter::flush`] once the transcriber itself
//! reports a `done` event.

use crate::config::{UnifiedVadConfig, VadMode};
use crate::energy::EnergyCalculator;
use crate::energy_engine::EnergyThresholdVad;
use crate::engine::VadEngine;
use crate::types::{VadConfig, VadEvent, VadState};

pub type SegmenterConfig = UnifiedVadConfig;

/// One finalized span of speech: contiguous PCM16 samples plus the
/// wall-clock boundaries the segmenter observed them under.
#[derive(Debug, Clone)]
pub struct Utterance {
    pub id: u64,
    pub start_timestamp_ms: u64,
    pub end_timestamp_ms: u64,
    pub samples: Vec<i16>,
    pub sample_rate_hz: u32,
}

pub struct Segmenter {
    mode: VadMode,
    engine: Option<Box<dyn VadEngine>>,
    cfg: SegmenterConfig,
    buffer: Vec<i16>,
    speech_start_ms: u64,
    next_id: u64,
    /// Ambient noise-floor calibration (§4.1, `--ambient-duration`): while
    /// `Some`, incoming frames feed the running dBFS average instead of the
    /// VAD engine, so speech detection never arms mid-calibration.
    calibration: Option<AmbientCalibration>,
}

struct AmbientCalibration {
    energy_calc: EnergyCalculator,
    frames_target: u32,
    frames_seen: u32,
    energy_sum_db: f64,
}

impl Segmenter {
    pub fn new(cfg: SegmenterConfig) -> Self {
        let engine: Option<Box<dyn VadEngine>> = match cfg.mode {
            VadMode::EnergyThreshold => {
                let vad_config = VadConfig {
                    onset_threshold_db: cfg.energy.onset_threshold_db,
                    offset_threshold_db: cfg.energy.offset_threshold_db,
                    ema_alpha: cfg.energy.ema_alpha,
                    speech_debounce_ms: cfg.energy.speech_debounce_ms,
                    silence_debounce_ms: cfg.energy.silence_debounce_ms,
                    initial_floor_db: cfg.energy.initial_floor_db,
                    frame_size_samples: cfg.frame_size_samples,
                    sample_rate_hz: cfg.sample_rate_hz,
                };
                Some(Box::new(EnergyThresholdVad::new(vad_config)))
            }
            VadMode::ServerSide => None,
        };

        let calibration = if cfg.mode == VadMode::EnergyThreshold && cfg.ambient_calibration_ms > 0 {
            let frames_target =
                (cfg.ambient_calibration_ms as f32 / cfg.frame_duration_ms()).ceil() as u32;
            if frames_target > 0 {
                Some(AmbientCalibration {
                    energy_calc: EnergyCalculator::new(),
                    frames_target,
                    frames_seen: 0,
                    energy_sum_db: 0.0,
                })
            } else {
                None
            }
        } else {
            None
        };

        Self {
            mode: cfg.mode,
            engine,
            cfg,
            buffer: Vec::new(),
            speech_start_ms: 0,
            next_id: 0,
            calibration,
        }
    }

    /// Feed one fixed-size frame of PCM16 (length must equal
    /// `cfg.frame_size_samples` in `EnergyThreshold` mode). Returns a
    /// finalized utterance whenever a speech segment closes, either on a VAD
    /// boundary or because `max_utterance_ms` was reached.
    pub fn process_frame(&mut self, frame: &[i16]) -> Result<Option<Utterance>, String> {
        if self.calibrate_frame(frame) {
            return Ok(None);
        }
        match self.mode {
            VadMode::ServerSide => {
                if self.buffer.is_empty() {
                    self.speech_start_ms = self.elapsed_ms_estimate();
                }
                self.buffer.extend_from_slice(frame);
                Ok(None)
            }
            VadMode::EnergyThreshold => self.process_energy_frame(frame),
        }
    }

    fn process_energy_frame(&mut self, frame: &[i16]) -> Result<Option<Utterance>, String> {
        let engine = self
            .engine
            .as_mut()
            .expect("engine present in EnergyThreshold mode");
        let event = engine.process(frame)?;

        match event {
            Some(VadEvent::SpeechStart { timestamp_ms, .. }) => {
                self.buffer.clear();
                self.buffer.extend_from_slice(frame);
                self.speech_start_ms = timestamp_ms;
                Ok(None)
            }
            Some(VadEvent::SpeechEnd { timestamp_ms, .. }) => {
                self.buffer.extend_from_slice(frame);
                let duration_ms = timestamp_ms.saturating_sub(self.speech_start_ms);
                if duration_ms < self.cfg.min_speech_ms as u64 {
                    // Too short to count as an utterance - a noise blip, not speech.
                    self.buffer.clear();
                    return Ok(None);
                }
                Ok(Some(self.finalize(timestamp_ms)))
            }
            None => {
                if engine.current_state() != VadState::Speech {
                    return Ok(None);
                }
                self.buffer.extend_from_slice(frame);

                let elapsed_ms = self.cfg.frame_duration_ms()
                    * (self.buffer.len() as f32 / self.cfg.frame_size_samples.max(1) as f32);
                if elapsed_ms as u32 >= self.cfg.max_utterance_ms {
                    let end_ts = self.speech_start_ms + elapsed_ms as u64;
                    engine.reset();
                    return Ok(Some(self.finalize(end_ts)));
                }
                Ok(None)
            }
        }
    }

    /// Force-finalize whatever is currently buffered. Used in `ServerSide`
    /// mode when the transcriber reports `done`, and on shutdown to flush a
    /// trailing partial utterance rather than discard it.
    pub fn flush(&mut self, end_timestamp_ms: u64) -> Option<Utterance> {
        if self.buffer.is_empty() {
            return None;
        }
        Some(self.finalize(end_timestamp_ms))
    }

    /// Feeds one frame into the ambient calibration average, if still
    /// calibrating. Returns `true` when the caller should treat this frame
    /// as consumed (no VAD/segmentation happened). Seeds the engine's
    /// adaptive floor from the measured average on the calibration window's
    /// last frame.
    fn calibrate_frame(&mut self, frame: &[i16]) -> bool {
        let Some(calibration) = &mut self.calibration else {
            return false;
        };
        let db = calibration.energy_calc.calculate_dbfs(frame);
        calibration.energy_sum_db += db as f64;
        calibration.frames_seen += 1;
        if calibration.frames_seen >= calibration.frames_target {
            let avg_db = (calibration.energy_sum_db / calibration.frames_seen as f64) as f32;
            if let Some(engine) = &mut self.engine {
                engine.seed_floor_db(avg_db);
            }
            self.calibration = None;
        }
        true
    }

    pub fn reset(&mut self) {
        if let Some(engine) = &mut self.engine {
            engine.reset();
        }
        self.buffer.clear();
        self.speech_start_ms = 0;
    }

    fn finalize(&mut self, end_timestamp_ms: u64) -> Utterance {
        let id = self.next_id;
        self.next_id += 1;
        let samples = std::mem::take(&mut self.buffer);
        let utterance = Utterance {
            id,
            start_timestamp_ms: self.speech_start_ms,
            end_timestamp_ms,
            samples,
            sample_rate_hz: self.cfg.sample_rate_hz,
        };
        self.speech_start_ms = 0;
        utterance
    }

    /// Best-effort timestamp for `ServerSide` mode, where there is no VAD
    /// clock to read from; callers that need accurate timing should stamp
    /// frames upstream and pass real end timestamps to `flush`.
    fn elapsed_ms_estimate(&self) -> u64 {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EnergyThresholdConfig;
    use crate::constants::{FRAME_SIZE_SAMPLES, SAMPLE_RATE_HZ};

    fn test_cfg() -> SegmenterConfig {
        SegmenterConfig {
            mode: VadMode::EnergyThreshold,
            energy: EnergyThresholdConfig {
                onset_threshold_db: -30.0,
                offset_threshold_db: -35.0,
                initial_floor_db: -60.0,
                speech_debounce_ms: 60,
                silence_debounce_ms: 80,
                ema_alpha: 0.02,
            },
            min_speech_ms: 50,
            max_utterance_ms: 30_000,
            ambient_calibration_ms: 0,
            frame_size_samples: FRAME_SIZE_SAMPLES,
            sample_rate_hz: SAMPLE_RATE_HZ,
        }
    }

    fn tone_frame() -> Vec<i16> {
        (0..FRAME_SIZE_SAMPLES)
            .map(|i| {
                let phase = 2.0 * std::f32::consts::PI * 440.0 * i as f32 / SAMPLE_RATE_HZ as f32;
                (phase.sin() * 8000.0) as i16
            })
            .collect()
    }

    #[test]
    fn emits_utterance_on_speech_then_silence() {
        let mut seg = Segmenter::new(test_cfg());
        let speech = tone_frame();
        let silence = vec![0i16; FRAME_SIZE_SAMPLES];

        let mut utterance = None;
        for _ in 0..20 {
            if let Some(u) = seg.process_frame(&speech).unwrap() {
                utterance = Some(u);
                break;
            }
        }
        assert!(utterance.is_none());

        for _ in 0..20 {
            if let Some(u) = seg.process_frame(&silence).unwrap() {
                utterance = Some(u);
                break;
            }
        }

        let u = utterance.expect("expected a finalized utterance");
        assert!(!u.samples.is_empty());
        assert!(u.end_timestamp_ms >= u.start_timestamp_ms);
    }

    #[test]
    fn server_side_mode_buffers_without_local_boundary() {
        let mut cfg = test_cfg();
        cfg.mode = VadMode::ServerSide;
        let mut seg = Segmenter::new(cfg);

        let speech = tone_frame();
        for _ in 0..5 {
            assert_eq!(seg.process_frame(&speech).unwrap(), None);
        }

        let u = seg.flush(1000).expect("flush should finalize buffered audio");
        assert_eq!(u.samples.len(), FRAME_SIZE_SAMPLES * 5);
    }

    #[test]
    fn short_blip_below_min_speech_ms_is_discarded() {
        let mut cfg = test_cfg();
        cfg.min_speech_ms = 10_000; // effectively unreachable for a short blip
        let mut seg = Segmenter::new(cfg);

        let speech = tone_frame();
        let silence = vec![0i16; FRAME_SIZE_SAMPLES];

        let mut emitted = false;
        for _ in 0..5 {
            if seg.process_frame(&speech).unwrap().is_some() {
                emitted = true;
            }
        }
        for _ in 0..5 {
            if seg.process_frame(&silence).unwrap().is_some() {
                emitted = true;
            }
        }
        assert!(!emitted, "utterance shorter than min_speech_ms must not be emitted");
    }

    #[test]
    fn ambient_calibration_window_defers_speech_detection() {
        let mut cfg = test_cfg();
        // frame_duration_ms() is ~32ms at 16kHz/512 samples; 5 frames of
        // calibration is comfortably less than one tone_frame() speech burst.
        cfg.ambient_calibration_ms = (cfg.frame_duration_ms() * 5.0).ceil() as u32;
        let mut seg = Segmenter::new(cfg);

        let tone = tone_frame();
        for _ in 0..5 {
            assert_eq!(
                seg.process_frame(&tone).unwrap(),
                None,
                "frames inside the calibration window must never surface as speech"
            );
        }
        assert!(seg.calibration.is_none(), "calibration window should have closed by now");
    }

    #[test]
    fn zero_ambient_duration_skips_calibration() {
        let mut cfg = test_cfg();
        cfg.ambient_calibration_ms = 0;
        let seg = Segmenter::new(cfg);
        assert!(seg.calibration.is_none());
    }
}
