//! Core types shared by the energy-threshold VAD state machine and engine trait.

/// Two-state voice-activity machine: `Silence` while waiting for speech onset,
/// `Speech` while an utterance is accumulating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VadState {
    #[default]
    Silence,
    Speech,
}

/// Boundary events emitted by the state machine as it crosses the
/// speech/silence debounce thresholds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VadEvent {
    SpeechStart { timestamp_ms: u64, energy_db: f32 },
    SpeechEnd {
        timestamp_ms: u64,
        duration_ms: u64,
        energy_db: f32,
    },
}

/// Tunables for the energy-threshold VAD: onset/offset hysteresis around an
/// adaptive noise floor, debounce guards against chattering, and the frame
/// geometry the engine expects its input in.
#[derive(Debug, Clone, PartialEq)]
pub struct VadConfig {
    /// dB above the noise floor required to start considering a frame speech.
    pub onset_threshold_db: f32,
    /// dB above the noise floor below which a frame is considered silence
    /// again; kept below `onset_threshold_db` for hysteresis.
    pub offset_threshold_db: f32,
    /// Exponential-moving-average smoothing factor for the noise floor.
    pub ema_alpha: f32,
    /// Minimum contiguous speech-candidate duration before emitting `SpeechStart`.
    pub speech_debounce_ms: u32,
    /// Minimum contiguous silence duration before emitting `SpeechEnd`.
    pub silence_debounce_ms: u32,
    /// Starting noise floor before any adaptation has taken place.
    pub initial_floor_db: f32,
    pub frame_size_samples: usize,
    pub sample_rate_hz: u32,
}

impl Default for VadConfig {
    fn default() -> Self {
        Self {
            onset_threshold_db: 9.0,
            offset_threshold_db: 6.0,
            ema_alpha: 0.02,
            speech_debounce_ms: 200,
            silence_debounce_ms: 400,
            initial_floor_db: -50.0,
            frame_size_samples: crate::constants::FRAME_SIZE_SAMPLES,
            sample_rate_hz: crate::constants::SAMPLE_RATE_HZ,
        }
    }
}

impl VadConfig {
    pub fn frame_duration_ms(&self) -> f32 {
        (self.frame_size_samples as f32 * 1000.0) / self.sample_rate_hz as f32
    }

    pub fn speech_debounce_frames(&self) -> u32 {
        ((self.speech_debounce_ms as f32 / self.frame_duration_ms()).ceil() as u32).max(1)
    }

    pub fn silence_debounce_frames(&self) -> u32 {
        ((self.silence_debounce_ms as f32 / self.frame_duration_ms()).ceil() as u32).max(1)
    }
}

/// Running counters surfaced for diagnostics and telemetry export.
#[derive(Debug, Clone, Default)]
pub struct VadMetrics {
    pub frames_processed: u64,
    pub speech_segments: u64,
    pub total_speech_ms: u64,
    pub total_silence_ms: u64,
    pub last_energy_db: f32,
    pub current_noise_floor_db: f32,
}
