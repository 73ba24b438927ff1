use serde::{Deserialize, Serialize};

use super::constants::{FRAME_SIZE_SAMPLES, SAMPLE_RATE_HZ};

/// Which segmentation strategy drives utterance boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum VadMode {
    /// Energy-threshold VAD with an adaptive noise floor (§4.1 primary algorithm).
    EnergyThreshold,
    /// The transcriber declares server-side VAD; the segmenter becomes a
    /// pass-through and relies on the transcriber's own `done` events.
    ServerSide,
}

impl Default for VadMode {
    fn default() -> Self {
        Self::EnergyThreshold
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnergyThresholdConfig {
    pub onset_threshold_db: f32,
    pub offset_threshold_db: f32,
    pub ema_alpha: f32,
    pub speech_debounce_ms: u32,
    pub silence_debounce_ms: u32,
    pub initial_floor_db: f32,
}

impl Default for EnergyThresholdConfig {
    fn default() -> Self {
        Self {
            onset_threshold_db: 9.0,
            offset_threshold_db: 6.0,
            ema_alpha: 0.02,
            speech_debounce_ms: 200,
            silence_debounce_ms: 400,
            initial_floor_db: -50.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnifiedVadConfig {
    pub mode: VadMode,
    pub energy: EnergyThresholdConfig,
    /// Minimum utterance duration (`min_speech_ms`): finalize never fires
    /// before this, even once trailing silence is observed.
    pub min_speech_ms: u32,
    /// Force-finalize cap (`max_utterance_ms`), the advisory ceiling derived
    /// from `--phrase-time-limit` in configuration.
    pub max_utterance_ms: u32,
    /// Startup noise-floor calibration window (`ambient_calibration_ms`),
    /// derived from `--ambient-duration`. Zero disables calibration and
    /// leaves `energy.initial_floor_db` as the seeded floor.
    pub ambient_calibration_ms: u32,
    pub frame_size_samples: usize,
    pub sample_rate_hz: u32,
}

impl Default for UnifiedVadConfig {
    fn default() -> Self {
        Self {
            mode: VadMode::default(),
            energy: EnergyThresholdConfig::default(),
            min_speech_ms: 250,
            max_utterance_ms: 30_000,
            ambient_calibration_ms: 1_000,
            frame_size_samples: FRAME_SIZE_SAMPLES,
            sample_rate_hz: SAMPLE_RATE_HZ,
        }
    }
}

impl UnifiedVadConfig {
    pub fn frame_duration_ms(&self) -> f32 {
        (self.frame_size_samples as f32 * 1000.0) / self.sample_rate_hz as f32
    }
}
