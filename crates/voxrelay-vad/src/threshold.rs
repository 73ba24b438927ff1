//! Adaptive noise-floor tracker used to turn a raw dBFS reading into the
//! speech/silence candidate decision the state machine debounces.

use crate::types::VadConfig;

pub struct AdaptiveThreshold {
    floor_db: f32,
    onset_threshold_db: f32,
    offset_threshold_db: f32,
    ema_alpha: f32,
}

impl AdaptiveThreshold {
    pub fn new(config: &VadConfig) -> Self {
        Self {
            floor_db: config.initial_floor_db,
            onset_threshold_db: config.onset_threshold_db,
            offset_threshold_db: config.offset_threshold_db,
            ema_alpha: config.ema_alpha,
        }
    }

    pub fn current_floor(&self) -> f32 {
        self.floor_db
    }

    pub fn should_activate(&self, energy_db: f32) -> bool {
        energy_db - self.floor_db >= self.onset_threshold_db
    }

    pub fn should_deactivate(&self, energy_db: f32) -> bool {
        energy_db - self.floor_db < self.offset_threshold_db
    }

    /// Only adapt the floor while not in active speech, so loud speech
    /// doesn't drag the noise floor up and desensitize onset detection.
    pub fn update(&mut self, energy_db: f32, is_speech: bool) {
        if is_speech {
            return;
        }
        self.floor_db = self.ema_alpha * energy_db + (1.0 - self.ema_alpha) * self.floor_db;
    }

    pub fn reset(&mut self, initial_floor_db: f32) {
        self.floor_db = initial_floor_db;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floor_adapts_only_during_silence() {
        let config = VadConfig {
            ema_alpha: 0.5,
            initial_floor_db: -50.0,
            ..Default::default()
        };
        let mut threshold = AdaptiveThreshold::new(&config);
        threshold.update(-30.0, true);
        assert_eq!(threshold.current_floor(), -50.0);
        threshold.update(-30.0, false);
        assert_eq!(threshold.current_floor(), -40.0);
    }

    #[test]
    fn activation_requires_onset_margin_above_floor() {
        let config = VadConfig {
            onset_threshold_db: 10.0,
            initial_floor_db: -50.0,
            ..Default::default()
        };
        let threshold = AdaptiveThreshold::new(&config);
        assert!(!threshold.should_activate(-45.0));
        assert!(threshold.should_activate(-39.0));
    }
}
