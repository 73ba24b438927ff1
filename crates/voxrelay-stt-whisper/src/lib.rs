use async_trait::async_trait;
use thiserror::Error;
use tracing::{error, info, warn};
use std::path::PathBuf;
use std::sync::Arc;
use parking_lot::Mutex;
use std::mem;

use whisper_rs::{WhisperContext, FullParams, SamplingStrategy, WhisperContextParameters};

use voxrelay_stt::plugin::{
    SttPlugin, SttPluginError, PluginInfo, PluginCapabilities, SttPluginFactory,
};
use voxrelay_stt::types::{TranscriptionConfig, TranscriptionEvent};

const DEFAULT_MODEL_PATH: &str = "models/whisper/ggml-tiny.en.bin";

#[derive(Debug, Error)]
pub enum FasterWhisperError {
    #[error("Initialization failed: {0}")]
    InitializationFailed(String),
    #[error("Transcription failed: {0}")]
    TranscriptionFailed(String),
}

/// Which `whisper.cpp` device hint `--whisper-device` resolved to. whisper-rs
/// only runs on CPU unless built with a GPU feature this crate does not
/// enable, so `Cuda` is accepted but logged as a fallback to `Cpu`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WhisperDevice {
    Auto,
    Cpu,
    Cuda,
}

impl Default for WhisperDevice {
    fn default() -> Self {
        Self::Auto
    }
}

/// Backs both `--transcriber faster-whisper` and `--transcriber whispercpp`:
/// Rust has one practical `whisper.cpp` binding (`whisper-rs`), so both CLI
/// variants select this plugin and differ only in the thread/device hints
/// recorded here (see DESIGN.md).
pub struct FasterWhisperPlugin {
    ctx: Option<WhisperContext>,
    audio_buffer: Arc<Mutex<Vec<f32>>>,
    config: TranscriptionConfig,
    threads: u32,
    device: WhisperDevice,
}

impl std::fmt::Debug for FasterWhisperPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FasterWhisperPlugin")
            .field("audio_buffer", &self.audio_buffer)
            .field("config", &self.config)
            .field("threads", &self.threads)
            .field("device", &self.device)
            .finish()
    }
}

impl Default for FasterWhisperPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl FasterWhisperPlugin {
    pub fn new() -> Self {
        Self {
            ctx: None,
            audio_buffer: Arc::new(Mutex::new(Vec::new())),
            config: TranscriptionConfig::default(),
            threads: 4,
            device: WhisperDevice::Auto,
        }
    }

    /// `--whisper-threads`/`--whisper-device` configured construction.
    pub fn new_with_options(threads: u32, device: WhisperDevice) -> Self {
        if device == WhisperDevice::Cuda {
            warn!("whisper-device=cuda requested but this build only supports CPU inference; falling back to CPU");
        }
        Self {
            threads: threads.max(1),
            device,
            ..Self::new()
        }
    }
}

#[async_trait]
impl SttPlugin for FasterWhisperPlugin {
    fn info(&self) -> PluginInfo {
        PluginInfo {
            id: "faster-whisper".to_string(),
            name: "Whisper (whisper.cpp)".to_string(),
            description: "Local file-mode transcription via whisper-rs".to_string(),
            requires_network: false,
            is_local: true,
            is_available: PathBuf::from(&self.config.model_path).exists()
                || PathBuf::from(DEFAULT_MODEL_PATH).exists(),
            supported_languages: vec!["en".to_string()],
            memory_usage_mb: Some(1000),
        }
    }

    fn capabilities(&self) -> PluginCapabilities {
        PluginCapabilities {
            streaming: false,
            batch: true,
            word_timestamps: false,
            confidence_scores: false,
            speaker_diarization: false,
            auto_punctuation: true,
            custom_vocabulary: false,
        }
    }

    async fn is_available(&self) -> Result<bool, SttPluginError> {
        let path = if self.config.model_path.is_empty() {
            DEFAULT_MODEL_PATH
        } else {
            &self.config.model_path
        };
        Ok(PathBuf::from(path).exists())
    }

    async fn initialize(&mut self, config: TranscriptionConfig) -> Result<(), SttPluginError> {
        info!("Initializing whisper plugin with whisper-rs ({} threads)", self.threads);
        let model_path = if config.model_path.is_empty() {
            DEFAULT_MODEL_PATH.to_string()
        } else {
            config.model_path.clone()
        };
        self.config = config;
        self.config.model_path = model_path.clone();

        if !PathBuf::from(&model_path).exists() {
            let err_msg = format!("Model file not found at: {}", &model_path);
            error!("{}", err_msg);
            return Err(SttPluginError::ModelLoadFailed(err_msg));
        }

        let context = WhisperContext::new_with_params(&model_path, WhisperContextParameters::default())
            .map_err(|e| SttPluginError::InitializationFailed(e.to_string()))?;

        self.ctx = Some(context);
        info!("whisper-rs context created successfully from {}", &self.config.model_path);
        Ok(())
    }

    async fn process_audio(
        &mut self,
        samples: &[i16],
    ) -> Result<Option<TranscriptionEvent>, SttPluginError> {
        if self.ctx.is_none() {
            return Err(SttPluginError::InitializationFailed("Plugin not initialized".to_string()));
        }

        let mut buffer = self.audio_buffer.lock();
        let mut float_samples = vec![0.0f32; samples.len()];
        whisper_rs::convert_integer_to_float_audio(samples, &mut float_samples)
            .map_err(|e| SttPluginError::ProcessingError(format!("{:?}", e)))?;
        buffer.extend_from_slice(&float_samples);

        // Batch engine: no incremental result until finalize().
        Ok(None)
    }

    async fn finalize(&mut self) -> Result<Option<TranscriptionEvent>, SttPluginError> {
        info!("Finalizing transcription with whisper-rs");

        let audio_data = {
            let mut buffer = self.audio_buffer.lock();
            if buffer.is_empty() {
                return Ok(None);
            }
            mem::take(&mut *buffer)
        };

        let ctx = self.ctx.as_ref().ok_or_else(|| {
            SttPluginError::InitializationFailed("Context not available".to_string())
        })?;

        let mut state = ctx.create_state()
            .map_err(|e| SttPluginError::InitializationFailed(e.to_string()))?;

        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
        params.set_n_threads(self.threads as i32);
        let language = self.config.language.as_deref().unwrap_or("en");
        params.set_language(Some(language));

        state.full(params, &audio_data)
            .map_err(|e| SttPluginError::TranscriptionFailed(e.to_string()))?;

        let num_segments = state.full_n_segments();

        let mut full_text = String::new();
        for i in 0..num_segments {
            let segment = state
                .get_segment(i)
                .ok_or_else(|| SttPluginError::TranscriptionFailed("missing segment".to_string()))?;
            let text = segment
                .to_str()
                .map_err(|e| SttPluginError::TranscriptionFailed(e.to_string()))?;
            full_text.push_str(text);
        }

        Ok(Some(TranscriptionEvent::Final {
            utterance_id: voxrelay_stt::next_utterance_id(),
            text: full_text.trim().to_string(),
            words: None,
        }))
    }

    async fn reset(&mut self) -> Result<(), SttPluginError> {
        info!("Resetting whisper plugin state");
        self.audio_buffer.lock().clear();
        Ok(())
    }
}

pub struct FasterWhisperPluginFactory;

impl SttPluginFactory for FasterWhisperPluginFactory {
    fn create(&self) -> Result<Box<dyn SttPlugin>, SttPluginError> {
        Ok(Box::new(FasterWhisperPlugin::new()))
    }

    fn plugin_info(&self) -> PluginInfo {
        FasterWhisperPlugin::new().info()
    }

    fn check_requirements(&self) -> Result<(), SttPluginError> {
        if !PathBuf::from(DEFAULT_MODEL_PATH).exists() {
            return Err(SttPluginError::NotAvailable {
                reason: format!("whisper model not found at {}", DEFAULT_MODEL_PATH),
            });
        }
        Ok(())
    }
}
