//! CLI surface and session configuration.
//!
//! `Cli` is the single entry point's argument grammar; `Settings` is the
//! validated, typed form the rest of the crate consumes. Provider secrets
//! (API keys, base URLs) are read directly from the environment by each
//! provider's own `from_env` constructor, not threaded through here.

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "voxrelay", author, version, about = "Real-time simultaneous-interpretation pipeline")]
pub struct Cli {
    /// List available input devices and exit.
    #[arg(long = "list-devices")]
    pub list_devices: bool,

    /// Input device name or index. Unset selects the system default.
    #[arg(long = "input-device")]
    pub input_device: Option<String>,

    /// Output device name or index. Unset selects the system default.
    #[arg(long = "output-device")]
    pub output_device: Option<String>,

    /// Source language tag (ISO 639-1), e.g. "en".
    #[arg(long = "input-language", default_value = "en")]
    pub input_language: String,

    /// Target language tag (ISO 639-1), e.g. "es".
    #[arg(long = "target-language", default_value = "es")]
    pub target_language: String,

    /// Enable translation. When false the target line equals the source line.
    #[arg(long = "translate", default_value_t = true, action = clap::ArgAction::Set)]
    pub translate: bool,

    /// Enable speech synthesis and playback of the translated line.
    #[arg(long = "tts", default_value_t = true, action = clap::ArgAction::Set)]
    pub tts: bool,

    /// Glossary/dictionary file: `source_term<TAB>target_term` per line.
    #[arg(long = "dictionary")]
    pub dictionary: Option<PathBuf>,

    /// Free-text topic hint passed to the translator.
    #[arg(long = "topic")]
    pub topic: Option<String>,

    /// Translator model name override.
    #[arg(long = "model", default_value = "gpt-4o-mini")]
    pub model: String,

    /// TTS voice name.
    #[arg(long = "voice")]
    pub voice: Option<String>,

    /// TTS provider.
    #[arg(long = "tts-provider", default_value = "openai")]
    pub tts_provider: TtsProvider,

    /// TTS model name override (provider-specific).
    #[arg(long = "tts-model", default_value = "tts-1")]
    pub tts_model: String,

    /// Transcriber backend.
    #[arg(long = "transcriber", default_value = "faster-whisper")]
    pub transcriber: Transcriber,

    /// Local whisper model path/name.
    #[arg(long = "whisper-model")]
    pub whisper_model: Option<String>,

    /// Local whisper inference thread count.
    #[arg(long = "whisper-threads", default_value_t = 4)]
    pub whisper_threads: u32,

    /// Local whisper device hint.
    #[arg(long = "whisper-device", default_value = "auto")]
    pub whisper_device: WhisperDeviceArg,

    /// Rolling translation-history pair count given to the translator as context.
    #[arg(long = "history", default_value_t = 4)]
    pub history: usize,

    /// Advisory ceiling on a single utterance's duration, in seconds (see
    /// DESIGN.md open-question (b): plumbed through as the segmenter's
    /// `max_utterance_ms`).
    #[arg(long = "phrase-time-limit", default_value_t = 30.0)]
    pub phrase_time_limit: f32,

    /// Advisory trailing-silence duration, in seconds, before an utterance is
    /// finalized (plumbed through as the segmenter's `silence_ms`).
    #[arg(long = "pause-threshold", default_value_t = 0.8)]
    pub pause_threshold: f32,

    /// Initial noise-calibration window, in seconds (see DESIGN.md
    /// open-question (b)): the segmenter averages this many seconds of
    /// input at startup and seeds the energy-threshold VAD's adaptive floor
    /// from it before arming speech detection.
    #[arg(long = "ambient-duration", default_value_t = 1.0)]
    pub ambient_duration: f32,

    /// TTS speech-rate hint, provider-specific units (best-effort).
    #[arg(long = "tts-speed", default_value_t = 1.0)]
    pub tts_speed: f32,

    /// Translator sampling temperature.
    #[arg(long = "temperature", default_value_t = 0.2)]
    pub temperature: f32,

    /// Transcript log file path.
    #[arg(long = "log-file", default_value = "logs/transcript.log")]
    pub log_file: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum TtsProvider {
    Openai,
    Edge,
    Coqui,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Transcriber {
    FasterWhisper,
    Whispercpp,
    Vosk,
    #[value(skip)]
    Noop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum WhisperDeviceArg {
    Auto,
    Cpu,
    Cuda,
}

/// Process exit codes per the external-interface contract: `0` clean
/// shutdown, `2` configuration error, `3` fatal device/model-load error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Clean = 0,
    Configuration = 2,
    Fatal = 3,
}

impl Cli {
    /// Cross-field validation beyond what clap's per-flag parsing covers.
    /// Configuration errors here must abort the Session before any audio flows.
    pub fn validate(&self) -> Result<(), String> {
        if self.history > 64 {
            return Err(format!("--history {} exceeds the supported maximum of 64", self.history));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(format!("--temperature {} out of range [0.0, 2.0]", self.temperature));
        }
        if self.phrase_time_limit <= 0.0 {
            return Err("--phrase-time-limit must be positive".to_string());
        }
        if self.pause_threshold <= 0.0 {
            return Err("--pause-threshold must be positive".to_string());
        }
        if self.ambient_duration <= 0.0 {
            return Err("--ambient-duration must be positive".to_string());
        }
        if matches!(self.transcriber, Transcriber::FasterWhisper | Transcriber::Whispercpp)
            && self.whisper_threads == 0
        {
            return Err("--whisper-threads must be at least 1".to_string());
        }
        if let Some(dict) = &self.dictionary {
            if !dict.exists() {
                return Err(format!("--dictionary path does not exist: {}", dict.display()));
            }
        }
        Ok(())
    }
}
