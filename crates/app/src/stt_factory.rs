//! Selects and constructs the `StreamingStt` transcriber named by
//! `--transcriber`. Selection happens once, here, at Session construction —
//! no runtime reflection (§9 design note).

use voxrelay_foundation::VoxRelayError;
use voxrelay_stt::plugin::SttPlugin;
use voxrelay_stt::plugin_adapter::PluginAdapter;
use voxrelay_stt::plugins::NoOpPlugin;
use voxrelay_stt::{StreamingStt, TranscriptionConfig};

use crate::settings::{Cli, Transcriber, WhisperDeviceArg};

pub async fn build_transcriber(cli: &Cli) -> Result<Box<dyn StreamingStt>, VoxRelayError> {
    let plugin: Box<dyn SttPlugin> = match cli.transcriber {
        Transcriber::FasterWhisper | Transcriber::Whispercpp => {
            #[cfg(feature = "whisper")]
            {
                use voxrelay_stt_whisper::{FasterWhisperPlugin, WhisperDevice};
                let device = match cli.whisper_device {
                    WhisperDeviceArg::Auto => WhisperDevice::Auto,
                    WhisperDeviceArg::Cpu => WhisperDevice::Cpu,
                    WhisperDeviceArg::Cuda => WhisperDevice::Cuda,
                };
                Box::new(FasterWhisperPlugin::new_with_options(cli.whisper_threads, device))
            }
            #[cfg(not(feature = "whisper"))]
            {
                return Err(VoxRelayError::Fatal(
                    "--transcriber faster-whisper/whispercpp requires the `whisper` feature".to_string(),
                ));
            }
        }
        Transcriber::Vosk => {
            #[cfg(feature = "vosk")]
            {
                Box::new(voxrelay_stt_vosk::VoskPlugin::new())
            }
            #[cfg(not(feature = "vosk"))]
            {
                return Err(VoxRelayError::Fatal(
                    "--transcriber vosk requires the `vosk` feature".to_string(),
                ));
            }
        }
        Transcriber::Noop => Box::new(NoOpPlugin::new()),
    };

    let mut adapter = PluginAdapter::new(plugin);
    let config = TranscriptionConfig {
        enabled: true,
        model_path: cli.whisper_model.clone().unwrap_or_default(),
        partial_results: true,
        max_alternatives: 1,
        include_words: false,
        buffer_size_ms: 512,
        language: Some(cli.input_language.clone()),
    };
    adapter
        .initialize(config)
        .await
        .map_err(|e| VoxRelayError::Fatal(format!("transcriber model load failed: {e}")))?;
    Ok(Box::new(adapter))
}
