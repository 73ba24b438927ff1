//! Selects and constructs the `TtsEngine` named by `--tts-provider`.

use voxrelay_foundation::VoxRelayError;
use voxrelay_tts::{TtsConfig, TtsEngine};

use crate::settings::{Cli, TtsProvider};

pub async fn build_tts_engine(cli: &Cli) -> Result<Box<dyn TtsEngine>, VoxRelayError> {
    let mut engine: Box<dyn TtsEngine> = match cli.tts_provider {
        TtsProvider::Openai => {
            use voxrelay_tts::providers::{OpenAiTtsConfig, OpenAiTtsEngine};
            let voice = cli.voice.clone().unwrap_or_else(|| "alloy".to_string());
            let provider_config = OpenAiTtsConfig::from_env(cli.tts_model.clone(), voice, cli.tts_speed)
                .map_err(|e| VoxRelayError::Fatal(format!("tts configuration error: {e}")))?;
            let engine = OpenAiTtsEngine::new(provider_config)
                .map_err(|e| VoxRelayError::Fatal(format!("tts configuration error: {e}")))?;
            Box::new(engine)
        }
        TtsProvider::Edge | TtsProvider::Coqui => {
            #[cfg(feature = "tts-espeak")]
            {
                tracing::warn!(
                    requested = ?cli.tts_provider,
                    "requested TTS provider has no native Rust binding in this build; falling back to eSpeak"
                );
                Box::new(voxrelay_tts_espeak::EspeakEngine::new())
            }
            #[cfg(not(feature = "tts-espeak"))]
            {
                return Err(VoxRelayError::Fatal(format!(
                    "--tts-provider {:?} is not available in this build",
                    cli.tts_provider
                )));
            }
        }
    };

    let mut config = TtsConfig::default();
    config.default_voice = cli.voice.clone();
    config.speech_rate = Some((cli.tts_speed * 180.0).round() as u32);

    engine
        .initialize(config)
        .await
        .map_err(|e| VoxRelayError::Fatal(format!("tts engine init failed: {e}")))?;
    Ok(engine)
}
