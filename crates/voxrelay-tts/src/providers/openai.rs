//! Cloud TTS backed by OpenAI's streaming speech endpoint. Declares its
//! native rate as 24 kHz mono PCM16, matching the provider's documented
//! output; the Audio Sink resamples if the output device rejects that rate.

use async_trait::async_trait;
use futures::StreamExt;
use serde::Serialize;

use crate::engine::{SynthesisEvent, TtsEngine};
use crate::error::{TtsError, TtsResult};
use crate::types::{SynthesisOptions, TtsConfig, VoiceInfo};
use crate::next_synthesis_id;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const NATIVE_SAMPLE_RATE: u32 = 24_000;
pub const NATIVE_CHANNELS: u16 = 1;

#[derive(Debug, Clone)]
pub struct OpenAiTtsConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub voice: String,
    pub speed: f32,
}

impl OpenAiTtsConfig {
    pub fn from_env(model: String, voice: String, speed: f32) -> TtsResult<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| TtsError::Configuration("OPENAI_API_KEY is not set".to_string()))?;
        let base_url = std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Ok(Self {
            api_key,
            base_url,
            model,
            voice,
            speed,
        })
    }
}

pub struct OpenAiTtsEngine {
    client: reqwest::Client,
    provider_config: OpenAiTtsConfig,
    config: TtsConfig,
}

impl OpenAiTtsEngine {
    pub fn new(provider_config: OpenAiTtsConfig) -> TtsResult<Self> {
        let client = voxrelay_foundation::net::build_http_client()
            .map_err(TtsError::Configuration)?;
        Ok(Self {
            client,
            provider_config,
            config: TtsConfig::default(),
        })
    }
}

#[async_trait]
impl TtsEngine for OpenAiTtsEngine {
    fn name(&self) -> &str {
        "openai"
    }

    fn version(&self) -> &str {
        "1"
    }

    async fn initialize(&mut self, config: TtsConfig) -> TtsResult<()> {
        self.config = config;
        Ok(())
    }

    async fn is_available(&self) -> bool {
        !self.provider_config.api_key.is_empty()
    }

    async fn synthesize(
        &mut self,
        text: &str,
        options: Option<SynthesisOptions>,
    ) -> TtsResult<SynthesisEvent> {
        let synthesis_id = next_synthesis_id();
        if text.is_empty() {
            return Ok(SynthesisEvent::Completed {
                synthesis_id,
                total_duration_ms: 0,
            });
        }

        let voice = options
            .as_ref()
            .and_then(|o| o.voice.clone())
            .unwrap_or_else(|| self.provider_config.voice.clone());
        let speed = self.provider_config.speed;

        let body = SpeechRequest {
            model: self.provider_config.model.clone(),
            input: text.to_string(),
            voice,
            response_format: "pcm".to_string(),
            speed,
        };

        let response = self
            .client
            .post(format!("{}/audio/speech", self.provider_config.base_url))
            .bearer_auth(&self.provider_config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| TtsError::SynthesisError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(TtsError::SynthesisError(format!("{status}: {text}")));
        }

        let mut data = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| TtsError::SynthesisError(e.to_string()))?;
            data.extend_from_slice(&chunk);
        }

        Ok(SynthesisEvent::AudioData {
            synthesis_id,
            data,
            sample_rate: NATIVE_SAMPLE_RATE,
            channels: NATIVE_CHANNELS,
        })
    }

    async fn list_voices(&self) -> TtsResult<Vec<VoiceInfo>> {
        const VOICES: &[&str] = &["alloy", "echo", "fable", "onyx", "nova", "shimmer"];
        Ok(VOICES
            .iter()
            .map(|v| VoiceInfo {
                id: v.to_string(),
                name: v.to_string(),
                language: "multi".to_string(),
                gender: None,
                age: None,
                properties: Default::default(),
            })
            .collect())
    }

    async fn set_voice(&mut self, voice_id: &str) -> TtsResult<()> {
        self.provider_config.voice = voice_id.to_string();
        Ok(())
    }

    async fn stop_synthesis(&mut self) -> TtsResult<()> {
        Ok(())
    }

    fn config(&self) -> &TtsConfig {
        &self.config
    }

    async fn shutdown(&mut self) -> TtsResult<()> {
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct SpeechRequest {
    model: String,
    input: String,
    voice: String,
    response_format: String,
    speed: f32,
}
