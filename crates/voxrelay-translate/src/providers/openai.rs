use async_trait::async_trait;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use voxrelay_foundation::error::TranslationError;

use crate::translator::{Translator, TranslatorInfo};
use crate::types::{TranslationEvent, TranslationRequest};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Clone)]
pub struct OpenAiTranslatorConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub max_retries: u32,
}

impl OpenAiTranslatorConfig {
    pub fn from_env(model: String) -> Result<Self, TranslationError> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| TranslationError::InvalidConfig(
            "OPENAI_API_KEY is not set".to_string(),
        ))?;
        let base_url = std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Ok(Self {
            api_key,
            base_url,
            model,
            max_retries: 3,
        })
    }
}

/// Chat-completions-backed translator. Streams `delta.content` fragments
/// through the same Incremental Text Assembler contract as the transcriber,
/// so duplicate/overlapping fragments fold identically on both sides.
#[derive(Debug)]
pub struct OpenAiTranslator {
    client: reqwest::Client,
    config: OpenAiTranslatorConfig,
}

impl OpenAiTranslator {
    pub fn new(config: OpenAiTranslatorConfig) -> Result<Self, TranslationError> {
        let client = voxrelay_foundation::net::build_http_client()
            .map_err(TranslationError::InvalidConfig)?;
        Ok(Self { client, config })
    }

    fn system_prompt(&self, request: &TranslationRequest) -> String {
        let mut prompt = format!(
            "You are a professional simultaneous interpreter. Translate the user's \
             message from {} into {}. Output only the translation, nothing else.",
            request.source_language, request.target_language
        );
        if let Some(topic) = &request.topic_hint {
            prompt.push_str(&format!(" The conversation topic is: {topic}."));
        }
        if let Some(hint) = &request.glossary_hint {
            prompt.push(' ');
            prompt.push_str(hint);
        }
        prompt
    }

    fn messages(&self, request: &TranslationRequest) -> Vec<ChatMessage> {
        let mut messages = vec![ChatMessage {
            role: "system".to_string(),
            content: self.system_prompt(request),
        }];
        for (source, target) in &request.history {
            messages.push(ChatMessage {
                role: "user".to_string(),
                content: source.clone(),
            });
            messages.push(ChatMessage {
                role: "assistant".to_string(),
                content: target.clone(),
            });
        }
        messages.push(ChatMessage {
            role: "user".to_string(),
            content: request.source_line.clone(),
        });
        messages
    }
}

#[async_trait]
impl Translator for OpenAiTranslator {
    fn info(&self) -> TranslatorInfo {
        TranslatorInfo {
            id: "openai".to_string(),
            name: format!("OpenAI ({})", self.config.model),
            requires_network: true,
            streaming: true,
        }
    }

    async fn translate(
        &self,
        request: TranslationRequest,
        events: mpsc::Sender<TranslationEvent>,
    ) -> Result<(), TranslationError> {
        let body = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: self.messages(&request),
            temperature: request.temperature,
            stream: true,
        };

        let mut attempt = 0;
        let mut backoff_ms = 250u64;
        loop {
            attempt += 1;
            match self.stream_once(&body, &events).await {
                Ok(()) => return Ok(()),
                Err(e) if attempt >= self.config.max_retries => {
                    tracing::warn!(error = %e, attempt, "translation request exhausted retries");
                    let _ = events
                        .send(TranslationEvent::Error {
                            code: "translate.exhausted".to_string(),
                            message: e.to_string(),
                        })
                        .await;
                    return Err(e);
                }
                Err(e) => {
                    tracing::debug!(error = %e, attempt, "translation request failed, retrying");
                    tokio::time::sleep(std::time::Duration::from_millis(backoff_ms)).await;
                    backoff_ms = (backoff_ms * 2).min(4_000);
                }
            }
        }
    }
}

impl OpenAiTranslator {
    async fn stream_once(
        &self,
        body: &ChatCompletionRequest,
        events: &mpsc::Sender<TranslationEvent>,
    ) -> Result<(), TranslationError> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| TranslationError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(TranslationError::RequestFailed(format!("{status}: {text}")));
        }

        let mut stream = response.bytes_stream();
        let mut buffered = String::new();
        let mut accumulated = String::new();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| TranslationError::RequestFailed(e.to_string()))?;
            buffered.push_str(&String::from_utf8_lossy(&chunk));

            while let Some(pos) = buffered.find('\n') {
                let line = buffered[..pos].trim().to_string();
                buffered.drain(..=pos);
                let Some(payload) = line.strip_prefix("data: ") else {
                    continue;
                };
                if payload == "[DONE]" {
                    if events
                        .send(TranslationEvent::Final { text: accumulated.clone() })
                        .await
                        .is_err()
                    {
                        return Ok(()); // receiver dropped: treat as cancellation
                    }
                    return Ok(());
                }
                let chunk: ChatCompletionChunk = match serde_json::from_str(payload) {
                    Ok(c) => c,
                    Err(_) => continue, // malformed/protocol noise, ignore and continue
                };
                if let Some(delta) = chunk
                    .choices
                    .first()
                    .and_then(|c| c.delta.content.clone())
                {
                    if delta.is_empty() {
                        continue;
                    }
                    accumulated.push_str(&delta);
                    if events
                        .send(TranslationEvent::Partial { text: delta })
                        .await
                        .is_err()
                    {
                        return Ok(());
                    }
                }
            }
        }

        if !accumulated.is_empty() {
            let _ = events
                .send(TranslationEvent::Final { text: accumulated })
                .await;
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionChunk {
    choices: Vec<ChatCompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionChoice {
    delta: ChatCompletionDelta,
}

#[derive(Debug, Deserialize, Default)]
struct ChatCompletionDelta {
    content: Option<String>,
}
