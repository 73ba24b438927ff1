use serde::{Deserialize, Serialize};

/// A finalized source line plus the context a translator is allowed to use.
#[derive(Debug, Clone)]
pub struct TranslationRequest {
    pub source_line: String,
    pub source_language: String,
    pub target_language: String,
    /// Up to `chunk_history` prior `(source, target)` pairs, oldest first.
    pub history: Vec<(String, String)>,
    pub topic_hint: Option<String>,
    /// Rendered glossary hint (target-side terms the translator must preserve verbatim).
    pub glossary_hint: Option<String>,
    pub temperature: f32,
}

/// Mirrors `voxrelay_stt::types::TranscriptionEvent`'s delta/done shape so the
/// Incremental Text Assembler folds translator output identically to ASR output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TranslationEvent {
    Partial { text: String },
    Final { text: String },
    Error { code: String, message: String },
}
