use async_trait::async_trait;
use std::fmt::Debug;
use tokio::sync::mpsc;

use voxrelay_foundation::error::TranslationError;

use crate::types::{TranslationEvent, TranslationRequest};

/// Metadata about a translation provider, mirrored on `voxrelay_stt`'s
/// `PluginInfo` so capability providers read the same way across stages.
#[derive(Debug, Clone)]
pub struct TranslatorInfo {
    pub id: String,
    pub name: String,
    pub requires_network: bool,
    pub streaming: bool,
}

/// Capability consumed by the Orchestrator: a finalized source line plus
/// rolling context goes in, a target-language line (optionally as deltas)
/// comes out. Implementations are selected once at Session construction;
/// no runtime reflection or registry indirection is needed beyond the
/// tagged `TranslatorConfig` the caller already resolved.
#[async_trait]
pub trait Translator: Send + Sync + Debug {
    fn info(&self) -> TranslatorInfo;

    /// Translate `request.source_line`, streaming zero or more `Partial`
    /// events followed by exactly one `Final` (or `Error`) onto `events`.
    /// A dropped receiver is treated as cancellation, not an error.
    async fn translate(
        &self,
        request: TranslationRequest,
        events: mpsc::Sender<TranslationEvent>,
    ) -> Result<(), TranslationError>;
}
