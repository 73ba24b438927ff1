use async_trait::async_trait;
use tokio::sync::mpsc;

use voxrelay_foundation::error::TranslationError;

use crate::translator::{Translator, TranslatorInfo};
use crate::types::{TranslationEvent, TranslationRequest};

/// Used as the §7 fallback when a real translator errors out, and directly
/// as `--translate=false`'s provider: echoes the source line unchanged so
/// the pipeline never blocks on translation.
#[derive(Debug, Default)]
pub struct EchoTranslator;

#[async_trait]
impl Translator for EchoTranslator {
    fn info(&self) -> TranslatorInfo {
        TranslatorInfo {
            id: "echo".to_string(),
            name: "Echo (no-op) translator".to_string(),
            requires_network: false,
            streaming: false,
        }
    }

    async fn translate(
        &self,
        request: TranslationRequest,
        events: mpsc::Sender<TranslationEvent>,
    ) -> Result<(), TranslationError> {
        let _ = events
            .send(TranslationEvent::Final {
                text: request.source_line,
            })
            .await;
        Ok(())
    }
}
