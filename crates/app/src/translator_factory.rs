//! Selects and constructs the `Translator` capability. There is one network
//! provider (OpenAI chat completions) plus the always-available echo
//! fallback used both for `--translate=false` and as the §7 degradation path.

use std::sync::Arc;

use voxrelay_foundation::VoxRelayError;
use voxrelay_translate::providers::{EchoTranslator, OpenAiTranslator};
use voxrelay_translate::Translator;

use crate::settings::Cli;

pub fn build_translator(cli: &Cli) -> Result<Arc<dyn Translator>, VoxRelayError> {
    if !cli.translate {
        return Ok(Arc::new(EchoTranslator));
    }
    let config = voxrelay_translate::providers::OpenAiTranslatorConfig::from_env(cli.model.clone())
        .map_err(|e| VoxRelayError::Fatal(format!("translator configuration error: {e}")))?;
    let translator = OpenAiTranslator::new(config)
        .map_err(|e| VoxRelayError::Fatal(format!("translator configuration error: {e}")))?;
    Ok(Arc::new(translator))
}
