pub mod echo;
pub mod openai;

pub use echo::EchoTranslator;
pub use openai::{OpenAiTranslator, OpenAiTranslatorConfig};
