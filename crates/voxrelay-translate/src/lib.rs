//! Translation capability abstraction: a tagged-variant provider interface
//! plus the glossary pre-translation rewrite/hint mechanism.

pub mod glossary;
pub mod providers;
pub mod translator;
pub mod types;

pub use glossary::Glossary;
pub use translator::{Translator, TranslatorInfo};
pub use types::{TranslationEvent, TranslationRequest};
