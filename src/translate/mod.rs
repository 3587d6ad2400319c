pub mod factory;
pub mod google;
pub mod interface;
pub mod languages;

pub use factory::TranslatorFactory;
pub use google::GoogleTranslator;
pub use interface::{EngineError, TranslateRequest, TranslateResponse, Translation, TranslationEngine};
