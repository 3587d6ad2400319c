use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use super::google::GoogleTranslator;
use super::interface::TranslationEngine;
use crate::config::TranslatorConfig;

/// Factory for creating translation engines
pub struct TranslatorFactory;

impl TranslatorFactory {
    /// Create the engine named by `translator_config.engine`
    pub fn create_engine(config: &TranslatorConfig) -> Result<Arc<dyn TranslationEngine>> {
        info!("Initializing translation engine: {}", config.engine);

        match config.engine.as_str() {
            "google" => Ok(Arc::new(GoogleTranslator::new(config)?)),
            other => anyhow::bail!("Unknown translation engine: {}", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unknown_engine() {
        let config = TranslatorConfig {
            engine: "babelfish".to_string(),
            ..TranslatorConfig::default()
        };
        let err = TranslatorFactory::create_engine(&config).err().unwrap();
        assert_eq!(err.to_string(), "Unknown translation engine: babelfish");
    }

    #[test]
    fn builds_google_engine() {
        let engine = TranslatorFactory::create_engine(&TranslatorConfig::default()).unwrap();
        assert_eq!(engine.languages().len(), 108);
    }
}
