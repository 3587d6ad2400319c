use std::sync::Arc;

use crate::config::Config;
use crate::translate::{TranslationEngine, TranslatorFactory};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub engine: Arc<dyn TranslationEngine>,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let engine = TranslatorFactory::create_engine(&config.translator_config)?;
        Ok(Self::with_engine(config, engine))
    }

    pub fn with_engine(config: Config, engine: Arc<dyn TranslationEngine>) -> Self {
        Self { config, engine }
    }
}
