use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::language::{Language, AUTO_CODE};

/// Body accepted by `POST /api/translate`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateRequest {
    #[serde(default)]
    pub text: Option<String>,
    /// Missing means `auto`; an explicit `null` is kept as `None`.
    #[serde(default = "default_source_lang")]
    pub source_lang: Option<String>,
    /// Missing means `en`; an explicit `null` is kept as `None`.
    #[serde(default = "default_target_lang")]
    pub target_lang: Option<String>,
}

fn default_source_lang() -> Option<String> {
    Some(AUTO_CODE.to_string())
}

fn default_target_lang() -> Option<String> {
    Some("en".to_string())
}

/// Body returned by `POST /api/translate` on success
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateResponse {
    pub success: bool,
    pub translated_text: String,
    pub source_lang: String,
    pub target_lang: String,
}

/// Result of one engine call
#[derive(Debug, Clone, PartialEq)]
pub struct Translation {
    pub translated_text: String,
    /// Detected source when `auto` was requested, otherwise the requested one
    pub source_lang: String,
    pub target_lang: String,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Request timeout. Please try again.")]
    Timeout,

    #[error("Connection error. Please check your internet.")]
    Connection,

    #[error("Google Translate returned status {0}")]
    Status(u16),

    #[error("Translation error: {0}")]
    Other(String),
}

impl From<reqwest::Error> for EngineError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            EngineError::Timeout
        } else if err.is_connect() {
            EngineError::Connection
        } else {
            EngineError::Other(err.to_string())
        }
    }
}

/// Upstream machine translation used by the backend
#[async_trait]
pub trait TranslationEngine: Send + Sync {
    /// Translate `text`. `source` may be `auto`.
    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<Translation, EngineError>;

    /// Languages this engine accepts
    fn languages(&self) -> Vec<Language>;
}

/// An empty source means detection, same as `auto`.
pub fn normalize_source(source: Option<&str>) -> &str {
    match source {
        Some(s) if !s.is_empty() => s,
        _ => AUTO_CODE,
    }
}
