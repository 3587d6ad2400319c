use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use super::interface::{EngineError, Translation, TranslationEngine};
use super::languages::supported_languages;
use crate::config::TranslatorConfig;
use crate::language::Language;

/// Google's free `translate_a/single` endpoint (`client=gtx`), no key needed
#[derive(Debug, Clone)]
pub struct GoogleTranslator {
    client: Client,
    api_url: String,
}

impl GoogleTranslator {
    pub fn new(config: &TranslatorConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self {
            client,
            api_url: config.upstream_url.clone(),
        })
    }
}

/// Pull the translation and detected language out of a gtx response.
///
/// The payload looks like `[[["Hola","Hello",...], ...], null, "en", ...]`:
/// element 0 holds one entry per sentence whose first item is the
/// translated segment, element 2 the detected source language.
pub fn parse_response(result: &Value, requested_source: &str) -> Result<(String, String), EngineError> {
    let sentences = result
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| EngineError::Other("unexpected response shape".to_string()))?;

    let parts: Vec<&str> = sentences
        .iter()
        .filter_map(|sentence| sentence.get(0).and_then(Value::as_str))
        .filter(|part| !part.is_empty())
        .collect();

    let detected = result
        .get(2)
        .and_then(Value::as_str)
        .unwrap_or(requested_source)
        .to_string();

    Ok((parts.join(" "), detected))
}

#[async_trait]
impl TranslationEngine for GoogleTranslator {
    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<Translation, EngineError> {
        debug!("Translating {} chars: {} -> {}", text.chars().count(), source, target);

        let response = self
            .client
            .get(&self.api_url)
            .query(&[
                ("client", "gtx"),
                ("sl", source),
                ("tl", target),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await?;

        let status = response.status();
        debug!("Google API response status: {}", status);
        if status != reqwest::StatusCode::OK {
            warn!("Google Translate returned status {}", status);
            return Err(EngineError::Status(status.as_u16()));
        }

        let result: Value = response.json().await?;
        let (translated_text, source_lang) = parse_response(&result, source)?;

        Ok(Translation {
            translated_text,
            source_lang,
            target_lang: target.to_string(),
        })
    }

    fn languages(&self) -> Vec<Language> {
        supported_languages()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::Query, http::StatusCode, routing::get, Json, Router};
    use serde_json::json;
    use std::collections::HashMap;
    use std::time::Duration;

    async fn spawn(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}/translate_a/single", addr)
    }

    fn config(url: String) -> TranslatorConfig {
        TranslatorConfig {
            upstream_url: url,
            ..TranslatorConfig::default()
        }
    }

    #[test]
    fn joins_sentence_segments() {
        let payload = json!([
            [["Hola.", "Hello.", null], ["", "", null], ["¿Cómo estás?", "How are you?", null]],
            null,
            "en"
        ]);
        let (text, detected) = parse_response(&payload, "auto").unwrap();
        assert_eq!(text, "Hola. ¿Cómo estás?");
        assert_eq!(detected, "en");
    }

    #[test]
    fn short_payload_keeps_requested_source() {
        let payload = json!([[["Hallo", "Hello"]]]);
        let (text, detected) = parse_response(&payload, "en").unwrap();
        assert_eq!(text, "Hallo");
        assert_eq!(detected, "en");
    }

    #[test]
    fn non_array_payload_is_rejected() {
        let err = parse_response(&json!({"oops": true}), "auto").unwrap_err();
        assert!(matches!(err, EngineError::Other(_)));
    }

    #[tokio::test]
    async fn sends_gtx_query() {
        let router = Router::new().route(
            "/translate_a/single",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                assert_eq!(params.get("client").map(String::as_str), Some("gtx"));
                assert_eq!(params.get("dt").map(String::as_str), Some("t"));
                let text = format!("{}:{}:{}", params["sl"], params["tl"], params["q"]);
                Json(json!([[[text, "x"]], null, "en"]))
            }),
        );
        let engine = GoogleTranslator::new(&config(spawn(router).await)).unwrap();

        let translation = engine.translate("Hello world", "auto", "es").await.unwrap();
        assert_eq!(translation.translated_text, "auto:es:Hello world");
        assert_eq!(translation.source_lang, "en");
        assert_eq!(translation.target_lang, "es");
    }

    #[tokio::test]
    async fn non_ok_status_is_reported() {
        let router = Router::new().route(
            "/translate_a/single",
            get(|| async { StatusCode::TOO_MANY_REQUESTS }),
        );
        let engine = GoogleTranslator::new(&config(spawn(router).await)).unwrap();

        let err = engine.translate("Hello", "en", "es").await.unwrap_err();
        assert_eq!(err, EngineError::Status(429));
        assert_eq!(err.to_string(), "Google Translate returned status 429");
    }

    #[tokio::test]
    async fn slow_upstream_times_out() {
        let router = Router::new().route(
            "/translate_a/single",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Json(json!([]))
            }),
        );
        let mut config = config(spawn(router).await);
        config.timeout_secs = 1;
        let engine = GoogleTranslator::new(&config).unwrap();

        let err = engine.translate("Hello", "en", "es").await.unwrap_err();
        assert_eq!(err, EngineError::Timeout);
    }
}
