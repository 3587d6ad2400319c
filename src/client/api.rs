use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::ClientError;
use crate::language::Language;

/// Body of `POST {base}/translate`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationRequest {
    pub text: String,
    pub source_lang: String,
    pub target_lang: String,
}

/// Successful `translate` reply; the text may be missing.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TranslationReply {
    #[serde(default)]
    pub translated_text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LanguagesBody {
    #[serde(default)]
    languages: Option<Vec<Language>>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TranslateBody {
    #[serde(default)]
    translated_text: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Remote translation API as seen by the page
#[async_trait]
pub trait TranslationApi: Send + Sync {
    /// Fetch the language catalog. An empty vector means the server
    /// answered without languages.
    async fn fetch_languages(&self) -> Result<Vec<Language>, ClientError>;

    /// Translate one request.
    async fn translate(&self, request: &TranslationRequest) -> Result<TranslationReply, ClientError>;
}

/// reqwest-backed client for the translation backend
#[derive(Debug, Clone)]
pub struct HttpTranslationApi {
    client: Client,
    base_url: String,
}

impl HttpTranslationApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn health_check(&self) -> Result<bool, ClientError> {
        let url = format!("{}/health", self.base_url);
        let response = self.client.get(&url).send().await?;
        Ok(response.status().is_success())
    }
}

#[async_trait]
impl TranslationApi for HttpTranslationApi {
    async fn fetch_languages(&self) -> Result<Vec<Language>, ClientError> {
        let url = format!("{}/languages", self.base_url);
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        debug!("Languages response: status={}, {} bytes", status, bytes.len());

        let body: Option<LanguagesBody> = serde_json::from_slice(&bytes).ok();
        match body {
            Some(LanguagesBody { error: Some(error), .. }) => Err(ClientError::Reported(error)),
            _ if !status.is_success() => Err(ClientError::server(status.as_u16(), None)),
            Some(body) => Ok(body.languages.unwrap_or_default()),
            None => Err(ClientError::Malformed(format!(
                "languages body from {} is not valid JSON",
                url
            ))),
        }
    }

    async fn translate(&self, request: &TranslationRequest) -> Result<TranslationReply, ClientError> {
        let url = format!("{}/translate", self.base_url);
        debug!(
            "Sending translation request: source={}, target={}, {} chars",
            request.source_lang,
            request.target_lang,
            request.text.chars().count()
        );

        let response = self.client.post(&url).json(request).send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        let body: Option<TranslateBody> = serde_json::from_slice(&bytes).ok();
        if !status.is_success() {
            let message = body.and_then(|b| b.error);
            return Err(ClientError::server(status.as_u16(), message));
        }

        match body {
            Some(TranslateBody { error: Some(error), .. }) => Err(ClientError::Reported(error)),
            Some(body) => Ok(TranslationReply {
                translated_text: body.translated_text,
            }),
            None => Err(ClientError::Malformed(format!(
                "translate body from {} is not valid JSON",
                url
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::get, routing::post, Json, Router};
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    async fn spawn(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}/api", addr)
    }

    fn request(text: &str) -> TranslationRequest {
        TranslationRequest {
            text: text.to_string(),
            source_lang: "auto".to_string(),
            target_lang: "es".to_string(),
        }
    }

    #[tokio::test]
    async fn translate_posts_json_body() {
        let seen: Arc<Mutex<Vec<Value>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let router = Router::new().route(
            "/api/translate",
            post(move |Json(body): Json<Value>| {
                let sink = sink.clone();
                async move {
                    sink.lock().unwrap().push(body);
                    Json(json!({"success": true, "translated_text": "Hola"}))
                }
            }),
        );
        let api = HttpTranslationApi::new(spawn(router).await);

        let reply = api.translate(&request("Hello")).await.unwrap();
        assert_eq!(reply.translated_text.as_deref(), Some("Hola"));

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(
            seen[0],
            json!({"text": "Hello", "source_lang": "auto", "target_lang": "es"})
        );
    }

    #[tokio::test]
    async fn server_error_uses_body_message() {
        let router = Router::new().route(
            "/api/translate",
            post(|| async {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"error": "rate limited"})),
                )
            }),
        );
        let api = HttpTranslationApi::new(spawn(router).await);

        let err = api.translate(&request("Hello")).await.unwrap_err();
        assert_eq!(
            err,
            ClientError::Server {
                status: 500,
                message: "rate limited".to_string()
            }
        );
    }

    #[tokio::test]
    async fn server_error_without_body_gets_generic_message() {
        let router = Router::new().route(
            "/api/translate",
            post(|| async { (StatusCode::BAD_GATEWAY, "upstream down") }),
        );
        let api = HttpTranslationApi::new(spawn(router).await);

        let err = api.translate(&request("Hello")).await.unwrap_err();
        assert_eq!(err.to_string(), "Server error: 502");
    }

    #[tokio::test]
    async fn error_field_in_ok_body_is_reported() {
        let router = Router::new().route(
            "/api/translate",
            post(|| async { Json(json!({"error": "quota"})) }),
        );
        let api = HttpTranslationApi::new(spawn(router).await);

        let err = api.translate(&request("Hello")).await.unwrap_err();
        assert_eq!(err, ClientError::Reported("quota".to_string()));
    }

    #[tokio::test]
    async fn languages_are_decoded() {
        let router = Router::new().route(
            "/api/languages",
            get(|| async {
                Json(json!({"success": true, "languages": [
                    {"code": "fr", "name": "French"},
                    {"code": "es", "name": "Spanish"}
                ]}))
            }),
        );
        let api = HttpTranslationApi::new(spawn(router).await);

        let langs = api.fetch_languages().await.unwrap();
        assert_eq!(
            langs,
            vec![Language::new("fr", "French"), Language::new("es", "Spanish")]
        );
    }

    #[tokio::test]
    async fn languages_error_field_and_status() {
        let router = Router::new()
            .route(
                "/api/languages",
                get(|| async {
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(json!({"success": false, "error": "catalog down"})),
                    )
                }),
            );
        let api = HttpTranslationApi::new(spawn(router).await);
        let err = api.fetch_languages().await.unwrap_err();
        assert_eq!(err, ClientError::Reported("catalog down".to_string()));

        let router = Router::new().route(
            "/api/languages",
            get(|| async { StatusCode::SERVICE_UNAVAILABLE }),
        );
        let api = HttpTranslationApi::new(spawn(router).await);
        let err = api.fetch_languages().await.unwrap_err();
        assert!(matches!(err, ClientError::Server { status: 503, .. }));
    }

    #[tokio::test]
    async fn failed_status_ignores_languages_in_body() {
        let router = Router::new().route(
            "/api/languages",
            get(|| async {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"languages": [{"code": "fr", "name": "French"}]})),
                )
            }),
        );
        let api = HttpTranslationApi::new(spawn(router).await);
        let err = api.fetch_languages().await.unwrap_err();
        assert!(matches!(err, ClientError::Server { status: 500, .. }));
    }

    #[tokio::test]
    async fn error_field_in_ok_catalog_is_reported() {
        let router = Router::new().route(
            "/api/languages",
            get(|| async { Json(json!({"error": "catalog warming up", "languages": []})) }),
        );
        let api = HttpTranslationApi::new(spawn(router).await);
        let err = api.fetch_languages().await.unwrap_err();
        assert_eq!(err, ClientError::Reported("catalog warming up".to_string()));
    }

    #[tokio::test]
    async fn unreachable_host_is_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let api = HttpTranslationApi::new(format!("http://{}/api/", addr));
        assert_eq!(api.base_url(), format!("http://{}/api", addr));
        let err = api.fetch_languages().await.unwrap_err();
        assert!(matches!(err, ClientError::Transport(_)));
    }
}
