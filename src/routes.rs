use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::{error, info};

use crate::error::ApiError;
use crate::language::Language;
use crate::state::AppState;
use crate::translate::interface::normalize_source;
use crate::translate::{TranslateRequest, TranslateResponse};

#[derive(Debug, Serialize, Deserialize)]
pub struct LanguagesResponse {
    pub success: bool,
    pub languages: Vec<Language>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub success: bool,
    pub status: String,
    pub message: String,
    pub version: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DetectResponse {
    pub success: bool,
    pub detected_lang: String,
    pub text: String,
}

pub fn create_routes(state: &AppState) -> Router<AppState> {
    let api = Router::new()
        .route("/translate", post(translate_text).fallback(method_not_allowed))
        .route("/languages", get(get_languages).fallback(method_not_allowed))
        .route("/health", get(health_check).fallback(method_not_allowed))
        .route("/detect", post(detect_language).fallback(method_not_allowed))
        .fallback(not_found);

    Router::new()
        .nest("/api", api)
        // Frontend at / and everything else
        .fallback_service(ServeDir::new(state.config.frontend_path()))
}

/// Full application: routes, permissive CORS and request tracing.
pub fn build_app(state: AppState) -> Router {
    create_routes(&state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Accept only a non-empty JSON object.
fn require_object(payload: Result<Json<Value>, JsonRejection>) -> Result<Value, ApiError> {
    match payload {
        Ok(Json(Value::Object(map))) if !map.is_empty() => Ok(Value::Object(map)),
        _ => Err(ApiError::BadRequest("No data provided".to_string())),
    }
}

async fn translate_text(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<TranslateResponse>, ApiError> {
    let data = require_object(payload)?;
    let request: TranslateRequest = serde_json::from_value(data)
        .map_err(|_| ApiError::BadRequest("No data provided".to_string()))?;

    let text = request.text.unwrap_or_default();
    if text.is_empty() {
        return Err(ApiError::BadRequest("No text provided".to_string()));
    }
    let target = match request.target_lang {
        Some(target) if !target.is_empty() => target,
        _ => return Err(ApiError::BadRequest("Target language is required".to_string())),
    };
    let source = normalize_source(request.source_lang.as_deref());

    info!(
        "Translation request received: source={}, target={}, {} chars",
        source,
        target,
        text.chars().count()
    );

    match state.engine.translate(&text, source, &target).await {
        Ok(translation) => {
            info!("Translation successful ({} chars)", translation.translated_text.chars().count());
            Ok(Json(TranslateResponse {
                success: true,
                translated_text: translation.translated_text,
                source_lang: translation.source_lang,
                target_lang: translation.target_lang,
            }))
        }
        Err(e) => {
            error!("Translation failed: {}", e);
            Err(e.into())
        }
    }
}

async fn get_languages(State(state): State<AppState>) -> Json<LanguagesResponse> {
    let languages = state.engine.languages();
    info!("Returning {} languages", languages.len());
    Json(LanguagesResponse {
        success: true,
        languages,
    })
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        success: true,
        status: "healthy".to_string(),
        message: "Translation API is running".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn detect_language(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<DetectResponse>, ApiError> {
    let text = payload
        .ok()
        .and_then(|Json(data)| data.get("text").and_then(Value::as_str).map(str::to_string))
        .filter(|text| !text.is_empty())
        .ok_or_else(|| ApiError::BadRequest("No text provided".to_string()))?;

    let translation = state.engine.translate(&text, "auto", "en").await?;
    Ok(Json(DetectResponse {
        success: true,
        detected_lang: translation.source_lang,
        text,
    }))
}

async fn not_found() -> ApiError {
    ApiError::NotFound
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
