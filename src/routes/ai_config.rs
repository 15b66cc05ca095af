//! AI configuration routes: read, save, migrate, and connectivity test.

use axum::extract::State;
use axum::response::Json;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::llm::provider::Provider;
use crate::services::analysis;
use crate::services::config::{self, AiConfigUpdate, ConfigView};
use crate::routes::ApiJson;
use crate::state::AppState;

const SAVED_MESSAGE: &str = "Konfigurasi AI berhasil disimpan";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetConfigBody {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub ai_model_name: Option<String>,
    #[serde(default)]
    pub ai_persona: Option<String>,
}

#[derive(Serialize)]
pub struct SetConfigResponse {
    pub success: bool,
    pub message: &'static str,
    pub config: ConfigView,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrateResponse {
    pub success: bool,
    pub migrated: bool,
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_model_name: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestConnectionBody {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub ai_model_name: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestConnectionResponse {
    pub success: bool,
    pub message: &'static str,
    pub provider: Provider,
    pub model: String,
    pub test_response: String,
}

/// `GET /api/ai-config`: key-free view of the active configuration.
pub async fn get_ai_config(State(state): State<AppState>) -> Result<Json<ConfigView>, ApiError> {
    let active = config::get_config(state.store.as_ref(), &state.analysis.default_api_key).await?;
    Ok(Json(ConfigView::from(&active)))
}

/// `POST /api/ai-config`: save a new key, model, and persona.
pub async fn set_ai_config(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<SetConfigBody>,
) -> Result<Json<SetConfigResponse>, ApiError> {
    let update = AiConfigUpdate { api_key: body.api_key, model: body.ai_model_name, persona: body.ai_persona };
    let saved = config::set_config(state.store.as_ref(), &update).await?;

    Ok(Json(SetConfigResponse { success: true, message: SAVED_MESSAGE, config: ConfigView::from(&saved) }))
}

/// `POST /api/ai-config/migrate`: rewrite a legacy document.
pub async fn migrate_ai_config(State(state): State<AppState>) -> Result<Json<MigrateResponse>, ApiError> {
    let outcome = config::migrate_config(state.store.as_ref()).await?;
    Ok(Json(MigrateResponse {
        success: true,
        migrated: outcome.migrated,
        message: outcome.message,
        ai_model_name: outcome.model,
    }))
}

/// `POST /api/ai-config/test`: try a candidate key without saving it.
pub async fn test_ai_connection(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<TestConnectionBody>,
) -> Result<Json<TestConnectionResponse>, ApiError> {
    let outcome = analysis::test_connection(&state, &body.api_key, body.ai_model_name.as_deref()).await?;
    Ok(Json(TestConnectionResponse {
        success: true,
        message: outcome.message,
        provider: outcome.provider,
        model: outcome.model,
        test_response: outcome.test_response,
    }))
}

#[cfg(test)]
#[path = "ai_config_test.rs"]
mod tests;
