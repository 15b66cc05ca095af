//! Chart analysis routes.

use axum::extract::State;
use axum::response::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::ApiError;
use crate::llm::provider::Provider;
use crate::services::analysis::{self, ChartInput};
use crate::services::normalize::{AnalysisResult, Recommendation};
use crate::routes::ApiJson;
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeChartBody {
    #[serde(default)]
    pub chart_image_uri: Option<String>,
    #[serde(default)]
    pub chart_data: Option<Value>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeChartResponse {
    pub success: bool,
    pub analysis_id: Uuid,
    pub result: AnalysisResult,
    pub provider: Provider,
    pub model: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplainBody {
    #[serde(default)]
    pub chart_data_uri: Option<String>,
    #[serde(default)]
    pub recommendation: String,
}

#[derive(Serialize)]
pub struct ExplainResponse {
    pub success: bool,
    pub explanation: String,
    pub provider: Provider,
    pub model: String,
}

/// `POST /api/analyze-chart`: analyze an image or raw chart data.
pub async fn analyze_chart(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<AnalyzeChartBody>,
) -> Result<Json<AnalyzeChartResponse>, ApiError> {
    let input = ChartInput { chart_image_uri: body.chart_image_uri, chart_data: body.chart_data };
    let analysis = analysis::analyze_chart(&state, &input).await?;

    Ok(Json(AnalyzeChartResponse {
        success: true,
        analysis_id: analysis.analysis_id,
        result: analysis.result,
        provider: analysis.provider,
        model: analysis.model,
    }))
}

/// `POST /api/explain-recommendation`: justify a BUY/SELL/WAIT call.
pub async fn explain_recommendation(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<ExplainBody>,
) -> Result<Json<ExplainResponse>, ApiError> {
    let Some(recommendation) = Recommendation::from_label(&body.recommendation) else {
        return Err(ApiError::bad_request(
            "E_INVALID_RECOMMENDATION",
            "recommendation harus BUY, SELL, atau WAIT",
        ));
    };

    let explained = analysis::explain_recommendation(&state, recommendation, body.chart_data_uri.as_deref()).await?;
    Ok(Json(ExplainResponse {
        success: true,
        explanation: explained.explanation,
        provider: explained.provider,
        model: explained.model,
    }))
}

#[cfg(test)]
#[path = "analyze_test.rs"]
mod tests;
