//! Analysis service — prompts, gateway calls, and normalization.
//!
//! DESIGN
//! ======
//! Each operation reads the stored config through `get_config`, builds one
//! prompt, makes exactly one gateway call, and post-processes the text.
//! Nothing is retried; gateway errors surface unchanged inside
//! [`AnalysisError::Llm`].
//!
//! TRADE-OFFS
//! ==========
//! The connectivity test races the gateway call against a deadline. When the
//! deadline wins the future is dropped, which closes the connection, but the
//! vendor may still finish (and bill) the request.

use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use super::config::{AiConfigUpdate, StoreError, get_config, resolve_config};
use super::normalize::{AnalysisResult, Recommendation, normalize};
use crate::error::ErrorCode;
use crate::llm::provider::Provider;
use crate::llm::types::{AiRequest, LlmError};
use crate::state::AppState;

pub const IMAGE_ANALYSIS_PROMPT: &str = "Tolong analisis gambar chart ini dan berikan rekomendasi perdagangan.";
const DATA_ANALYSIS_PROMPT_PREFIX: &str = "Tolong analisis data chart berikut: ";

/// Appended to the persona so the structured normalizer stage can succeed.
pub const JSON_FORMAT_INSTRUCTION: &str = "Format respons Anda sebagai JSON dengan struktur: \
{\"recommendation\": \"BUY/SELL/WAIT\", \"explanation\": \"penjelasan detail\", \"confidence\": \"tinggi/sedang/rendah\"}";

pub const CONNECTION_TEST_PERSONA: &str = "You are a helpful AI assistant.";
pub const CONNECTION_TEST_PROMPT: &str = "Ketik: Test berhasil.";
pub const CONNECTION_TEST_SUCCESS: &str = "Koneksi berhasil ✅";

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("{0}")]
    MissingInput(&'static str),
    #[error("Konfigurasi AI tidak ditemukan atau API Key tidak ada.")]
    NotConfigured,
    #[error("Timeout: tidak ada respons dalam {secs} detik")]
    Timeout { secs: u64 },
    #[error(transparent)]
    Llm(#[from] LlmError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ErrorCode for AnalysisError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingInput(_) => "E_MISSING_INPUT",
            Self::NotConfigured => "E_NOT_CONFIGURED",
            Self::Timeout { .. } => "E_TIMEOUT",
            Self::Llm(e) => e.error_code(),
            Self::Store(e) => e.error_code(),
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            Self::Llm(e) => e.retryable(),
            Self::Store(e) => e.retryable(),
            Self::MissingInput(_) | Self::NotConfigured => false,
        }
    }
}

/// Chart to analyze. The image wins when both are present.
#[derive(Debug, Clone, Default)]
pub struct ChartInput {
    /// `data:<mime>;base64,<payload>`
    pub chart_image_uri: Option<String>,
    pub chart_data: Option<Value>,
}

#[derive(Debug, Clone)]
pub struct ChartAnalysis {
    pub analysis_id: Uuid,
    pub result: AnalysisResult,
    pub provider: Provider,
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct Explanation {
    pub explanation: String,
    pub provider: Provider,
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct ConnectionTest {
    pub message: &'static str,
    pub provider: Provider,
    pub model: String,
    pub test_response: String,
}

// =============================================================================
// PROMPTS
// =============================================================================

/// User prompt and optional image for a chart analysis.
///
/// # Errors
///
/// Returns [`AnalysisError::MissingInput`] when neither an image nor chart
/// data is present.
pub fn build_analysis_prompt(input: &ChartInput) -> Result<(String, Option<String>), AnalysisError> {
    let image = input
        .chart_image_uri
        .as_deref()
        .map(str::trim)
        .filter(|uri| !uri.is_empty());
    if let Some(uri) = image {
        return Ok((IMAGE_ANALYSIS_PROMPT.to_string(), Some(uri.to_string())));
    }

    match &input.chart_data {
        Some(data) if !data.is_null() => Ok((format!("{DATA_ANALYSIS_PROMPT_PREFIX}{data}"), None)),
        _ => Err(AnalysisError::MissingInput("chartImageUri atau chartData diperlukan")),
    }
}

#[must_use]
pub fn build_explain_prompt(recommendation: Recommendation) -> String {
    let label = recommendation.as_str();
    format!(
        "Berdasarkan chart yang saya berikan, saya telah menerima rekomendasi untuk \"{label}\".\n\
         \n\
         Mohon jelaskan mengapa rekomendasi \"{label}\" ini masuk akal berdasarkan:\n\
         1. Pola teknikal yang terlihat\n\
         2. Level support dan resistance\n\
         3. Indikator momentum\n\
         4. Trend yang sedang berlangsung\n\
         5. Risk/Reward ratio\n\
         \n\
         Berikan penjelasan yang profesional namun mudah dipahami dalam bahasa Indonesia."
    )
}

// =============================================================================
// OPERATIONS
// =============================================================================

/// Analyze a chart with the stored AI config.
///
/// # Errors
///
/// Returns an error if input is missing, no API key is available, the store
/// cannot be read, or the gateway call fails.
pub async fn analyze_chart(state: &AppState, input: &ChartInput) -> Result<ChartAnalysis, AnalysisError> {
    let (user_prompt, image_data_uri) = build_analysis_prompt(input)?;
    let config = get_config(state.store.as_ref(), &state.analysis.default_api_key).await?;
    if !config.has_api_key() {
        warn!("analysis: no api key configured");
        return Err(AnalysisError::NotConfigured);
    }

    let analysis_id = Uuid::new_v4();
    let provider = config.provider();
    info!(
        %analysis_id,
        %provider,
        model = %config.model,
        prompt_len = user_prompt.len(),
        has_image = image_data_uri.is_some(),
        "analysis: chart received"
    );

    let request = AiRequest {
        persona: format!("{}\n\n{JSON_FORMAT_INSTRUCTION}", config.persona),
        api_key: config.api_key,
        model: config.model.clone(),
        user_prompt,
        image_data_uri,
    };
    let raw = state.llm.call_ai(&request).await?;
    let result = normalize(&raw);

    info!(%analysis_id, recommendation = result.recommendation.as_str(), "analysis: complete");
    Ok(ChartAnalysis { analysis_id, result, provider, model: config.model })
}

/// Ask the model to justify a recommendation, optionally with the chart image.
///
/// # Errors
///
/// Returns an error if no API key is available, the store cannot be read, or
/// the gateway call fails.
pub async fn explain_recommendation(
    state: &AppState,
    recommendation: Recommendation,
    chart_data_uri: Option<&str>,
) -> Result<Explanation, AnalysisError> {
    let config = get_config(state.store.as_ref(), &state.analysis.default_api_key).await?;
    if !config.has_api_key() {
        return Err(AnalysisError::NotConfigured);
    }

    let provider = config.provider();
    info!(%provider, model = %config.model, recommendation = recommendation.as_str(), "analysis: explain");

    let request = AiRequest {
        api_key: config.api_key,
        model: config.model.clone(),
        persona: config.persona,
        user_prompt: build_explain_prompt(recommendation),
        image_data_uri: chart_data_uri
            .map(str::trim)
            .filter(|uri| !uri.is_empty())
            .map(str::to_string),
    };
    let explanation = state.llm.call_ai(&request).await?;

    Ok(Explanation { explanation, provider, model: config.model })
}

/// Send a fixed short prompt with a candidate key, bounded by the configured
/// deadline. Nothing is stored.
///
/// # Errors
///
/// Returns [`AnalysisError::MissingInput`] for a blank key,
/// [`AnalysisError::Timeout`] when the deadline passes, or the gateway error.
pub async fn test_connection(
    state: &AppState,
    api_key: &str,
    model: Option<&str>,
) -> Result<ConnectionTest, AnalysisError> {
    if api_key.trim().is_empty() {
        return Err(AnalysisError::MissingInput("API key diperlukan."));
    }

    let config = resolve_config(
        &AiConfigUpdate { api_key: Some(api_key.to_string()), model: model.map(str::to_string), persona: None },
        "",
    );
    let provider = config.provider();
    let deadline = state.analysis.test_timeout;
    info!(%provider, model = %config.model, "analysis: connection test");

    let request = AiRequest {
        api_key: config.api_key,
        model: config.model.clone(),
        persona: CONNECTION_TEST_PERSONA.to_string(),
        user_prompt: CONNECTION_TEST_PROMPT.to_string(),
        image_data_uri: None,
    };
    let Ok(reply) = tokio::time::timeout(deadline, state.llm.call_ai(&request)).await else {
        warn!(%provider, deadline_ms = u64::try_from(deadline.as_millis()).unwrap_or(u64::MAX), "analysis: connection test timed out");
        return Err(AnalysisError::Timeout { secs: deadline.as_secs() });
    };

    Ok(ConnectionTest { message: CONNECTION_TEST_SUCCESS, provider, model: config.model, test_response: reply? })
}

#[cfg(test)]
#[path = "analysis_test.rs"]
mod tests;
