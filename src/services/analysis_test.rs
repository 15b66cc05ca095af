use super::*;
use crate::llm::provider::Provider;
use crate::services::config::{ConfigStore, DEFAULT_PERSONA};
use crate::state::test_helpers::{MockLlm, test_app_state, test_app_state_configured};
use serde_json::json;

// =============================================================================
// prompts
// =============================================================================

#[test]
fn image_prompt_wins_over_chart_data() {
    let input = ChartInput {
        chart_image_uri: Some(" data:image/png;base64,AAAA ".into()),
        chart_data: Some(json!({ "pair": "EURUSD" })),
    };
    let (prompt, image) = build_analysis_prompt(&input).unwrap();
    assert_eq!(prompt, IMAGE_ANALYSIS_PROMPT);
    assert_eq!(image.as_deref(), Some("data:image/png;base64,AAAA"));
}

#[test]
fn chart_data_is_embedded_as_json() {
    let input = ChartInput { chart_image_uri: Some(String::new()), chart_data: Some(json!({ "pair": "GBPUSD" })) };
    let (prompt, image) = build_analysis_prompt(&input).unwrap();
    assert_eq!(prompt, "Tolong analisis data chart berikut: {\"pair\":\"GBPUSD\"}");
    assert!(image.is_none());
}

#[test]
fn missing_chart_input_is_rejected() {
    let err = build_analysis_prompt(&ChartInput::default()).unwrap_err();
    assert!(matches!(err, AnalysisError::MissingInput(_)));

    let null_data = ChartInput { chart_image_uri: None, chart_data: Some(serde_json::Value::Null) };
    assert!(build_analysis_prompt(&null_data).is_err());
}

#[test]
fn explain_prompt_names_the_recommendation() {
    let prompt = build_explain_prompt(Recommendation::Sell);
    assert!(prompt.contains("rekomendasi untuk \"SELL\""));
    assert!(prompt.contains("5. Risk/Reward ratio"));
    assert!(prompt.ends_with("dalam bahasa Indonesia."));
}

#[test]
fn error_codes_delegate_to_inner_errors() {
    let err = AnalysisError::from(LlmError::UnknownProvider);
    assert_eq!(err.error_code(), "E_UNKNOWN_PROVIDER");
    assert_eq!(err.to_string(), "Provider tidak dikenali. Periksa API Key.");
    assert!(AnalysisError::Timeout { secs: 10 }.retryable());
    assert!(!AnalysisError::NotConfigured.retryable());
}

// =============================================================================
// analyze_chart
// =============================================================================

#[tokio::test]
async fn analyze_normalizes_structured_reply() {
    let llm = MockLlm::replying(r#"{"recommendation":"BUY","explanation":"Breakout","confidence":"tinggi"}"#);
    let state = test_app_state_configured(llm.clone(), "sk-ant-abc", None);
    let input = ChartInput { chart_image_uri: Some("data:image/png;base64,AAAA".into()), chart_data: None };

    let analysis = analyze_chart(&state, &input).await.unwrap();
    assert_eq!(analysis.result.recommendation, Recommendation::Buy);
    assert_eq!(analysis.result.explanation, "Breakout");
    assert_eq!(analysis.provider, Provider::Claude);
    assert_eq!(analysis.model, "claude-3-sonnet-20240229");

    let calls = llm.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].api_key, "sk-ant-abc");
    assert!(calls[0].persona.starts_with(DEFAULT_PERSONA));
    assert!(calls[0].persona.ends_with(JSON_FORMAT_INSTRUCTION));
    assert_eq!(calls[0].image_data_uri.as_deref(), Some("data:image/png;base64,AAAA"));
}

#[tokio::test]
async fn analyze_falls_back_to_keywords() {
    let llm = MockLlm::replying("Saya merekomendasikan JUAL karena tren turun");
    let state = test_app_state_configured(llm, "AIzaKey", Some("gemini-1.5-pro"));
    let input = ChartInput { chart_image_uri: None, chart_data: Some(json!([1.1, 1.2])) };

    let analysis = analyze_chart(&state, &input).await.unwrap();
    assert_eq!(analysis.result.recommendation, Recommendation::Sell);
    assert_eq!(analysis.result.explanation, "Saya merekomendasikan JUAL karena tren turun");
    assert_eq!(analysis.model, "gemini-1.5-pro");
}

#[tokio::test]
async fn analyze_without_key_is_not_configured() {
    let llm = MockLlm::replying("BUY");
    let state = test_app_state(llm.clone());
    let input = ChartInput { chart_image_uri: None, chart_data: Some(json!({})) };

    let err = analyze_chart(&state, &input).await.unwrap_err();
    assert!(matches!(err, AnalysisError::NotConfigured));
    assert!(llm.calls().is_empty());
}

#[tokio::test]
async fn analyze_checks_input_before_calling_model() {
    let llm = MockLlm::replying("BUY");
    let state = test_app_state_configured(llm.clone(), "sk-abc", None);
    let err = analyze_chart(&state, &ChartInput::default()).await.unwrap_err();
    assert!(matches!(err, AnalysisError::MissingInput(_)));
    assert!(llm.calls().is_empty());
}

#[tokio::test]
async fn analyze_propagates_gateway_error() {
    let llm = MockLlm::failing(|| LlmError::Upstream { provider: Provider::OpenAi, status: 429, message: "slow down".into() });
    let state = test_app_state_configured(llm, "sk-abc", None);
    let input = ChartInput { chart_image_uri: None, chart_data: Some(json!({})) };

    let err = analyze_chart(&state, &input).await.unwrap_err();
    assert!(matches!(err, AnalysisError::Llm(LlmError::Upstream { status: 429, .. })));
    assert!(err.retryable());
}

// =============================================================================
// explain_recommendation
// =============================================================================

#[tokio::test]
async fn explain_returns_raw_text_with_provider() {
    let llm = MockLlm::replying("Harga memantul dari support.");
    let state = test_app_state_configured(llm.clone(), "sk-or-v1-abc", None);

    let explanation = explain_recommendation(&state, Recommendation::Buy, Some("data:image/png;base64,AAAA"))
        .await
        .unwrap();
    assert_eq!(explanation.explanation, "Harga memantul dari support.");
    assert_eq!(explanation.provider, Provider::OpenRouter);
    assert_eq!(explanation.model, "mistralai/mistral-7b-instruct");

    let calls = llm.calls();
    assert!(calls[0].user_prompt.contains("\"BUY\""));
    assert_eq!(calls[0].persona, DEFAULT_PERSONA);
    assert!(calls[0].image_data_uri.is_some());
}

#[tokio::test]
async fn explain_without_key_is_not_configured() {
    let state = test_app_state(MockLlm::replying("x"));
    let err = explain_recommendation(&state, Recommendation::Wait, None).await.unwrap_err();
    assert!(matches!(err, AnalysisError::NotConfigured));
}

// =============================================================================
// test_connection
// =============================================================================

#[tokio::test]
async fn connection_test_uses_fixed_prompt() {
    let llm = MockLlm::replying("Test berhasil.");
    let state = test_app_state(llm.clone());

    let outcome = test_connection(&state, "sk-proj-abc", None).await.unwrap();
    assert_eq!(outcome.message, CONNECTION_TEST_SUCCESS);
    assert_eq!(outcome.provider, Provider::OpenAi);
    assert_eq!(outcome.model, "gpt-4o");
    assert_eq!(outcome.test_response, "Test berhasil.");

    let calls = llm.calls();
    assert_eq!(calls[0].persona, CONNECTION_TEST_PERSONA);
    assert_eq!(calls[0].user_prompt, CONNECTION_TEST_PROMPT);
    assert!(calls[0].image_data_uri.is_none());
}

#[tokio::test]
async fn connection_test_does_not_touch_the_store() {
    let state = test_app_state(MockLlm::replying("ok"));
    test_connection(&state, "AIzaCandidate", Some("gemini-1.5-pro")).await.unwrap();
    assert!(state.store.load().await.unwrap().is_none());
}

#[tokio::test]
async fn connection_test_times_out() {
    let state = test_app_state(MockLlm::stalling());
    let err = test_connection(&state, "sk-abc", None).await.unwrap_err();
    assert!(matches!(err, AnalysisError::Timeout { .. }));
    assert_eq!(err.error_code(), "E_TIMEOUT");
}

#[tokio::test]
async fn connection_test_requires_key() {
    let llm = MockLlm::replying("ok");
    let state = test_app_state(llm.clone());
    let err = test_connection(&state, "  ", None).await.unwrap_err();
    assert!(matches!(err, AnalysisError::MissingInput(_)));
    assert!(llm.calls().is_empty());
}
