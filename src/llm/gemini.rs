//! Google Gemini `generateContent` client.
//!
//! Gemini takes the key as a `key` query parameter and has no system role in
//! this request shape, so persona and prompt travel as one text part.

use serde::Serialize;
use serde_json::Value;

use super::http::send_json;
use super::provider::Provider;
use super::types::{ChatRequest, LlmError};

pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
}

impl GeminiClient {
    #[must_use]
    pub fn new(http: reqwest::Client, base_url: &str) -> Self {
        Self { http, base_url: base_url.trim_end_matches('/').to_string() }
    }

    pub async fn chat(&self, api_key: &str, model: &str, request: &ChatRequest<'_>) -> Result<String, LlmError> {
        let body = build_request(request);
        let url = format!("{}/models/{}:generateContent", self.base_url, model_path(model));
        let builder = self.http.post(url).query(&[("key", api_key)]);

        let text = send_json(Provider::Gemini, builder, &body).await?;
        parse_response(&text)
    }
}

/// Accept `models/…` and genkit-style `googleai/…` names as well as bare ids.
fn model_path(model: &str) -> &str {
    let model = model.trim();
    model
        .strip_prefix("googleai/")
        .or_else(|| model.strip_prefix("models/"))
        .unwrap_or(model)
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
}

#[derive(Serialize)]
struct GeminiContent<'a> {
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum GeminiPart<'a> {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData<'a>,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

fn build_request<'a>(request: &'a ChatRequest<'a>) -> GenerateRequest<'a> {
    let text = if request.persona.trim().is_empty() {
        request.user_prompt.to_string()
    } else {
        format!("{}\n{}", request.persona, request.user_prompt)
    };

    let mut parts = vec![GeminiPart::Text { text }];
    if let Some(image) = &request.image {
        parts.push(GeminiPart::InlineData {
            inline_data: InlineData { mime_type: &image.mime_type, data: &image.data },
        });
    }

    GenerateRequest { contents: vec![GeminiContent { parts }] }
}

// =============================================================================
// RESPONSE PARSING
// =============================================================================

/// Extract `candidates[0].content.parts[0].text`.
pub(crate) fn parse_response(json_text: &str) -> Result<String, LlmError> {
    let provider = Provider::Gemini;
    let root: Value = serde_json::from_str(json_text)
        .map_err(|e| LlmError::MalformedResponse { provider, detail: format!("invalid JSON: {e}") })?;

    let text = root
        .get("candidates")
        .and_then(Value::as_array)
        .and_then(|c| c.first())
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(Value::as_array)
        .and_then(|p| p.first())
        .and_then(|p| p.get("text"))
        .and_then(Value::as_str);

    match text {
        Some(text) if !text.trim().is_empty() => Ok(text.to_string()),
        _ => {
            // Safety-blocked prompts come back 200 with no candidates.
            let detail = root
                .get("promptFeedback")
                .and_then(|f| f.get("blockReason"))
                .and_then(Value::as_str)
                .map_or_else(
                    || "missing candidates[0].content.parts[0].text".to_string(),
                    |reason| format!("prompt blocked: {reason}"),
                );
            Err(LlmError::MalformedResponse { provider, detail })
        }
    }
}

#[cfg(test)]
#[path = "gemini_test.rs"]
mod tests;
