//! Anthropic Messages API client.
//!
//! Thin HTTP wrapper for `/v1/messages`. Pure request shaping and parsing
//! live in free functions for testability.

use serde::Serialize;
use serde_json::Value;

use super::http::send_json;
use super::provider::Provider;
use super::types::{ChatRequest, LlmError};

const API_VERSION: &str = "2023-06-01";

// =============================================================================
// CLIENT
// =============================================================================

pub struct AnthropicClient {
    http: reqwest::Client,
    base_url: String,
    max_tokens: u32,
}

impl AnthropicClient {
    #[must_use]
    pub fn new(http: reqwest::Client, base_url: &str, max_tokens: u32) -> Self {
        Self { http, base_url: base_url.trim_end_matches('/').to_string(), max_tokens }
    }

    pub async fn chat(&self, api_key: &str, model: &str, request: &ChatRequest<'_>) -> Result<String, LlmError> {
        let body = build_request(model, self.max_tokens, request);
        let builder = self
            .http
            .post(format!("{}/messages", self.base_url))
            .header("x-api-key", api_key)
            .header("anthropic-version", API_VERSION);

        let text = send_json(Provider::Claude, builder, &body).await?;
        parse_response(&text)
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "is_blank")]
    system: &'a str,
    messages: Vec<ApiMessage<'a>>,
}

#[derive(Serialize)]
struct ApiMessage<'a> {
    role: &'static str,
    content: Vec<ApiBlock<'a>>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ApiBlock<'a> {
    Image { source: ImageSource<'a> },
    Text { text: &'a str },
}

#[derive(Serialize)]
struct ImageSource<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    media_type: &'a str,
    data: &'a str,
}

fn is_blank(text: &&str) -> bool {
    text.trim().is_empty()
}

fn build_request<'a>(model: &'a str, max_tokens: u32, request: &'a ChatRequest<'a>) -> ApiRequest<'a> {
    let mut content = Vec::with_capacity(2);
    if let Some(image) = &request.image {
        content.push(ApiBlock::Image {
            source: ImageSource { kind: "base64", media_type: &image.mime_type, data: &image.data },
        });
    }
    content.push(ApiBlock::Text { text: request.user_prompt });

    ApiRequest {
        model,
        max_tokens,
        system: request.persona,
        messages: vec![ApiMessage { role: "user", content }],
    }
}

// =============================================================================
// PARSING
// =============================================================================

/// Extract `content[0].text`. Anything else is malformed.
pub(crate) fn parse_response(json_text: &str) -> Result<String, LlmError> {
    let provider = Provider::Claude;
    let root: Value = serde_json::from_str(json_text)
        .map_err(|e| LlmError::MalformedResponse { provider, detail: format!("invalid JSON: {e}") })?;

    let Some(text) = root
        .get("content")
        .and_then(Value::as_array)
        .and_then(|blocks| blocks.first())
        .and_then(|block| block.get("text"))
        .and_then(Value::as_str)
    else {
        return Err(LlmError::MalformedResponse { provider, detail: "missing content[0].text".into() });
    };

    if text.trim().is_empty() {
        return Err(LlmError::MalformedResponse { provider, detail: "empty content[0].text".into() });
    }
    Ok(text.to_string())
}

#[cfg(test)]
#[path = "anthropic_test.rs"]
mod tests;
