//! OpenAI-compatible chat-completions client.
//!
//! One client type serves every vendor that speaks the `/chat/completions`
//! dialect (OpenAI, OpenRouter, DeepSeek, Llama). They differ only in base
//! URL, extra headers, and whether image parts are accepted.

use serde::Serialize;
use serde_json::Value;

use super::http::send_json;
use super::provider::Provider;
use super::types::{ChatRequest, LlmError};

// =============================================================================
// CLIENT
// =============================================================================

pub struct OpenAiClient {
    http: reqwest::Client,
    provider: Provider,
    base_url: String,
    extra_headers: Vec<(&'static str, String)>,
    accepts_images: bool,
}

impl OpenAiClient {
    #[must_use]
    pub fn new(http: reqwest::Client, provider: Provider, base_url: &str) -> Self {
        Self {
            http,
            provider,
            base_url: base_url.trim_end_matches('/').to_string(),
            extra_headers: Vec::new(),
            accepts_images: false,
        }
    }

    /// Add a static header sent with every request.
    #[must_use]
    pub fn with_header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.extra_headers.push((name, value.into()));
        self
    }

    /// Send images as `image_url` parts instead of dropping them.
    #[must_use]
    pub fn with_images(mut self) -> Self {
        self.accepts_images = true;
        self
    }

    pub async fn chat(&self, api_key: &str, model: &str, request: &ChatRequest<'_>) -> Result<String, LlmError> {
        if request.image.is_some() && !self.accepts_images {
            tracing::debug!(provider = %self.provider, "openai-compat: image dropped, text-only endpoint");
        }

        let body = build_request(model, request, self.accepts_images);
        let url = format!("{}/chat/completions", self.base_url);
        let mut builder = self.http.post(url).bearer_auth(api_key);
        for (name, value) in &self.extra_headers {
            builder = builder.header(*name, value);
        }

        let text = send_json(self.provider, builder, &body).await?;
        parse_response(self.provider, &text)
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Serialize)]
struct CcRequest<'a> {
    model: &'a str,
    messages: Vec<CcMessage<'a>>,
}

#[derive(Serialize)]
struct CcMessage<'a> {
    role: &'static str,
    content: CcContent<'a>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum CcContent<'a> {
    Text(&'a str),
    Parts(Vec<CcPart<'a>>),
}

#[derive(Serialize)]
#[serde(tag = "type")]
enum CcPart<'a> {
    #[serde(rename = "text")]
    Text { text: &'a str },

    #[serde(rename = "image_url")]
    ImageUrl { image_url: CcImageUrl },
}

#[derive(Serialize)]
struct CcImageUrl {
    url: String,
}

fn build_request<'a>(model: &'a str, request: &'a ChatRequest<'a>, accepts_images: bool) -> CcRequest<'a> {
    let mut messages = Vec::with_capacity(2);
    if !request.persona.trim().is_empty() {
        messages.push(CcMessage { role: "system", content: CcContent::Text(request.persona) });
    }

    let user_content = match &request.image {
        Some(image) if accepts_images => CcContent::Parts(vec![
            CcPart::Text { text: request.user_prompt },
            CcPart::ImageUrl { image_url: CcImageUrl { url: image.to_data_uri() } },
        ]),
        _ => CcContent::Text(request.user_prompt),
    };
    messages.push(CcMessage { role: "user", content: user_content });

    CcRequest { model, messages }
}

// =============================================================================
// RESPONSE PARSING
// =============================================================================

/// Extract `choices[0].message.content`.
pub(crate) fn parse_response(provider: Provider, json_text: &str) -> Result<String, LlmError> {
    let root: Value = serde_json::from_str(json_text)
        .map_err(|e| LlmError::MalformedResponse { provider, detail: format!("invalid JSON: {e}") })?;

    let Some(choice) = root
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|arr| arr.first())
    else {
        return Err(LlmError::MalformedResponse { provider, detail: "missing choices[0]".into() });
    };

    match choice
        .get("message")
        .and_then(|m| m.get("content"))
        .and_then(Value::as_str)
    {
        Some(text) if !text.trim().is_empty() => Ok(text.to_string()),
        Some(_) => Err(LlmError::MalformedResponse { provider, detail: "empty choices[0].message.content".into() }),
        None => Err(LlmError::MalformedResponse { provider, detail: "missing choices[0].message.content".into() }),
    }
}

#[cfg(test)]
#[path = "openai_test.rs"]
mod tests;
