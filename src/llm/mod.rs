//! LLM — multi-provider gateway for chart analysis.
//!
//! DESIGN
//! ======
//! The caller never names a provider. [`AiGateway`] infers it from the API
//! key prefix ([`provider::Provider::detect`]) and dispatches to exactly one
//! adapter. Four vendors speak the chat-completions dialect and share
//! [`openai::OpenAiClient`]; Gemini and Claude have their own adapters.
//!
//! TRADE-OFFS
//! ==========
//! All adapters share one `reqwest::Client` (one connection pool, one set of
//! timeouts). Keys travel per call, so the gateway holds no secrets and one
//! instance serves every user configuration.
//!
//! The key and model are whitespace-trimmed before detection and dispatch; a
//! blank model falls back to the provider default. Persona and prompt are
//! forwarded verbatim.

pub mod anthropic;
pub mod config;
pub mod gemini;
mod http;
pub mod openai;
pub mod provider;
pub mod types;

use std::time::Duration;

use config::GatewayConfig;
use provider::Provider;
pub use types::LlmChat;
use types::{AiRequest, ChatRequest, ImageData, LlmError};

// =============================================================================
// GATEWAY
// =============================================================================

/// Key-routed AI gateway. Cheap to share behind an `Arc`.
pub struct AiGateway {
    openai: openai::OpenAiClient,
    openrouter: openai::OpenAiClient,
    deepseek: openai::OpenAiClient,
    llama: openai::OpenAiClient,
    gemini: gemini::GeminiClient,
    anthropic: anthropic::AnthropicClient,
}

impl AiGateway {
    /// Build the gateway and its shared HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::HttpClientBuild`] if the HTTP client fails to build.
    pub fn new(config: &GatewayConfig) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| LlmError::HttpClientBuild(e.to_string()))?;

        let endpoints = &config.endpoints;
        Ok(Self {
            openai: openai::OpenAiClient::new(http.clone(), Provider::OpenAi, &endpoints.openai).with_images(),
            openrouter: openai::OpenAiClient::new(http.clone(), Provider::OpenRouter, &endpoints.openrouter)
                .with_header("HTTP-Referer", config.openrouter_referer.clone())
                .with_header("X-Title", config.openrouter_title.clone())
                .with_images(),
            deepseek: openai::OpenAiClient::new(http.clone(), Provider::DeepSeek, &endpoints.deepseek),
            llama: openai::OpenAiClient::new(http.clone(), Provider::Llama, &endpoints.llama),
            gemini: gemini::GeminiClient::new(http.clone(), &endpoints.gemini),
            anthropic: anthropic::AnthropicClient::new(http, &endpoints.anthropic, config.max_tokens),
        })
    }

    async fn dispatch(
        &self,
        provider: Provider,
        api_key: &str,
        model: &str,
        request: &ChatRequest<'_>,
    ) -> Result<String, LlmError> {
        match provider {
            Provider::OpenAi => self.openai.chat(api_key, model, request).await,
            Provider::OpenRouter => self.openrouter.chat(api_key, model, request).await,
            Provider::DeepSeek => self.deepseek.chat(api_key, model, request).await,
            Provider::Llama => self.llama.chat(api_key, model, request).await,
            Provider::Gemini => self.gemini.chat(api_key, model, request).await,
            Provider::Claude => self.anthropic.chat(api_key, model, request).await,
            Provider::Unknown => Err(LlmError::UnknownProvider),
        }
    }
}

#[async_trait::async_trait]
impl LlmChat for AiGateway {
    async fn call_ai(&self, request: &AiRequest) -> Result<String, LlmError> {
        let api_key = request.api_key.trim();
        let provider = Provider::detect(api_key);
        if provider == Provider::Unknown {
            tracing::warn!("ai gateway: api key matches no provider");
            return Err(LlmError::UnknownProvider);
        }

        let model = match request.model.trim() {
            "" => provider.default_model(),
            model => model,
        };
        let image = request
            .image_data_uri
            .as_deref()
            .map(ImageData::from_data_uri)
            .transpose()?;
        let chat = ChatRequest { persona: &request.persona, user_prompt: &request.user_prompt, image };

        let started = std::time::Instant::now();
        let result = self.dispatch(provider, api_key, model, &chat).await;
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        match &result {
            Ok(text) => tracing::info!(%provider, model, elapsed_ms, chars = text.len(), "ai gateway: call ok"),
            Err(e) => tracing::warn!(%provider, model, elapsed_ms, error = %e, "ai gateway: call failed"),
        }
        result
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
