//! LLM types — provider-neutral request types, the gateway trait, and errors.
//!
//! Adapters receive a [`ChatRequest`] and return plain text. Everything
//! vendor-specific lives in the adapter modules.

use std::fmt;

use super::provider::Provider;

const DEFAULT_IMAGE_MIME: &str = "image/png";

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by the AI gateway and its adapters.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// The API key matched no known provider. No request was sent.
    #[error("Provider tidak dikenali. Periksa API Key.")]
    UnknownProvider,

    /// The vendor returned a non-success HTTP status.
    #[error("{provider} API error (status {status}): {message}")]
    Upstream { provider: Provider, status: u16, message: String },

    /// The vendor returned 2xx but the expected text field was absent.
    #[error("{provider} response missing text: {detail}")]
    MalformedResponse { provider: Provider, detail: String },

    /// The HTTP request could not be sent or its body could not be read.
    #[error("API request failed: {0}")]
    ApiRequest(String),

    /// The image input is not a `data:<mime>;base64,<payload>` URI.
    #[error("invalid image data URI: {0}")]
    InvalidImage(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl crate::error::ErrorCode for LlmError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownProvider => "E_UNKNOWN_PROVIDER",
            Self::Upstream { .. } => "E_UPSTREAM",
            Self::MalformedResponse { .. } => "E_MALFORMED_RESPONSE",
            Self::ApiRequest(_) => "E_API_REQUEST",
            Self::InvalidImage(_) => "E_INVALID_IMAGE",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::ApiRequest(_) | Self::Upstream { status: 429 | 500..=599, .. })
    }
}

// =============================================================================
// IMAGE DATA
// =============================================================================

/// An inline image split out of a data URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    pub mime_type: String,
    /// Base64 payload, passed through to the vendor untouched.
    pub data: String,
}

impl ImageData {
    /// Parse `data:<mime>;base64,<payload>`, splitting on the first comma.
    /// A missing mime type defaults to `image/png`.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::InvalidImage`] if the prefix, comma, or payload is missing,
    /// or the header does not end in `;base64`.
    pub fn from_data_uri(uri: &str) -> Result<Self, LlmError> {
        let Some(rest) = uri.trim().strip_prefix("data:") else {
            return Err(LlmError::InvalidImage("missing data: prefix".into()));
        };
        let Some((header, payload)) = rest.split_once(',') else {
            return Err(LlmError::InvalidImage("missing comma separator".into()));
        };
        if header.rsplit(';').next().map(str::trim) != Some("base64") {
            return Err(LlmError::InvalidImage("payload is not base64-encoded".into()));
        }
        if payload.is_empty() {
            return Err(LlmError::InvalidImage("empty payload".into()));
        }

        let mime = header.split(';').next().unwrap_or_default().trim();
        let mime_type = if mime.is_empty() { DEFAULT_IMAGE_MIME } else { mime };

        Ok(Self { mime_type: mime_type.to_string(), data: payload.to_string() })
    }

    /// Rebuild the data URI (OpenAI-shaped APIs take the URI verbatim).
    #[must_use]
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

// =============================================================================
// REQUEST TYPES
// =============================================================================

/// Normalized per-call input handed to exactly one adapter.
#[derive(Debug)]
pub struct ChatRequest<'a> {
    /// System prompt describing the model's role.
    pub persona: &'a str,
    pub user_prompt: &'a str,
    pub image: Option<ImageData>,
}

/// Gateway input. The provider is inferred from `api_key`; an empty
/// `model` selects the provider's default.
#[derive(Clone, Default)]
pub struct AiRequest {
    pub api_key: String,
    pub model: String,
    pub persona: String,
    pub user_prompt: String,
    /// `data:<mime>;base64,<payload>` image, if any.
    pub image_data_uri: Option<String>,
}

impl fmt::Debug for AiRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AiRequest")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("persona_len", &self.persona.len())
            .field("user_prompt_len", &self.user_prompt.len())
            .field("has_image", &self.image_data_uri.is_some())
            .finish()
    }
}

// =============================================================================
// LLM CHAT TRAIT
// =============================================================================

/// Provider-neutral async gateway. Enables mocking in tests.
#[async_trait::async_trait]
pub trait LlmChat: Send + Sync {
    /// Send one prompt to whichever provider the API key belongs to and
    /// return the raw assistant text.
    ///
    /// # Errors
    ///
    /// Returns an [`LlmError`] if the key is unrecognized, the vendor rejects
    /// the request, or the response carries no text.
    async fn call_ai(&self, request: &AiRequest) -> Result<String, LlmError>;
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
