//! Provider identity — which upstream vendor an API key belongs to.
//!
//! DESIGN
//! ======
//! The vendor is never configured explicitly; it is sniffed from the key
//! string once per call and passed around as a closed enum afterwards.
//! Detection order matters because OpenAI, DeepSeek, Anthropic and some
//! OpenRouter keys all share the `sk-` prefix.
//!
//! TRADE-OFFS
//! ==========
//! Prefix sniffing is best-effort. A future vendor issuing `sk-` keys will be
//! classified as `OpenAi` until a rule is added ahead of the `sk-` check.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Default model when nothing better is known. Fast and multimodal.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    OpenAi,
    Gemini,
    Claude,
    DeepSeek,
    OpenRouter,
    Llama,
    Unknown,
}

impl Provider {
    /// Infer the provider from an API key. First matching rule wins.
    #[must_use]
    pub fn detect(api_key: &str) -> Self {
        let key = api_key.trim();
        if key.is_empty() {
            return Self::Unknown;
        }

        if key.starts_with("sk-or-") {
            Self::OpenRouter
        } else if key.contains("deepseek") {
            Self::DeepSeek
        } else if key.contains("openrouter") {
            Self::OpenRouter
        } else if key.starts_with("sk-ant-") {
            Self::Claude
        } else if key.starts_with("AIza") {
            Self::Gemini
        } else if key.starts_with("sk-") {
            Self::OpenAi
        } else if key.starts_with("claude-") {
            Self::Claude
        } else if key.starts_with("llama-") {
            Self::Llama
        } else {
            Self::Unknown
        }
    }

    /// Model used when the caller does not name one.
    #[must_use]
    pub fn default_model(self) -> &'static str {
        match self {
            Self::OpenAi => "gpt-4o",
            Self::Gemini | Self::Unknown => DEFAULT_GEMINI_MODEL,
            Self::Claude => "claude-3-sonnet-20240229",
            Self::DeepSeek => "deepseek-chat",
            Self::OpenRouter => "mistralai/mistral-7b-instruct",
            Self::Llama => "llama3.1-70b",
        }
    }

    /// Stable lowercase identifier, matches the serde representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Gemini => "gemini",
            Self::Claude => "claude",
            Self::DeepSeek => "deepseek",
            Self::OpenRouter => "openrouter",
            Self::Llama => "llama",
            Self::Unknown => "unknown",
        }
    }

    /// Human-readable vendor name for API responses and error messages.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::OpenAi => "OpenAI",
            Self::Gemini => "Google Gemini",
            Self::Claude => "Anthropic Claude",
            Self::DeepSeek => "DeepSeek",
            Self::OpenRouter => "OpenRouter",
            Self::Llama => "Llama",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[cfg(test)]
#[path = "provider_test.rs"]
mod tests;
