//! Gateway configuration: vendor base URLs, timeouts, and request limits.

use crate::config::parse_or;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_DEEPSEEK_BASE_URL: &str = "https://api.deepseek.com/v1";
pub const DEFAULT_LLAMA_BASE_URL: &str = "https://api.llama.meta.com/v1";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com/v1";

pub const DEFAULT_LLM_REQUEST_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_LLM_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_AI_MAX_TOKENS: u32 = 1024;

pub const DEFAULT_OPENROUTER_REFERER: &str = "https://fxtrader.local";
pub const DEFAULT_OPENROUTER_TITLE: &str = "Fx AI Trader";

/// Base URL per vendor, without trailing slash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderEndpoints {
    pub openai: String,
    pub openrouter: String,
    pub deepseek: String,
    pub llama: String,
    pub gemini: String,
    pub anthropic: String,
}

impl Default for ProviderEndpoints {
    fn default() -> Self {
        Self {
            openai: DEFAULT_OPENAI_BASE_URL.into(),
            openrouter: DEFAULT_OPENROUTER_BASE_URL.into(),
            deepseek: DEFAULT_DEEPSEEK_BASE_URL.into(),
            llama: DEFAULT_LLAMA_BASE_URL.into(),
            gemini: DEFAULT_GEMINI_BASE_URL.into(),
            anthropic: DEFAULT_ANTHROPIC_BASE_URL.into(),
        }
    }
}

impl ProviderEndpoints {
    /// Point every vendor at one host, each under its own path prefix.
    /// Used to aim the gateway at a local stand-in server.
    #[must_use]
    pub fn all_under(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            openai: format!("{base}/openai"),
            openrouter: format!("{base}/openrouter"),
            deepseek: format!("{base}/deepseek"),
            llama: format!("{base}/llama"),
            gemini: format!("{base}/gemini"),
            anthropic: format!("{base}/anthropic"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LlmTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for LlmTimeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_LLM_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_LLM_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    pub endpoints: ProviderEndpoints,
    pub timeouts: LlmTimeouts,
    /// `max_tokens` for vendors that require it (Anthropic).
    pub max_tokens: u32,
    /// OpenRouter attribution headers (`HTTP-Referer`, `X-Title`).
    pub openrouter_referer: String,
    pub openrouter_title: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            endpoints: ProviderEndpoints::default(),
            timeouts: LlmTimeouts::default(),
            max_tokens: DEFAULT_AI_MAX_TOKENS,
            openrouter_referer: DEFAULT_OPENROUTER_REFERER.into(),
            openrouter_title: DEFAULT_OPENROUTER_TITLE.into(),
        }
    }
}

impl GatewayConfig {
    /// Build gateway config from a variable lookup (see [`crate::config::AppConfig::from_lookup`]).
    ///
    /// Optional:
    /// - `OPENAI_BASE_URL`, `OPENROUTER_BASE_URL`, `DEEPSEEK_BASE_URL`,
    ///   `LLAMA_BASE_URL`, `GEMINI_BASE_URL`, `ANTHROPIC_BASE_URL`
    /// - `LLM_REQUEST_TIMEOUT_SECS`: default 120
    /// - `LLM_CONNECT_TIMEOUT_SECS`: default 10
    /// - `AI_MAX_TOKENS`: default 1024
    /// - `OPENROUTER_REFERER`, `OPENROUTER_TITLE`
    #[must_use]
    pub fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Self {
        let url = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
                .trim()
                .trim_end_matches('/')
                .to_string()
        };
        let text = |key: &str, default: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let endpoints = ProviderEndpoints {
            openai: url("OPENAI_BASE_URL", DEFAULT_OPENAI_BASE_URL),
            openrouter: url("OPENROUTER_BASE_URL", DEFAULT_OPENROUTER_BASE_URL),
            deepseek: url("DEEPSEEK_BASE_URL", DEFAULT_DEEPSEEK_BASE_URL),
            llama: url("LLAMA_BASE_URL", DEFAULT_LLAMA_BASE_URL),
            gemini: url("GEMINI_BASE_URL", DEFAULT_GEMINI_BASE_URL),
            anthropic: url("ANTHROPIC_BASE_URL", DEFAULT_ANTHROPIC_BASE_URL),
        };
        let timeouts = LlmTimeouts {
            request_secs: parse_or(lookup, "LLM_REQUEST_TIMEOUT_SECS", DEFAULT_LLM_REQUEST_TIMEOUT_SECS),
            connect_secs: parse_or(lookup, "LLM_CONNECT_TIMEOUT_SECS", DEFAULT_LLM_CONNECT_TIMEOUT_SECS),
        };

        Self {
            endpoints,
            timeouts,
            max_tokens: parse_or(lookup, "AI_MAX_TOKENS", DEFAULT_AI_MAX_TOKENS),
            openrouter_referer: text("OPENROUTER_REFERER", DEFAULT_OPENROUTER_REFERER),
            openrouter_title: text("OPENROUTER_TITLE", DEFAULT_OPENROUTER_TITLE),
        }
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
