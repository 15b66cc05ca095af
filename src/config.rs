//! Process configuration parsed from environment variables.
//!
//! DESIGN
//! ======
//! `from_env` reads the real environment; `from_lookup` takes any key lookup
//! so tests can feed a map without mutating process-global env state.

use std::time::Duration;

use crate::llm::config::GatewayConfig;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_AI_TEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    /// `None` keeps the AI config in memory only.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub analysis: AnalysisSettings,
    pub gateway: GatewayConfig,
}

/// Knobs the analysis service reads on every request.
#[derive(Clone, PartialEq, Eq)]
pub struct AnalysisSettings {
    /// Fallback API key when no key has been saved (`DEFAULT_AI_KEY`).
    pub default_api_key: String,
    /// Deadline for the connectivity test.
    pub test_timeout: Duration,
}

impl std::fmt::Debug for AnalysisSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisSettings")
            .field("has_default_api_key", &!self.default_api_key.is_empty())
            .field("test_timeout", &self.test_timeout)
            .finish()
    }
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self { default_api_key: String::new(), test_timeout: Duration::from_secs(DEFAULT_AI_TEST_TIMEOUT_SECS) }
    }
}

impl AppConfig {
    /// Build typed config from the process environment.
    ///
    /// All variables are optional:
    /// - `PORT`: default 3000
    /// - `DATABASE_URL`: Postgres URL; absent → in-memory config store
    /// - `DB_MAX_CONNECTIONS`: default 5
    /// - `DEFAULT_AI_KEY`: API key used when none has been saved
    /// - `AI_TEST_TIMEOUT_SECS`: connectivity test deadline, default 10
    /// - gateway variables, see [`GatewayConfig::from_lookup`]
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());
        let analysis = AnalysisSettings {
            default_api_key: lookup("DEFAULT_AI_KEY").unwrap_or_default().trim().to_string(),
            test_timeout: Duration::from_secs(parse_or(&lookup, "AI_TEST_TIMEOUT_SECS", DEFAULT_AI_TEST_TIMEOUT_SECS)),
        };

        Self {
            port: parse_or(&lookup, "PORT", DEFAULT_PORT),
            database_url,
            db_max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS),
            analysis,
            gateway: GatewayConfig::from_lookup(&lookup),
        }
    }
}

/// Parse `key` via `lookup`, falling back to `default` when absent or invalid.
pub(crate) fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    lookup(key)
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
