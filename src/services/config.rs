//! AI configuration service — the stored document, defaults, and migration.
//!
//! DESIGN
//! ======
//! One JSON document holds the admin-chosen API key, model, and persona.
//! Storage is behind the [`ConfigStore`] trait (Postgres in production, an
//! in-memory slot in tests and when no database is configured). Defaults are
//! filled in exactly one place, [`resolve_config`].
//!
//! LEGACY DOCUMENTS
//! ================
//! Older deployments wrote the key as `apiKey`. Such a document has no
//! `aiApiKey` and is treated as legacy: it is still readable, and
//! [`migrate_config`] rewrites it in the canonical shape.

use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tokio::sync::RwLock;
use tracing::info;

use crate::llm::provider::Provider;

/// Row key in the `settings` table.
pub const AI_CONFIG_KEY: &str = "ai_config";

pub const DEFAULT_PERSONA: &str = "Anda adalah seorang analis perdagangan Forex ahli. \
Analisis gambar grafik Forex yang diberikan. \
Berikan rekomendasi perdagangan (BUY, SELL, atau WAIT) dan penjelasan rinci. \
Fokus pada pola teknikal, tren, support/resistance, dan risk/reward ratio.";

const MIGRATED_FROM_LEGACY: &str = "legacy";

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("API key diperlukan dan harus berupa string.")]
    MissingApiKey,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("stored AI config is not a valid document: {0}")]
    Document(#[from] serde_json::Error),
}

impl crate::error::ErrorCode for StoreError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingApiKey => "E_MISSING_API_KEY",
            Self::Database(_) => "E_DATABASE",
            Self::Document(_) => "E_CONFIG_DOCUMENT",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Database(_))
    }
}

/// The persisted document, field names as stored.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_api_key: Option<String>,
    /// Legacy key field. Read, never written.
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_model_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_persona: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub migrated_from: Option<String>,
}

impl ConfigDocument {
    /// A document whose only key is the legacy `apiKey` field.
    #[must_use]
    pub fn is_legacy(&self) -> bool {
        non_blank(self.ai_api_key.as_deref()).is_none() && non_blank(self.api_key.as_deref()).is_some()
    }

    fn stored_key(&self) -> Option<&str> {
        non_blank(self.ai_api_key.as_deref()).or_else(|| non_blank(self.api_key.as_deref()))
    }

    fn as_update(&self) -> AiConfigUpdate {
        AiConfigUpdate {
            api_key: self.stored_key().map(str::to_string),
            model: self.ai_model_name.clone(),
            persona: self.ai_persona.clone(),
        }
    }

    fn canonical(config: &AiConfig, migrated_from: Option<&str>) -> Self {
        Self {
            ai_api_key: non_blank(Some(&config.api_key)).map(str::to_string),
            api_key: None,
            ai_model_name: Some(config.model.clone()),
            ai_persona: Some(config.persona.clone()),
            updated_at: config.updated_at.clone(),
            migrated_from: migrated_from.map(str::to_string),
        }
    }
}

impl fmt::Debug for ConfigDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigDocument")
            .field("has_ai_api_key", &self.ai_api_key.is_some())
            .field("has_legacy_api_key", &self.api_key.is_some())
            .field("ai_model_name", &self.ai_model_name)
            .field("updated_at", &self.updated_at)
            .field("migrated_from", &self.migrated_from)
            .finish_non_exhaustive()
    }
}

/// Fully resolved configuration handed to the gateway.
#[derive(Clone, PartialEq, Eq)]
pub struct AiConfig {
    pub api_key: String,
    pub model: String,
    pub persona: String,
    pub updated_at: Option<String>,
}

impl AiConfig {
    #[must_use]
    pub fn provider(&self) -> Provider {
        Provider::detect(&self.api_key)
    }

    #[must_use]
    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

impl fmt::Debug for AiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AiConfig")
            .field("api_key", &mask_api_key(&self.api_key))
            .field("model", &self.model)
            .field("persona_len", &self.persona.len())
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// Partial configuration. Blank strings count as absent.
#[derive(Clone, Default)]
pub struct AiConfigUpdate {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub persona: Option<String>,
}

impl fmt::Debug for AiConfigUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AiConfigUpdate")
            .field("has_api_key", &self.api_key.is_some())
            .field("model", &self.model)
            .field("has_persona", &self.persona.is_some())
            .finish()
    }
}

/// Outcome of [`migrate_config`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationOutcome {
    pub migrated: bool,
    pub message: &'static str,
    /// Resolved model after migration, when a document was rewritten.
    pub model: Option<String>,
}

/// Public, key-free view of the stored configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigView {
    pub provider: Provider,
    pub ai_model_name: String,
    pub ai_persona: String,
    pub has_api_key: bool,
    pub is_configured: bool,
    pub updated_at: Option<String>,
    pub api_key_mask: Option<String>,
}

impl From<&AiConfig> for ConfigView {
    fn from(config: &AiConfig) -> Self {
        let provider = config.provider();
        let has_api_key = config.has_api_key();
        Self {
            provider,
            ai_model_name: config.model.clone(),
            ai_persona: config.persona.clone(),
            has_api_key,
            is_configured: has_api_key && provider != Provider::Unknown,
            updated_at: config.updated_at.clone(),
            api_key_mask: has_api_key.then(|| mask_api_key(&config.api_key)),
        }
    }
}

// =============================================================================
// DEFAULTS
// =============================================================================

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Fill every missing field. Model defaults follow the provider of the
/// resolved key; an unrecognized or empty key gets the Gemini default.
#[must_use]
pub fn resolve_config(partial: &AiConfigUpdate, default_api_key: &str) -> AiConfig {
    let api_key = non_blank(partial.api_key.as_deref())
        .unwrap_or_else(|| default_api_key.trim())
        .to_string();
    let model = non_blank(partial.model.as_deref())
        .unwrap_or_else(|| Provider::detect(&api_key).default_model())
        .to_string();
    let persona = non_blank(partial.persona.as_deref())
        .unwrap_or(DEFAULT_PERSONA)
        .to_string();

    AiConfig { api_key, model, persona, updated_at: None }
}

const MASK_HIDE_MAX_LEN: usize = 12;

/// `sk-p…1234` style mask. Keys of twelve characters or fewer are fully hidden.
#[must_use]
pub fn mask_api_key(api_key: &str) -> String {
    let chars: Vec<char> = api_key.trim().chars().collect();
    if chars.len() <= MASK_HIDE_MAX_LEN {
        return "****".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}…{tail}")
}

fn now_rfc3339() -> Option<String> {
    OffsetDateTime::now_utc().format(&Rfc3339).ok()
}

// =============================================================================
// STORE
// =============================================================================

/// Storage for the single AI configuration document.
#[async_trait::async_trait]
pub trait ConfigStore: Send + Sync {
    async fn load(&self) -> Result<Option<ConfigDocument>, StoreError>;
    async fn save(&self, document: &ConfigDocument) -> Result<(), StoreError>;
}

/// JSONB row in the `settings` table.
pub struct PgConfigStore {
    pool: PgPool,
}

impl PgConfigStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ConfigStore for PgConfigStore {
    async fn load(&self) -> Result<Option<ConfigDocument>, StoreError> {
        let value = sqlx::query_scalar::<_, serde_json::Value>("SELECT value FROM settings WHERE key = $1")
            .bind(AI_CONFIG_KEY)
            .fetch_optional(&self.pool)
            .await?;

        Ok(value.map(serde_json::from_value).transpose()?)
    }

    async fn save(&self, document: &ConfigDocument) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO settings (key, value, updated_at)
             VALUES ($1, $2, now())
             ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = now()",
        )
        .bind(AI_CONFIG_KEY)
        .bind(sqlx::types::Json(document))
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

/// Process-local store. Contents are lost on restart.
#[derive(Default)]
pub struct MemoryConfigStore {
    document: RwLock<Option<ConfigDocument>>,
}

impl MemoryConfigStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_document(document: ConfigDocument) -> Self {
        Self { document: RwLock::new(Some(document)) }
    }
}

#[async_trait::async_trait]
impl ConfigStore for MemoryConfigStore {
    async fn load(&self) -> Result<Option<ConfigDocument>, StoreError> {
        Ok(self.document.read().await.clone())
    }

    async fn save(&self, document: &ConfigDocument) -> Result<(), StoreError> {
        *self.document.write().await = Some(document.clone());
        Ok(())
    }
}

// =============================================================================
// OPERATIONS
// =============================================================================

/// Read the stored configuration with defaults filled in. A missing or
/// legacy document still resolves; the key falls back to `default_api_key`.
///
/// # Errors
///
/// Returns a store error if the document cannot be read or decoded.
pub async fn get_config(store: &dyn ConfigStore, default_api_key: &str) -> Result<AiConfig, StoreError> {
    let document = store.load().await?.unwrap_or_default();
    let mut config = resolve_config(&document.as_update(), default_api_key);
    config.updated_at = document.updated_at;
    Ok(config)
}

/// Resolve and persist an admin update. The API key is mandatory.
///
/// # Errors
///
/// Returns [`StoreError::MissingApiKey`] for a blank key, or a store error
/// if the write fails.
pub async fn set_config(store: &dyn ConfigStore, update: &AiConfigUpdate) -> Result<AiConfig, StoreError> {
    if non_blank(update.api_key.as_deref()).is_none() {
        return Err(StoreError::MissingApiKey);
    }

    let mut config = resolve_config(update, "");
    config.updated_at = now_rfc3339();
    store.save(&ConfigDocument::canonical(&config, None)).await?;

    info!(provider = %config.provider(), model = %config.model, "ai config saved");
    Ok(config)
}

/// Rewrite a legacy document in canonical form.
///
/// # Errors
///
/// Returns a store error if the document cannot be read or written.
pub async fn migrate_config(store: &dyn ConfigStore) -> Result<MigrationOutcome, StoreError> {
    let Some(document) = store.load().await? else {
        return Ok(MigrationOutcome { migrated: false, message: "Belum ada konfigurasi untuk dimigrasi", model: None });
    };
    if !document.is_legacy() {
        return Ok(MigrationOutcome { migrated: false, message: "Konfigurasi sudah dalam format baru", model: None });
    }

    let mut config = resolve_config(&document.as_update(), "");
    config.updated_at = now_rfc3339();
    store
        .save(&ConfigDocument::canonical(&config, Some(MIGRATED_FROM_LEGACY)))
        .await?;

    info!(model = %config.model, has_api_key = config.has_api_key(), "ai config migrated from legacy");
    Ok(MigrationOutcome {
        migrated: true,
        message: "Konfigurasi berhasil dimigrasi ke format baru",
        model: Some(config.model),
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
