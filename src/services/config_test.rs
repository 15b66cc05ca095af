use super::*;
use serde_json::json;

fn update(api_key: Option<&str>, model: Option<&str>, persona: Option<&str>) -> AiConfigUpdate {
    AiConfigUpdate {
        api_key: api_key.map(str::to_string),
        model: model.map(str::to_string),
        persona: persona.map(str::to_string),
    }
}

// =============================================================================
// resolve_config
// =============================================================================

#[test]
fn resolve_fills_every_default() {
    let config = resolve_config(&AiConfigUpdate::default(), "");
    assert_eq!(config.api_key, "");
    assert_eq!(config.model, "gemini-1.5-flash");
    assert_eq!(config.persona, DEFAULT_PERSONA);
    assert!(config.updated_at.is_none());
}

#[test]
fn resolve_treats_blank_values_as_missing() {
    let config = resolve_config(&update(Some("   "), Some(""), Some("\n")), "AIzaFallback");
    assert_eq!(config.api_key, "AIzaFallback");
    assert_eq!(config.model, "gemini-1.5-flash");
    assert_eq!(config.persona, DEFAULT_PERSONA);
}

#[test]
fn resolve_keeps_explicit_values_trimmed() {
    let config = resolve_config(&update(Some(" sk-abc "), Some(" gpt-4o-mini "), Some(" Be brief. ")), "AIzaX");
    assert_eq!(config.api_key, "sk-abc");
    assert_eq!(config.model, "gpt-4o-mini");
    assert_eq!(config.persona, "Be brief.");
}

#[test]
fn resolve_default_model_follows_provider() {
    assert_eq!(resolve_config(&update(Some("sk-ant-1"), None, None), "").model, "claude-3-sonnet-20240229");
    assert_eq!(resolve_config(&update(Some("sk-1"), None, None), "").model, "gpt-4o");
    assert_eq!(resolve_config(&update(Some("mystery"), None, None), "").model, "gemini-1.5-flash");
}

// =============================================================================
// masking and view
// =============================================================================

#[test]
fn mask_shows_only_the_edges() {
    assert_eq!(mask_api_key("sk-proj-1234567890"), "sk-p…7890");
    assert_eq!(mask_api_key("short"), "****");
    assert_eq!(mask_api_key("12345678"), "****");
    assert_eq!(mask_api_key("sk-123456"), "****");
    assert_eq!(mask_api_key("sk-123456789"), "****");
    assert_eq!(mask_api_key("sk-1234567890"), "sk-1…7890");
}

#[test]
fn view_never_contains_the_key() {
    let config = resolve_config(&update(Some("sk-ant-api03-secretvalue"), None, None), "");
    let view = ConfigView::from(&config);
    assert_eq!(view.provider, Provider::Claude);
    assert!(view.has_api_key);
    assert!(view.is_configured);

    let rendered = serde_json::to_string(&view).unwrap();
    assert!(!rendered.contains("secretvalue"));
    assert!(rendered.contains("\"apiKeyMask\":\"sk-a…alue\""));
    assert!(rendered.contains("\"provider\":\"claude\""));
}

#[test]
fn view_of_unrecognized_key_is_not_configured() {
    let config = resolve_config(&update(Some("not-a-known-key"), None, None), "");
    let view = ConfigView::from(&config);
    assert!(view.has_api_key);
    assert!(!view.is_configured);
}

#[test]
fn debug_output_masks_key() {
    let config = resolve_config(&update(Some("sk-proj-topsecret99"), None, None), "");
    let rendered = format!("{config:?}");
    assert!(!rendered.contains("topsecret"));
}

// =============================================================================
// document shape
// =============================================================================

#[test]
fn legacy_document_is_detected() {
    let legacy: ConfigDocument =
        serde_json::from_value(json!({ "apiKey": "AIzaOld", "aiModelName": "gemini-pro" })).unwrap();
    assert!(legacy.is_legacy());

    let canonical: ConfigDocument = serde_json::from_value(json!({ "aiApiKey": "AIzaNew" })).unwrap();
    assert!(!canonical.is_legacy());

    let keyless: ConfigDocument = serde_json::from_value(json!({ "aiModelName": "gpt-4o" })).unwrap();
    assert!(!keyless.is_legacy());
}

#[test]
fn legacy_key_is_never_written_back() {
    let doc = ConfigDocument { api_key: Some("AIzaOld".into()), ..ConfigDocument::default() };
    assert_eq!(serde_json::to_value(&doc).unwrap(), json!({}));
}

// =============================================================================
// get / set / migrate
// =============================================================================

#[tokio::test]
async fn get_without_document_uses_default_key() {
    let store = MemoryConfigStore::new();
    let config = get_config(&store, "AIzaEnvDefault").await.unwrap();
    assert_eq!(config.api_key, "AIzaEnvDefault");
    assert_eq!(config.model, "gemini-1.5-flash");
    assert_eq!(config.persona, DEFAULT_PERSONA);
}

#[tokio::test]
async fn get_reads_legacy_key() {
    let store = MemoryConfigStore::with_document(ConfigDocument {
        api_key: Some("sk-legacy-key".into()),
        ai_model_name: Some("gpt-4o-mini".into()),
        ..ConfigDocument::default()
    });
    let config = get_config(&store, "AIzaEnvDefault").await.unwrap();
    assert_eq!(config.api_key, "sk-legacy-key");
    assert_eq!(config.model, "gpt-4o-mini");
}

#[tokio::test]
async fn set_requires_api_key() {
    let store = MemoryConfigStore::new();
    let err = set_config(&store, &update(Some("  "), Some("gpt-4o"), None)).await.unwrap_err();
    assert!(matches!(err, StoreError::MissingApiKey));
    assert!(store.load().await.unwrap().is_none());
}

#[tokio::test]
async fn set_then_get_round_trips_through_store() {
    let store = MemoryConfigStore::new();
    let saved = set_config(&store, &update(Some("sk-ant-xyz"), None, Some("Analis singkat."))).await.unwrap();
    assert_eq!(saved.model, "claude-3-sonnet-20240229");
    assert!(saved.updated_at.is_some());

    let doc = store.load().await.unwrap().unwrap();
    assert_eq!(doc.ai_api_key.as_deref(), Some("sk-ant-xyz"));
    assert!(doc.migrated_from.is_none());

    let loaded = get_config(&store, "").await.unwrap();
    assert_eq!(loaded, saved);
}

#[tokio::test]
async fn migrate_rewrites_legacy_document() {
    let store = MemoryConfigStore::with_document(ConfigDocument {
        api_key: Some("AIzaLegacy".into()),
        ..ConfigDocument::default()
    });
    let outcome = migrate_config(&store).await.unwrap();
    assert!(outcome.migrated);
    assert_eq!(outcome.model.as_deref(), Some("gemini-1.5-flash"));

    let doc = store.load().await.unwrap().unwrap();
    assert_eq!(doc.ai_api_key.as_deref(), Some("AIzaLegacy"));
    assert_eq!(doc.ai_persona.as_deref(), Some(DEFAULT_PERSONA));
    assert_eq!(doc.migrated_from.as_deref(), Some("legacy"));
    assert!(doc.updated_at.is_some());
    assert!(!doc.is_legacy());
}

#[tokio::test]
async fn migrate_leaves_canonical_document_alone() {
    let original = ConfigDocument {
        ai_api_key: Some("sk-current".into()),
        ai_model_name: Some("gpt-4o".into()),
        ..ConfigDocument::default()
    };
    let store = MemoryConfigStore::with_document(original.clone());
    let outcome = migrate_config(&store).await.unwrap();
    assert!(!outcome.migrated);
    assert_eq!(outcome.message, "Konfigurasi sudah dalam format baru");
    assert_eq!(store.load().await.unwrap(), Some(original));
}

#[tokio::test]
async fn migrate_is_idempotent() {
    let store = MemoryConfigStore::with_document(ConfigDocument {
        api_key: Some("sk-legacy-openai".into()),
        ..ConfigDocument::default()
    });
    assert!(migrate_config(&store).await.unwrap().migrated);
    let after_first = store.load().await.unwrap();

    let second = migrate_config(&store).await.unwrap();
    assert!(!second.migrated);
    assert_eq!(store.load().await.unwrap(), after_first);
}

#[tokio::test]
async fn migrate_leaves_keyless_document_alone() {
    let original = ConfigDocument { ai_model_name: Some("gpt-4o".into()), ..ConfigDocument::default() };
    let store = MemoryConfigStore::with_document(original.clone());

    for _ in 0..2 {
        let outcome = migrate_config(&store).await.unwrap();
        assert!(!outcome.migrated);
    }
    let doc = store.load().await.unwrap().unwrap();
    assert_eq!(doc, original);
    assert!(doc.ai_api_key.is_none());
    assert!(doc.migrated_from.is_none());
}

#[test]
fn canonical_document_never_stores_blank_key() {
    let config = resolve_config(&update(None, Some("gpt-4o"), None), "");
    let doc = ConfigDocument::canonical(&config, None);
    assert!(doc.ai_api_key.is_none());
    assert!(serde_json::to_value(&doc).unwrap().get("aiApiKey").is_none());
}

#[tokio::test]
async fn migrate_without_document_is_a_no_op() {
    let store = MemoryConfigStore::new();
    let outcome = migrate_config(&store).await.unwrap();
    assert!(!outcome.migrated);
    assert!(store.load().await.unwrap().is_none());
}
