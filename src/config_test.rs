use super::*;
use std::collections::HashMap;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    move |key: &str| map.get(key).cloned()
}

#[test]
fn empty_environment_uses_defaults() {
    let cfg = AppConfig::from_lookup(lookup_from(&[]));
    assert_eq!(cfg.port, DEFAULT_PORT);
    assert!(cfg.database_url.is_none());
    assert_eq!(cfg.db_max_connections, DEFAULT_DB_MAX_CONNECTIONS);
    assert_eq!(cfg.analysis, AnalysisSettings::default());
    assert_eq!(cfg.analysis.test_timeout, Duration::from_secs(10));
}

#[test]
fn overrides_are_parsed() {
    let cfg = AppConfig::from_lookup(lookup_from(&[
        ("PORT", "8080"),
        ("DATABASE_URL", "postgres://localhost/fx"),
        ("DB_MAX_CONNECTIONS", "12"),
        ("DEFAULT_AI_KEY", "  AIzaDefault  "),
        ("AI_TEST_TIMEOUT_SECS", "3"),
    ]));
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.database_url.as_deref(), Some("postgres://localhost/fx"));
    assert_eq!(cfg.db_max_connections, 12);
    assert_eq!(cfg.analysis.default_api_key, "AIzaDefault");
    assert_eq!(cfg.analysis.test_timeout, Duration::from_secs(3));
}

#[test]
fn invalid_numbers_fall_back_to_defaults() {
    let cfg = AppConfig::from_lookup(lookup_from(&[("PORT", "not-a-port"), ("AI_TEST_TIMEOUT_SECS", "-1")]));
    assert_eq!(cfg.port, DEFAULT_PORT);
    assert_eq!(cfg.analysis.test_timeout, Duration::from_secs(DEFAULT_AI_TEST_TIMEOUT_SECS));
}

#[test]
fn blank_database_url_means_in_memory() {
    let cfg = AppConfig::from_lookup(lookup_from(&[("DATABASE_URL", "   ")]));
    assert!(cfg.database_url.is_none());
}

#[test]
fn analysis_settings_debug_hides_key() {
    let settings = AnalysisSettings { default_api_key: "sk-hidden".into(), ..AnalysisSettings::default() };
    let rendered = format!("{settings:?}");
    assert!(!rendered.contains("sk-hidden"));
    assert!(rendered.contains("has_default_api_key: true"));
}
