//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the AI gateway, the config store, and the analysis settings, each
//! constructed once in `main` and shared behind an `Arc`. Nothing in here is
//! mutable; the only mutable data (the stored AI config) lives behind the
//! store.

use std::sync::Arc;

use crate::config::AnalysisSettings;
use crate::llm::LlmChat;
use crate::services::config::ConfigStore;

/// Shared application state, injected into Axum handlers via State extractor.
#[derive(Clone)]
pub struct AppState {
    pub llm: Arc<dyn LlmChat>,
    pub store: Arc<dyn ConfigStore>,
    pub analysis: Arc<AnalysisSettings>,
}

impl AppState {
    #[must_use]
    pub fn new(llm: Arc<dyn LlmChat>, store: Arc<dyn ConfigStore>, analysis: AnalysisSettings) -> Self {
        Self { llm, store, analysis: Arc::new(analysis) }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
#[path = "state_helpers_test.rs"]
pub mod test_helpers;
