//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! This module binds the JSON API under a single Axum router. Handlers stay
//! thin: decode the body, call one service function, shape the response.
//! Every failure leaves through [`crate::error::ApiError`].

pub mod ai_config;
pub mod analyze;

use axum::Router;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::routing::{get, post};
use serde::de::DeserializeOwned;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::ApiError;
use crate::state::AppState;

// =============================================================================
// EXTRACTORS
// =============================================================================

/// JSON body extractor whose rejection uses the [`ApiError`] envelope.
/// Keeps axum's status (400, 415, 422) but replaces its plain-text body.
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(ApiError {
                status: rejection.status(),
                code: "E_INVALID_BODY",
                message: rejection.body_text(),
                retryable: false,
            }),
        }
    }
}

// =============================================================================
// ROUTER
// =============================================================================

/// Build the full application router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/analyze-chart", post(analyze::analyze_chart))
        .route("/api/explain-recommendation", post(analyze::explain_recommendation))
        .route("/api/ai-config", get(ai_config::get_ai_config).post(ai_config::set_ai_config))
        .route("/api/ai-config/migrate", post(ai_config::migrate_ai_config))
        .route("/api/ai-config/test", post(ai_config::test_ai_connection))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
