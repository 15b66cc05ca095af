//! Error codes and their HTTP translation.
//!
//! DESIGN
//! ======
//! Each error enum implements [`ErrorCode`] so the HTTP boundary can emit a
//! grepable code and a retryable hint without knowing the concrete type.
//! [`ApiError`] is the only place a domain error becomes a status code.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::llm::types::LlmError;
use crate::services::analysis::AnalysisError;
use crate::services::config::StoreError;

/// Grepable error code and retryable flag for structured error responses.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}

// =============================================================================
// API ERROR
// =============================================================================

/// JSON error response: `{success: false, error, code, retryable}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
    pub retryable: bool,
}

impl ApiError {
    #[must_use]
    pub fn new(status: StatusCode, err: &(impl ErrorCode + ?Sized)) -> Self {
        Self { status, code: err.error_code(), message: err.to_string(), retryable: err.retryable() }
    }

    #[must_use]
    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self { status: StatusCode::BAD_REQUEST, code, message: message.into(), retryable: false }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::warn!(status = self.status.as_u16(), code = self.code, error = %self.message, "api: request failed");
        } else {
            tracing::debug!(status = self.status.as_u16(), code = self.code, "api: request rejected");
        }

        let body = json!({
            "success": false,
            "error": self.message,
            "code": self.code,
            "retryable": self.retryable,
        });
        (self.status, Json(body)).into_response()
    }
}

// =============================================================================
// STATUS MAPPING
// =============================================================================

#[must_use]
pub fn llm_error_status(err: &LlmError) -> StatusCode {
    match err {
        LlmError::UnknownProvider => StatusCode::UNPROCESSABLE_ENTITY,
        LlmError::InvalidImage(_) => StatusCode::BAD_REQUEST,
        LlmError::Upstream { .. } | LlmError::MalformedResponse { .. } | LlmError::ApiRequest(_) => {
            StatusCode::BAD_GATEWAY
        }
        LlmError::HttpClientBuild(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[must_use]
pub fn store_error_status(err: &StoreError) -> StatusCode {
    match err {
        StoreError::MissingApiKey => StatusCode::BAD_REQUEST,
        StoreError::Database(_) | StoreError::Document(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[must_use]
pub fn analysis_error_status(err: &AnalysisError) -> StatusCode {
    match err {
        AnalysisError::MissingInput(_) => StatusCode::BAD_REQUEST,
        AnalysisError::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
        AnalysisError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        AnalysisError::Llm(e) => llm_error_status(e),
        AnalysisError::Store(e) => store_error_status(e),
    }
}

impl From<LlmError> for ApiError {
    fn from(err: LlmError) -> Self {
        Self::new(llm_error_status(&err), &err)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self::new(store_error_status(&err), &err)
    }
}

impl From<AnalysisError> for ApiError {
    fn from(err: AnalysisError) -> Self {
        Self::new(analysis_error_status(&err), &err)
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
