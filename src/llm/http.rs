//! Shared HTTP plumbing for the provider adapters.
//!
//! Every adapter posts JSON and gets back either a 2xx body (parsed by the
//! adapter) or a vendor error, which is normalized here.

use serde::Serialize;
use serde_json::Value;

use super::provider::Provider;
use super::types::LlmError;

/// Send `body` as JSON and return the raw 2xx response text.
///
/// # Errors
///
/// Returns [`LlmError::ApiRequest`] on transport failure and
/// [`LlmError::Upstream`] on any non-2xx status.
pub(crate) async fn send_json(
    provider: Provider,
    request: reqwest::RequestBuilder,
    body: &impl Serialize,
) -> Result<String, LlmError> {
    let response = request
        .json(body)
        .send()
        .await
        .map_err(|e| LlmError::ApiRequest(e.without_url().to_string()))?;

    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| LlmError::ApiRequest(e.without_url().to_string()))?;

    if !status.is_success() {
        return Err(upstream_error(provider, status.as_u16(), &text));
    }
    Ok(text)
}

/// Build an upstream error, preferring the vendor's own message.
pub(crate) fn upstream_error(provider: Provider, status: u16, body: &str) -> LlmError {
    let message = vendor_error_message(body).unwrap_or_else(|| body.trim().to_string());
    LlmError::Upstream { provider, status, message }
}

/// Extract `error.message` (all supported vendors) or a bare string `error`.
fn vendor_error_message(body: &str) -> Option<String> {
    let root: Value = serde_json::from_str(body).ok()?;
    let error = root.get("error")?;
    let message = match error {
        Value::String(s) => s.as_str(),
        other => other.get("message").and_then(Value::as_str)?,
    };
    let message = message.trim();
    if message.is_empty() { None } else { Some(message.to_string()) }
}
