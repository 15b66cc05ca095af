//! Response normalizer — raw model text to a structured recommendation.
//!
//! DESIGN
//! ======
//! Two stages, each usable on its own:
//! 1. [`parse_structured`]: strict decode of the JSON object the persona asks
//!    for, tolerating a Markdown code fence and Indonesian labels.
//! 2. [`classify_keywords`]: keyword scan used when stage 1 fails. The whole
//!    raw text becomes the explanation and confidence is fixed at medium.
//!
//! Models do not reliably emit valid JSON, so [`normalize`] never fails.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Recommendation {
    Buy,
    Sell,
    Wait,
}

impl Recommendation {
    /// Case-insensitive label, English or Indonesian.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "buy" | "beli" => Some(Self::Buy),
            "sell" | "jual" => Some(Self::Sell),
            "wait" | "tunggu" | "hold" => Some(Self::Wait),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
            Self::Wait => "WAIT",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    #[default]
    Medium,
    High,
}

impl Confidence {
    /// Unknown labels read as medium.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "low" | "rendah" => Self::Low,
            "high" | "tinggi" => Self::High,
            _ => Self::Medium,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisResult {
    pub recommendation: Recommendation,
    pub explanation: String,
    pub confidence: Confidence,
}

// =============================================================================
// STAGES
// =============================================================================

/// Stage 1. `None` unless the text is a JSON object with a recognizable
/// `recommendation` and a string `explanation` (or `reasoning`).
#[must_use]
pub fn parse_structured(raw: &str) -> Option<AnalysisResult> {
    let root: Value = serde_json::from_str(strip_code_fence(raw)).ok()?;
    let object = root.as_object()?;

    let recommendation = object
        .get("recommendation")
        .and_then(Value::as_str)
        .and_then(Recommendation::from_label)?;
    let explanation = object
        .get("explanation")
        .or_else(|| object.get("reasoning"))
        .and_then(Value::as_str)?
        .to_string();
    let confidence = object
        .get("confidence")
        .and_then(Value::as_str)
        .map(Confidence::from_label)
        .unwrap_or_default();

    Some(AnalysisResult { recommendation, explanation, confidence })
}

/// Stage 2. Buy keywords win over sell keywords; no keyword means wait.
#[must_use]
pub fn classify_keywords(raw: &str) -> Recommendation {
    let upper = raw.to_uppercase();
    if upper.contains("BUY") || upper.contains("BELI") {
        Recommendation::Buy
    } else if upper.contains("SELL") || upper.contains("JUAL") {
        Recommendation::Sell
    } else {
        Recommendation::Wait
    }
}

/// Normalize raw model text. Falls back to the keyword stage on any
/// structured-parse failure.
#[must_use]
pub fn normalize(raw: &str) -> AnalysisResult {
    if let Some(result) = parse_structured(raw) {
        return result;
    }

    tracing::debug!(raw_len = raw.len(), "normalize: structured parse failed, using keyword fallback");
    AnalysisResult {
        recommendation: classify_keywords(raw),
        explanation: raw.to_string(),
        confidence: Confidence::Medium,
    }
}

/// Unwrap "```json\n{...}\n```". Text without a fence is returned trimmed.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
