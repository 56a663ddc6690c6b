//! JSON Response Extractor. Turns a model's free-text reply into structured data.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::analysis::error::AnalysisError;
use crate::models::analysis::ShapeCheck;

const SNIPPET_CHARS: usize = 500;

/// Parses the model reply as JSON, stripping a surrounding code fence first.
/// No validation of the resulting shape happens here.
pub fn extract_json(raw: &str) -> Result<Value, AnalysisError> {
    serde_json::from_str(strip_json_fences(raw)).map_err(|e| {
        tracing::debug!("Model reply is not valid JSON: {e}");
        malformed(raw)
    })
}

/// Checks that `value` is an object matching the expected result shape `T`.
/// Returns the value untouched on success so extra fields survive.
pub fn validate_shape<T>(value: Value) -> Result<Value, AnalysisError>
where
    T: DeserializeOwned + ShapeCheck,
{
    if !value.is_object() {
        return Err(malformed(&value.to_string()));
    }

    let typed: T = serde_json::from_value(value.clone()).map_err(|e| {
        tracing::warn!("Model reply does not match expected shape: {e}");
        malformed(&value.to_string())
    })?;

    typed.check().map_err(|reason| {
        tracing::warn!("Model reply failed shape check: {reason}");
        malformed(&value.to_string())
    })?;

    Ok(value)
}

fn malformed(raw: &str) -> AnalysisError {
    AnalysisError::MalformedResponse {
        snippet: raw.chars().take(SNIPPET_CHARS).collect(),
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
/// Any language tag on the opening fence is dropped with it, whether the
/// body starts on the next line or right after the tag.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(stripped) = text.strip_prefix("```") else {
        return text;
    };

    let tag_len = stripped
        .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+')))
        .unwrap_or(stripped.len());
    let body = stripped[tag_len..].trim();

    body.strip_suffix("```").map(|s| s.trim()).unwrap_or(body)
}
