use serde_json::Value;

/// Normalizes a resume field for prompt interpolation.
///
/// Strings have every whitespace run (newlines included) collapsed to a single
/// space and are trimmed. Anything that is not a string yields `""`.
pub fn sanitize(value: &Value) -> String {
    value.as_str().map(collapse_whitespace).unwrap_or_default()
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
