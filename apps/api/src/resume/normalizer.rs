//! Cleanup of raw model output into a `ParsedResume`.
//!
//! The model's output is best-effort JSON. The cleanup steps run in a fixed
//! order and are not commutative:
//! fence-strip → newline-collapse → escape-unescape → trim.

use serde_json::Value;
use thiserror::Error;

use crate::resume::models::ParsedResume;

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("cleaned output is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("cleaned output is not a JSON object")]
    NotAnObject,

    #[error("JSON object does not match the resume shape: {0}")]
    Shape(#[source] serde_json::Error),
}

/// Removes one leading ```` ```json ```` / ```` ``` ```` marker and one trailing
/// ```` ``` ```` marker.
pub fn strip_code_fence(raw: &str) -> &str {
    let mut text = raw.trim();
    if let Some(rest) = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```JSON"))
        .or_else(|| text.strip_prefix("```"))
    {
        text = rest;
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }
    text
}

/// Drops every embedded line break.
pub fn collapse_newlines(text: &str) -> String {
    text.chars().filter(|c| !matches!(c, '\n' | '\r')).collect()
}

/// Turns literal backslash-n pairs into real newlines.
pub fn unescape_newlines(text: &str) -> String {
    text.replace("\\n", "\n")
}

/// Applies every cleanup step in order.
pub fn clean(raw: &str) -> String {
    let stripped = strip_code_fence(raw);
    let collapsed = collapse_newlines(stripped);
    let unescaped = unescape_newlines(&collapsed);
    unescaped.trim().to_string()
}

/// Cleans raw model output and parses it, checking the shape before
/// trusting it.
pub fn normalize(raw: &str) -> Result<ParsedResume, NormalizeError> {
    let cleaned = clean(raw);
    let value: Value = serde_json::from_str(&cleaned).map_err(NormalizeError::InvalidJson)?;
    if !value.is_object() {
        return Err(NormalizeError::NotAnObject);
    }
    let mut resume: ParsedResume = serde_json::from_value(value).map_err(NormalizeError::Shape)?;
    resume.tidy();
    Ok(resume)
}
