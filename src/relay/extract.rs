//! Reply extraction from the inference envelope

use serde_json::Value;

use super::prompt::CUE_MARKER;

/// Returned when the envelope parses but does not carry any text
pub const FALLBACK_REPLY: &str = "I'm here to help.";

/// Pull the model's answer out of a parsed envelope.
///
/// The envelope is expected to be `[{"generated_text": "..."}]` where the text
/// echoes the prompt. Everything after the last cue marker is the answer.
/// Any other shape yields [`FALLBACK_REPLY`]; this never fails.
pub fn extract_reply(envelope: &Value) -> String {
    let generated = envelope
        .get(0)
        .and_then(|first| first.get("generated_text"))
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty());

    match generated {
        Some(text) => split_after_cue(text),
        None => FALLBACK_REPLY.to_string(),
    }
}

/// Text after the last cue marker, trimmed; the whole text if no marker
fn split_after_cue(text: &str) -> String {
    match text.rfind(CUE_MARKER) {
        Some(idx) => text[idx + CUE_MARKER.len()..].trim().to_string(),
        None => text.to_string(),
    }
}
