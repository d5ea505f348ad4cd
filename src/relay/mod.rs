//! Inference relay
//!
//! Forwards one chat message to the inference host and turns whatever comes
//! back into either reply text or a [`RelayError`]. Single attempt, no retries,
//! no state kept between calls.

mod error;
pub mod extract;
pub mod prompt;
mod upstream;

use serde_json::Value;

use extract::extract_reply;
use prompt::InferencePayload;

pub use error::RelayError;
pub use upstream::{HttpUpstream, InferenceUpstream, UpstreamReply};

/// Relay `message` to `upstream` using the caller's `credential`.
///
/// Missing or empty inputs are rejected before any network traffic.
pub async fn relay(
    upstream: &dyn InferenceUpstream,
    message: Option<&str>,
    credential: Option<&str>,
) -> Result<String, RelayError> {
    let (message, credential) = validate(message, credential)?;
    let payload = InferencePayload::for_message(message);
    let reply = upstream.complete(credential, &payload).await?;
    let envelope = classify(&reply)?;
    Ok(extract_reply(&envelope))
}

fn validate<'a>(
    message: Option<&'a str>,
    credential: Option<&'a str>,
) -> Result<(&'a str, &'a str), RelayError> {
    match (message, credential) {
        (Some(m), Some(c)) if !m.is_empty() && !c.is_empty() => Ok((m, c)),
        _ => Err(RelayError::MissingField),
    }
}

/// Map the upstream status and body to a parsed envelope or a terminal error
pub fn classify(reply: &UpstreamReply) -> Result<Value, RelayError> {
    match reply.status {
        200 => serde_json::from_slice(&reply.body).map_err(|e| RelayError::Parse(e.to_string())),
        401 => Err(RelayError::InvalidCredential),
        code => Err(RelayError::UpstreamStatus(code)),
    }
}
