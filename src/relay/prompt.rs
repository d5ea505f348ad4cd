//! Upstream request composition
//!
//! Builds the text-generation payload sent to the inference host. Generation
//! parameters are fixed; only the user message varies.

use serde::Serialize;

/// Persona placed in front of every user message
pub const SYSTEM_PREAMBLE: &str =
    "You are EpiCare, a compassionate support chatbot for people with epilepsy.";

/// Marker that cues the model to answer, and later splits the answer out
pub const CUE_MARKER: &str = "Assistant:";

pub const MAX_NEW_TOKENS: u32 = 300;
pub const TEMPERATURE: f64 = 0.7;
pub const TOP_P: f64 = 0.95;

/// Body of the outbound inference request
#[derive(Debug, Clone, Serialize)]
pub struct InferencePayload {
    pub inputs: String,
    pub parameters: GenerationParameters,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct GenerationParameters {
    pub max_new_tokens: u32,
    pub temperature: f64,
    pub top_p: f64,
}

impl Default for GenerationParameters {
    fn default() -> Self {
        Self {
            max_new_tokens: MAX_NEW_TOKENS,
            temperature: TEMPERATURE,
            top_p: TOP_P,
        }
    }
}

impl InferencePayload {
    pub fn for_message(message: &str) -> Self {
        Self {
            inputs: compose_prompt(message),
            parameters: GenerationParameters::default(),
        }
    }
}

/// `<preamble>\n\nUser: <message>\n\nAssistant:`
pub fn compose_prompt(message: &str) -> String {
    format!("{SYSTEM_PREAMBLE}\n\nUser: {message}\n\n{CUE_MARKER}")
}
