//! Relay failure taxonomy and its mapping to client responses

use hyper::StatusCode;
use thiserror::Error;

/// Terminal outcomes of a chat relay that are not a reply.
///
/// The `String` payloads are diagnostics for the error log only; the client
/// sees `client_message()` and nothing else.
#[derive(Debug, Error)]
pub enum RelayError {
    /// `message` or `token` absent or empty. No upstream call was made.
    #[error("message and token are required")]
    MissingField,

    /// Upstream answered 401.
    #[error("upstream rejected the credential")]
    InvalidCredential,

    /// Upstream answered with a status other than 200 or 401.
    #[error("upstream returned status {0}")]
    UpstreamStatus(u16),

    /// Connection refused, reset, timed out, or the body could not be read.
    #[error("upstream unreachable: {0}")]
    Unreachable(String),

    /// Upstream answered 200 with a body that is not JSON.
    #[error("upstream body is not valid JSON: {0}")]
    Parse(String),

    /// Fault on our side while handling the request.
    #[error("internal error: {0}")]
    Internal(String),
}

impl RelayError {
    /// HTTP status written to the client
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingField => StatusCode::BAD_REQUEST,
            Self::InvalidCredential => StatusCode::UNAUTHORIZED,
            Self::UpstreamStatus(code) => {
                StatusCode::from_u16(*code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            Self::Unreachable(_) | Self::Parse(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Text of the `error` field in the JSON body
    pub fn client_message(&self) -> String {
        match self {
            Self::MissingField => "Message and token required".to_string(),
            Self::InvalidCredential => "Invalid API token".to_string(),
            Self::UpstreamStatus(code) => format!("API Error: {code}"),
            Self::Unreachable(_) => "Request error".to_string(),
            Self::Parse(_) => "Parse error".to_string(),
            Self::Internal(_) => "Server error".to_string(),
        }
    }

    /// Short label for log lines
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::MissingField => "missing_field",
            Self::InvalidCredential => "invalid_credential",
            Self::UpstreamStatus(_) => "upstream_status",
            Self::Unreachable(_) => "upstream_unreachable",
            Self::Parse(_) => "parse_failure",
            Self::Internal(_) => "internal",
        }
    }
}
