//! Chat endpoint
//!
//! Reads the JSON body of `POST /api/chat`, runs the relay, and writes the one
//! JSON response the request gets.

use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::{Response, StatusCode};
use serde::{Deserialize, Serialize};

use crate::config::AppState;
use crate::http;
use crate::logger;
use crate::relay::{self, RelayError};

/// Inbound chat body; both fields are required but checked by the relay
#[derive(Debug, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Serialize)]
struct ChatReply {
    response: String,
}

#[derive(Debug, Serialize)]
struct ChatFailure {
    error: String,
}

/// Handle `POST /api/chat`
pub async fn handle_chat<B>(body: B, state: &AppState) -> Response<Full<Bytes>>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let max_body_size = usize::try_from(state.config.http.max_body_size).unwrap_or(usize::MAX);

    let bytes = match Limited::new(body, max_body_size).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            logger::log_warning(&format!("Chat request body exceeds {max_body_size} bytes"));
            return http::build_413_response();
        }
        Err(e) => {
            return failure(&RelayError::Internal(format!("failed to read request body: {e}")));
        }
    };

    // A body that is not a JSON object carries neither field
    let request: ChatRequest = serde_json::from_slice(&bytes).unwrap_or_default();

    match relay::relay(
        state.upstream.as_ref(),
        request.message.as_deref(),
        request.token.as_deref(),
    )
    .await
    {
        Ok(response) => {
            logger::log_relay_success(response.len());
            http::json_response(StatusCode::OK, &ChatReply { response })
        }
        Err(err) => failure(&err),
    }
}

fn failure(err: &RelayError) -> Response<Full<Bytes>> {
    logger::log_relay_failure(err.kind(), err.status().as_u16(), &err.to_string());
    http::json_response(
        err.status(),
        &ChatFailure {
            error: err.client_message(),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::test_config;
    use crate::relay::tests::StubUpstream;
    use crate::relay::extract::FALLBACK_REPLY;
    use std::path::PathBuf;
    use std::sync::Arc;

    fn state_with(stub: &Arc<StubUpstream>) -> AppState {
        let upstream: Arc<dyn relay::InferenceUpstream> = stub.clone();
        AppState::with_upstream(&test_config(PathBuf::from("public")), upstream)
    }

    async fn call(stub: &Arc<StubUpstream>, body: &str) -> (StatusCode, serde_json::Value) {
        let state = state_with(stub);
        let resp = handle_chat(Full::new(Bytes::from(body.to_string())), &state).await;
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_missing_fields_are_400_without_upstream_call() {
        let stub = Arc::new(StubUpstream::replying(200, "[]"));
        let bodies = [
            r#"{"message":"hi"}"#,
            r#"{"token":"hf_x"}"#,
            r#"{"message":"","token":"hf_x"}"#,
            r#"{"message":"hi","token":""}"#,
            r#"{"message":null,"token":"hf_x"}"#,
            r#"{"message":5,"token":"hf_x"}"#,
            r#"{"message":"hi","token":true}"#,
            r"{}",
            "",
            "not json",
        ];

        for body in bodies {
            let (status, json) = call(&stub, body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
            assert_eq!(json["error"], "Message and token required");
        }
        assert_eq!(stub.call_count(), 0);
    }

    #[tokio::test]
    async fn test_success_reply() {
        let stub = Arc::new(StubUpstream::replying(
            200,
            r#"[{"generated_text":"You are EpiCare.\n\nAssistant: Hello there"}]"#,
        ));
        let (status, json) = call(&stub, r#"{"message":"hi","token":"hf_x"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, serde_json::json!({ "response": "Hello there" }));
    }

    #[tokio::test]
    async fn test_empty_envelope_is_fallback() {
        for body in ["[]", "[{}]"] {
            let stub = Arc::new(StubUpstream::replying(200, body));
            let (status, json) = call(&stub, r#"{"message":"hi","token":"hf_x"}"#).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(json["response"], FALLBACK_REPLY);
        }
    }

    #[tokio::test]
    async fn test_upstream_401() {
        let stub = Arc::new(StubUpstream::replying(401, "{}"));
        let (status, json) = call(&stub, r#"{"message":"hi","token":"bad"}"#).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json, serde_json::json!({ "error": "Invalid API token" }));
    }

    #[tokio::test]
    async fn test_upstream_status_forwarded() {
        let stub = Arc::new(StubUpstream::replying(503, "busy"));
        let (status, json) = call(&stub, r#"{"message":"hi","token":"hf_x"}"#).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json["error"], "API Error: 503");
    }

    #[tokio::test]
    async fn test_non_json_upstream_body_is_parse_error() {
        let stub = Arc::new(StubUpstream::replying(200, "<html>oops</html>"));
        let (status, json) = call(&stub, r#"{"message":"hi","token":"hf_x"}"#).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "Parse error");
    }

    #[tokio::test]
    async fn test_transport_failure_is_request_error() {
        let stub = Arc::new(StubUpstream::failing(RelayError::Unreachable(
            "connection refused".into(),
        )));
        let (status, json) = call(&stub, r#"{"message":"hi","token":"hf_x"}"#).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json, serde_json::json!({ "error": "Request error" }));
    }

    #[tokio::test]
    async fn test_oversized_body_is_413() {
        let stub = Arc::new(StubUpstream::replying(200, "[]"));
        let state = state_with(&stub);
        let big = format!(r#"{{"message":"{}","token":"hf_x"}}"#, "a".repeat(2 * 1024));
        let resp = handle_chat(Full::new(Bytes::from(big)), &state).await;
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(stub.call_count(), 0);
    }
}
