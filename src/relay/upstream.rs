//! Outbound inference client
//!
//! `InferenceUpstream` is the seam between the relay and the network. The
//! production implementation is [`HttpUpstream`]; tests plug in stubs.

use async_trait::async_trait;
use hyper::body::Bytes;
use reqwest::Client;
use std::time::Duration;

use super::error::RelayError;
use super::prompt::InferencePayload;
use crate::config::UpstreamConfig;

/// Raw upstream answer: status plus the fully buffered body
#[derive(Debug, Clone)]
pub struct UpstreamReply {
    pub status: u16,
    pub body: Bytes,
}

impl UpstreamReply {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// One text-generation call against the inference host
#[async_trait]
pub trait InferenceUpstream: Send + Sync {
    /// Send `payload` authorized by `credential` and wait for the whole answer.
    ///
    /// Only transport-level problems are errors here. Any HTTP status,
    /// including failures, comes back as an `UpstreamReply`.
    async fn complete(
        &self,
        credential: &str,
        payload: &InferencePayload,
    ) -> Result<UpstreamReply, RelayError>;
}

/// `reqwest` backed upstream talking JSON over HTTPS
pub struct HttpUpstream {
    client: Client,
    url: String,
}

impl HttpUpstream {
    pub fn new(config: &UpstreamConfig) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder();
        if config.timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(config.timeout_secs));
        }

        Ok(Self {
            client: builder.build()?,
            url: config.url.clone(),
        })
    }
}

#[async_trait]
impl InferenceUpstream for HttpUpstream {
    async fn complete(
        &self,
        credential: &str,
        payload: &InferencePayload,
    ) -> Result<UpstreamReply, RelayError> {
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(credential)
            .json(payload)
            .send()
            .await
            .map_err(classify_send_error)?;

        let status = response.status().as_u16();
        match response.bytes().await {
            Ok(body) => Ok(UpstreamReply::new(status, body)),
            // The body only matters on success; keep the status otherwise
            Err(e) if status == 200 => Err(RelayError::Unreachable(format!(
                "failed to read response body: {e}"
            ))),
            Err(_) => Ok(UpstreamReply::new(status, Bytes::new())),
        }
    }
}

/// A request that could not even be built (e.g. a credential that is not a
/// valid header value) is our fault; everything else is the network's.
fn classify_send_error(err: reqwest::Error) -> RelayError {
    if err.is_builder() {
        RelayError::Internal(format!("failed to build upstream request: {err}"))
    } else if err.is_timeout() {
        RelayError::Unreachable(format!("upstream timed out: {err}"))
    } else {
        RelayError::Unreachable(err.to_string())
    }
}
