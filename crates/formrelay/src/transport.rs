//! Outbound HTTP for relayed submissions.
//!
//! Not a browser — one multipart POST per submission, no retries. Only the
//! status of the answer is kept; the body is never read.

use std::time::Duration;

use async_trait::async_trait;

use crate::config::{RelayConfig, ACCEPT_JSON};
use crate::types::{FormPayload, RelayError, RelayResult, ServerResponse};

/// Sends a submission payload to its endpoint.
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST `payload` to `url` and report the response status.
    ///
    /// Any failure to obtain a response is an error.
    async fn post(&self, url: &str, payload: FormPayload) -> RelayResult<ServerResponse>;
}

/// reqwest-backed [`Transport`].
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(timeout_ms: u64) -> Self {
        let timeout = Duration::from_millis(timeout_ms);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(concat!("formrelay/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();

        Self { client, timeout }
    }

    pub fn from_config(config: &RelayConfig) -> Self {
        Self::new(config.timeout_ms)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post(&self, url: &str, payload: FormPayload) -> RelayResult<ServerResponse> {
        let target =
            url::Url::parse(url).map_err(|e| RelayError::InvalidUrl(format!("{url}: {e}")))?;
        if !matches!(target.scheme(), "http" | "https") {
            return Err(RelayError::InvalidUrl(format!(
                "{url}: unsupported scheme {}",
                target.scheme()
            )));
        }

        let field_count = payload.len();
        let response = self
            .client
            .post(target)
            .timeout(self.timeout)
            .header(reqwest::header::ACCEPT, ACCEPT_JSON)
            .multipart(payload.into_multipart())
            .send()
            .await?;

        let status = response.status().as_u16();
        tracing::debug!("POST {url} ({field_count} fields) -> {status}");

        Ok(ServerResponse::new(status))
    }
}
