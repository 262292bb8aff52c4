use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("{provider} unreachable: {source}")]
    Transport {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{provider} responded with HTTP {status}: {body}")]
    Status {
        provider: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("{provider} returned malformed JSON: {source}")]
    Malformed {
        provider: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("{provider} reported an error: {message}")]
    Provider {
        provider: &'static str,
        message: String,
    },
    #[error("{provider} response is missing {field}")]
    UnexpectedShape {
        provider: &'static str,
        field: &'static str,
    },
}

impl UpstreamError {
    /// Connection-level failures (refused, reset, timed out) as opposed to a
    /// provider that answered with something unusable.
    pub fn is_transport(&self) -> bool {
        matches!(self, UpstreamError::Transport { .. })
    }

    pub fn provider(&self) -> &'static str {
        match self {
            UpstreamError::Transport { provider, .. }
            | UpstreamError::Status { provider, .. }
            | UpstreamError::Malformed { provider, .. }
            | UpstreamError::Provider { provider, .. }
            | UpstreamError::UnexpectedShape { provider, .. } => provider,
        }
    }
}

/// One named upstream provider. Every call opens a single request, buffers the
/// whole body and only then hands it back; there are no retries.
pub struct UpstreamClient {
    client: Client,
    provider: &'static str,
}

impl UpstreamClient {
    pub fn new(provider: &'static str, timeout: Duration) -> Self {
        let client = Client::builder()
            .user_agent("HolidayGifServer/1.0")
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { client, provider }
    }

    pub fn provider(&self) -> &'static str {
        self.provider
    }

    pub async fn fetch(&self, url: &str, params: &[(&str, &str)]) -> Result<Vec<u8>, UpstreamError> {
        // Query parameters carry API keys, so only the bare endpoint is logged.
        tracing::debug!(provider = self.provider, url, "calling upstream");

        let mut response = self
            .client
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(|source| self.transport(source))?;

        let status = response.status();
        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(|source| self.transport(source))? {
            body.extend_from_slice(&chunk);
        }

        if !status.is_success() {
            tracing::warn!(provider = self.provider, %status, "upstream returned an error status");
            return Err(UpstreamError::Status {
                provider: self.provider,
                status,
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        tracing::debug!(provider = self.provider, bytes = body.len(), "upstream body received");
        Ok(body)
    }

    pub async fn fetch_json<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, &str)],
    ) -> Result<T, UpstreamError> {
        let body = self.fetch(url, params).await?;
        serde_json::from_slice(&body).map_err(|source| UpstreamError::Malformed {
            provider: self.provider,
            source,
        })
    }

    fn transport(&self, source: reqwest::Error) -> UpstreamError {
        tracing::error!(provider = self.provider, "upstream transport failure: {}", source);
        UpstreamError::Transport {
            provider: self.provider,
            source,
        }
    }
}
