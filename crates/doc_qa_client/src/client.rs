//! HTTP client: POST the question, receive `{answer, sources}`.

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::Url;

use crate::config::Config;
use crate::messages::{QueryRequest, QueryResponse};

/// Why a submission did not produce a response body.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Server answered with a status outside 2xx.
    #[error("HTTP error! status: {status}")]
    RequestFailed { status: u16 },
    /// Request never completed: connect, timeout, or an unreadable body.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

/// Connection-less client bound to one query endpoint.
#[derive(Debug, Clone)]
pub struct QueryClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl QueryClient {
    /// Client for `endpoint` with the transport's default timeouts.
    pub fn new(endpoint: Url) -> Result<Self, ClientError> {
        Self::with_timeout(endpoint, None)
    }

    pub fn with_timeout(endpoint: Url, timeout: Option<Duration>) -> Result<Self, ClientError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            endpoint,
        })
    }

    /// Build the endpoint from `server.base_url` + `server.path`.
    pub fn from_config(config: &Config) -> Result<Self, ClientError> {
        let endpoint = endpoint_url(config.server.base_url(), config.server.path())?;
        let timeout = config.server.timeout_secs.map(Duration::from_secs);
        Self::with_timeout(endpoint, timeout)
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Send `question` and parse the reply. No retry on any failure.
    pub async fn submit(&self, question: &str) -> Result<QueryResponse, ClientError> {
        tracing::debug!(endpoint = %self.endpoint, len = question.len(), "submitting question");
        let response = self
            .http
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .json(&QueryRequest::new(question))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::RequestFailed {
                status: status.as_u16(),
            });
        }

        let body: QueryResponse = response.json().await?;
        tracing::debug!(sources = body.sources.len(), "received answer");
        Ok(body)
    }
}

/// Join a base URL and a path, e.g. `http://localhost:8000` + `/query`.
pub fn endpoint_url(base_url: &str, path: &str) -> Result<Url, ClientError> {
    Url::parse(base_url)
        .and_then(|base| base.join(path))
        .map_err(|e| ClientError::InvalidEndpoint(format!("{base_url}{path}: {e}")))
}
