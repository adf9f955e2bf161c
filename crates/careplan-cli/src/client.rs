//! HTTP client for a running `careplan serve` instance.

use std::time::Duration;

use thiserror::Error;

use careplan_core::{PlanRequest, PlanResult};

/// Backend used when `--server` is not given.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8000";

/// How long to wait for a plan before giving up. Model calls are slow.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

const PING_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum ClientError {
    /// The server could not be reached, or the request timed out.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The server answered with an error status; `body` is its response text.
    #[error("API error (HTTP {status}): {body}")]
    Api { status: u16, body: String },

    /// The server answered 200 with something that is not a plan result.
    #[error("invalid response from server: {0}")]
    Decode(String),
}

#[derive(Debug, Clone)]
pub struct PlannerClient {
    base_url: String,
    http: reqwest::Client,
}

impl PlannerClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ClientError::Connection(e.to_string()))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST the request to `/plan` and decode the result.
    pub async fn submit(&self, request: &PlanRequest) -> Result<PlanResult, ClientError> {
        let url = format!("{}/plan", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| ClientError::Connection(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ClientError::Connection(e.to_string()))?;

        if !status.is_success() {
            return Err(ClientError::Api {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| ClientError::Decode(e.to_string()))
    }

    /// `true` if the server answers `GET /` with a success status.
    pub async fn ping(&self) -> bool {
        let url = format!("{}/", self.base_url);
        match self.http.get(&url).timeout(PING_TIMEOUT).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!(error = %e, url = %url, "ping failed");
                false
            }
        }
    }
}
