//! HTTP client for the platform REST API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Response;
use serde::de::DeserializeOwned;
use tracing::debug;

use futurehouse_core::{TaskAnswer, TaskId, TaskRequest, TaskStatus};

use crate::client::JobClient;
use crate::error::ClientError;
use crate::wire::{SubmitBody, SubmitResponse, TrajectoryResponse};

/// Production platform endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.platform.futurehouse.org";

/// Upper bound on a single HTTP request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// [`JobClient`] backed by the platform REST API.
#[derive(Clone)]
pub struct HttpJobClient {
    inner: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpJobClient {
    /// Create a new HTTP client.
    ///
    /// Fails with [`ClientError::MissingCredential`] if the key is blank.
    pub fn new(base_url: &str, api_key: impl Into<String>) -> Result<Self, ClientError> {
        Self::with_request_timeout(base_url, api_key, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Create a client whose individual requests give up after `timeout`.
    pub fn with_request_timeout(
        base_url: &str,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ClientError::MissingCredential);
        }

        let inner = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            inner,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// Base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn trajectory(&self, task_id: &TaskId) -> Result<TrajectoryResponse, ClientError> {
        let url = format!("{}/v0.1/trajectories/{}", self.base_url, task_id);
        debug!(url = %url, "GET request");

        let response = self
            .inner
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        decode(response).await
    }
}

/// Turn a non-2xx response into [`ClientError::Api`], otherwise decode JSON.
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    if !status.is_success() {
        let reason = status.canonical_reason().unwrap_or("unknown error");
        let message = match response.text().await {
            Ok(body) if !body.trim().is_empty() => body,
            Ok(_) => reason.to_string(),
            Err(e) => format!("{} (response body unreadable: {})", reason, e),
        };
        return Err(ClientError::Api {
            status: status.as_u16(),
            message,
        });
    }

    response
        .json()
        .await
        .map_err(|e| ClientError::Serialization(e.to_string()))
}

#[async_trait]
impl JobClient for HttpJobClient {
    async fn submit(&self, request: &TaskRequest) -> Result<TaskId, ClientError> {
        let url = format!("{}/v0.1/crows", self.base_url);
        debug!(url = %url, job = %request.job, "POST request");

        let response = self
            .inner
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&SubmitBody::from_request(request))
            .send()
            .await?;

        let submitted: SubmitResponse = decode(response).await?;
        Ok(TaskId::new(submitted.into_id()))
    }

    async fn get_status(&self, task_id: &TaskId) -> Result<TaskStatus, ClientError> {
        self.trajectory(task_id).await?.task_status()
    }

    async fn get_result(&self, task_id: &TaskId) -> Result<TaskAnswer, ClientError> {
        Ok(self.trajectory(task_id).await?.answer())
    }
}
