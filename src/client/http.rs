//! reqwest implementation of [`ChatBackend`]

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use url::Url;

use super::{ChatBackend, ChatRequest, ChatResponse, ClientError, Feedback};
use crate::agents::Agent;

const AGENTS_PATH: &str = "available_agents";
const CHAT_PATH: &str = "chat/run";
const FEEDBACK_PATH: &str = "feedback";

/// HTTP client for the agent backend
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpBackend {
    /// Create a backend rooted at `base_url`
    ///
    /// A base with a path prefix (`https://host/api`) keeps that prefix for
    /// every endpoint.
    pub fn new(base_url: Url) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, mut base_url: Url) -> Self {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self { client, base_url }
    }

    /// Resolve an endpoint path against the base URL
    pub fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|e| ClientError::InvalidUrl(format!("{}{}: {}", self.base_url, path, e)))
    }

    /// Check the status and decode the JSON body
    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(ClientError::from_network_error)?;

        if !status.is_success() {
            return Err(ClientError::from_http_status(status, body));
        }

        serde_json::from_str(&body).map_err(|e| ClientError::Decode(e.to_string()))
    }
}

#[async_trait]
impl ChatBackend for HttpBackend {
    async fn available_agents(&self) -> Result<Vec<Agent>, ClientError> {
        let url = self.endpoint(AGENTS_PATH)?;
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(ClientError::from_network_error)?;

        Self::decode(response).await
    }

    async fn run_chat(&self, request: &ChatRequest) -> Result<ChatResponse, ClientError> {
        let url = self.endpoint(CHAT_PATH)?;
        tracing::debug!(session_id = %request.session_id, "POST {}", url);

        let response = self
            .client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(ClientError::from_network_error)?;

        let body: serde_json::Value = Self::decode(response).await?;
        Ok(ChatResponse::from_body(body))
    }

    async fn send_feedback(&self, feedback: &Feedback) -> Result<(), ClientError> {
        let url = self.endpoint(FEEDBACK_PATH)?;
        tracing::debug!("POST {}", url);

        let response = self
            .client
            .post(url)
            .json(feedback)
            .send()
            .await
            .map_err(ClientError::from_network_error)?;

        let _: serde_json::Value = Self::decode(response).await?;
        Ok(())
    }
}
