//! Chat backend client
//!
//! The [`ChatBackend`] trait is the seam between the UI and the network.
//! [`HttpBackend`] talks to the real service; tests substitute stubs.

mod error;
mod http;

pub use error::ClientError;
pub use http::HttpBackend;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::agents::Agent;

/// Body of `POST /chat/run`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    pub user_id: String,
    pub session_id: String,
    pub input: String,
}

/// Reply of `POST /chat/run`
///
/// `output` is kept as raw JSON so a field of the wrong type reads as "no
/// reply" rather than failing the whole body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub output: Option<serde_json::Value>,
}

impl ChatResponse {
    /// Interpret any JSON body; a non-object body carries no output
    pub fn from_body(body: serde_json::Value) -> Self {
        serde_json::from_value(body).unwrap_or_default()
    }

    /// The reply text, or `None` when absent, empty or not a string
    pub fn output_text(&self) -> Option<&str> {
        self.output
            .as_ref()
            .and_then(serde_json::Value::as_str)
            .filter(|s| !s.is_empty())
    }
}

/// Body of `POST /feedback`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Feedback {
    pub score: f64,
    pub text: String,
    pub invocation_id: String,
    pub log_type: String,
    pub service_name: String,
    pub user_id: String,
}

impl Feedback {
    pub fn new(
        score: f64,
        text: impl Into<String>,
        invocation_id: impl Into<String>,
        service_name: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            score,
            text: text.into(),
            invocation_id: invocation_id.into(),
            log_type: "feedback".to_string(),
            service_name: service_name.into(),
            user_id: user_id.into(),
        }
    }
}

/// Remote operations the client depends on
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// `GET /available_agents`
    async fn available_agents(&self) -> Result<Vec<Agent>, ClientError>;

    /// `POST /chat/run`
    async fn run_chat(&self, request: &ChatRequest) -> Result<ChatResponse, ClientError>;

    /// `POST /feedback`
    async fn send_feedback(&self, feedback: &Feedback) -> Result<(), ClientError>;
}
