//! Typed errors for backend operations
//!
//! Lets callers tell transport failures, rejected requests and undecodable
//! bodies apart without string matching.

use thiserror::Error;

/// Errors from talking to the chat backend
#[derive(Debug, Error)]
pub enum ClientError {
    /// Connection refused, DNS failure, timeout, reset
    #[error("Network error: {0}")]
    Network(String),

    /// Backend answered with a non-success status
    #[error("HTTP {status}: {body}")]
    Http {
        status: reqwest::StatusCode,
        body: String,
    },

    /// Body was not the JSON shape we expected
    #[error("Invalid response: {0}")]
    Decode(String),

    /// Endpoint URL could not be built from the configured base
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl ClientError {
    /// Convert HTTP status code and error text into a typed error
    pub fn from_http_status(status: reqwest::StatusCode, body: String) -> Self {
        let body = if body.trim().is_empty() {
            status
                .canonical_reason()
                .unwrap_or("no response body")
                .to_string()
        } else {
            body
        };
        ClientError::Http { status, body }
    }

    /// Convert network/connection errors into a typed error
    pub fn from_network_error(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ClientError::Network(format!("Request timeout: {}", e))
        } else if e.is_connect() {
            ClientError::Network(format!("Connection failed: {}", e))
        } else if let Some(status) = e.status() {
            Self::from_http_status(status, e.to_string())
        } else if e.is_decode() {
            ClientError::Decode(e.to_string())
        } else {
            ClientError::Network(e.to_string())
        }
    }
}
