use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Config;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct QueryRequest {
    pub query: String,
    pub variables: serde_json::Map<String, serde_json::Value>,
}

impl QueryRequest {
    /// The shared free-text term, read from the tag filter.
    pub fn term(&self) -> Option<&str> {
        self.variables
            .get("tag_filter")
            .and_then(|filter| filter.get("q"))
            .and_then(serde_json::Value::as_str)
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct GraphqlError {
    pub message: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
struct GraphqlEnvelope {
    #[serde(default)]
    data: Option<serde_json::Value>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("endpoint returned status {status}")]
    Status { status: u16 },
    #[error("response is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("query rejected: {}", join_messages(.0))]
    Graphql(Vec<GraphqlError>),
    #[error("response carries no data")]
    MissingData,
}

fn join_messages(errors: &[GraphqlError]) -> String {
    errors
        .iter()
        .map(|error| error.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// The remote query endpoint. One call is one network round trip; the
/// returned value is the envelope's `data` object.
#[async_trait]
pub trait QueryTransport: Send + Sync {
    fn endpoint_name(&self) -> &str;
    async fn execute(&self, request: QueryRequest) -> Result<serde_json::Value, TransportError>;
}

/// Unwraps a GraphQL response body into its `data` object.
pub fn decode_envelope(body: &str) -> Result<serde_json::Value, TransportError> {
    let envelope: GraphqlEnvelope = serde_json::from_str(body)?;
    if !envelope.errors.is_empty() {
        return Err(TransportError::Graphql(envelope.errors));
    }
    match envelope.data {
        Some(data) if !data.is_null() => Ok(data),
        _ => Err(TransportError::MissingData),
    }
}

pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpTransport {
    pub fn from_config(cfg: &Config) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(cfg.request_timeout_ms))
            .build()?;
        Ok(Self {
            client,
            endpoint: cfg.endpoint.clone(),
            api_key: cfg.api_key.clone().filter(|key| !key.trim().is_empty()),
        })
    }
}

#[async_trait]
impl QueryTransport for HttpTransport {
    fn endpoint_name(&self) -> &str {
        &self.endpoint
    }

    async fn execute(&self, request: QueryRequest) -> Result<serde_json::Value, TransportError> {
        let mut builder = self.client.post(&self.endpoint).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.header("ApiKey", key);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        decode_envelope(&body)
    }
}
