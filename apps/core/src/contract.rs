use serde::{Deserialize, Serialize};

use crate::core_service::{OmnisearchService, ServiceError};
use crate::model::{ResultKind, SearchResult};
use crate::navigation;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResultDto {
    pub id: String,
    pub kind: ResultKind,
    pub label: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub details: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alias_terms: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
}

impl From<&SearchResult> for ResultDto {
    fn from(value: &SearchResult) -> Self {
        Self {
            id: value.id().to_string(),
            kind: value.kind(),
            label: value.label().to_string(),
            details: value.details().to_string(),
            alias_terms: value.alias_terms().to_vec(),
            image: value.image_ref().map(str::to_string),
            destination: navigation::resolve(value),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchResponse {
    pub results: Vec<ResultDto>,
}

impl SearchResponse {
    pub fn from_results(results: &[SearchResult]) -> Self {
        Self {
            results: results.iter().map(ResultDto::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidJson,
    FetchFailed,
    Config,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TransportResponse {
    Ok { response: SearchResponse },
    Err { error: ErrorResponse },
}

pub async fn handle_request(service: &OmnisearchService, request: SearchRequest) -> TransportResponse {
    match service.search(&request.query).await {
        Ok(results) => TransportResponse::Ok {
            response: SearchResponse::from_results(&results),
        },
        Err(error) => TransportResponse::Err {
            error: map_service_error(error),
        },
    }
}

pub async fn handle_json(service: &OmnisearchService, payload: &str) -> String {
    let response = match serde_json::from_str::<SearchRequest>(payload) {
        Ok(request) => handle_request(service, request).await,
        Err(error) => TransportResponse::Err {
            error: ErrorResponse {
                code: ErrorCode::InvalidJson,
                message: error.to_string(),
            },
        },
    };
    encode(&response)
}

pub fn encode(response: &TransportResponse) -> String {
    serde_json::to_string(response).unwrap_or_else(|error| {
        let message = serde_json::Value::from(error.to_string());
        format!(r#"{{"status":"err","error":{{"code":"invalid_json","message":{message}}}}}"#)
    })
}

fn map_service_error(error: ServiceError) -> ErrorResponse {
    let code = match &error {
        ServiceError::Config(_) => ErrorCode::Config,
        ServiceError::Transport(_) | ServiceError::Fetch(_) => ErrorCode::FetchFailed,
    };
    ErrorResponse {
        code,
        message: error.to_string(),
    }
}
