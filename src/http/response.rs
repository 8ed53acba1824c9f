//! Response envelopes
//!
//! JSON bodies returned by the HTTP facade.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::LsmError;

/// `meta` block of a successful response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyMeta {
    pub key: String,
}

/// Body of a successful `POST /command/{key}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandResponse {
    pub meta: KeyMeta,
    /// The value that was stored
    #[serde(rename = "command")]
    pub data: String,
}

/// Body of a successful `GET /query/{key}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub meta: KeyMeta,
    /// The value that was found
    #[serde(rename = "query")]
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorMeta {
    /// HTTP status code as a string, e.g. "404"
    pub code: String,
    pub error: String,
}

/// Body of every failed request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub meta: ErrorMeta,
}

impl CommandResponse {
    pub fn new(key: &str, value: &[u8]) -> Self {
        Self {
            meta: KeyMeta { key: key.to_string() },
            data: String::from_utf8_lossy(value).into_owned(),
        }
    }
}

impl QueryResponse {
    pub fn new(key: &str, value: &[u8]) -> Self {
        Self {
            meta: KeyMeta { key: key.to_string() },
            data: String::from_utf8_lossy(value).into_owned(),
        }
    }
}

/// Failures a handler can answer with
#[derive(Debug)]
pub enum ApiError {
    /// Key absent from every level
    NotFound,
    /// Path is missing the key segment
    MissingParam,
    /// Route exists but not for this method
    MethodNotAllowed,
    /// No route matches the path (e.g. a key containing `/`)
    UnknownRoute,
    /// Tree already closed (server shutting down)
    Closed,
    /// Storage or runtime failure
    Internal(String),
}

impl ApiError {
    /// Map a failed put
    pub fn from_write(err: LsmError) -> Self {
        ApiError::Internal(format!("Error while inserting payload in the log: {}", err))
    }

    /// Map a failed get
    pub fn from_read(err: LsmError) -> Self {
        match err {
            LsmError::KeyNotFound => ApiError::NotFound,
            other => ApiError::Internal(format!("Error while reading from the log: {}", other)),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::MissingParam => StatusCode::BAD_REQUEST,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::UnknownRoute => StatusCode::NOT_FOUND,
            ApiError::Closed => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::NotFound => "Key not found".to_string(),
            ApiError::MissingParam => "Missing URL param".to_string(),
            ApiError::MethodNotAllowed => "Method not allowed".to_string(),
            ApiError::UnknownRoute => "Route not found".to_string(),
            ApiError::Closed => "Store is closed".to_string(),
            ApiError::Internal(msg) => msg.clone(),
        }
    }

    pub fn body(&self) -> ErrorResponse {
        ErrorResponse {
            meta: ErrorMeta {
                code: self.status().as_u16().to_string(),
                error: self.message(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}
