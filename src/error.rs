//! API error type
//!
//! A small closed set of failures, each with its own status code and a
//! client-safe message. Full details only go to the log.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::gemini::GeminiError;

#[derive(Debug, Error)]
pub enum Error {
    /// Client sent an unusable request
    #[error("{0}")]
    Validation(String),

    /// Requested file does not exist
    #[error("file not found")]
    NotFound,

    /// Request body exceeded the configured upload limit
    #[error("payload too large")]
    PayloadTooLarge,

    /// Generative model could not be reached or refused the request
    #[error("upstream error: {0}")]
    Upstream(#[source] GeminiError),

    /// Model answered but the answer held no usable image
    #[error("decode error: {0}")]
    Decode(#[source] GeminiError),

    /// Filesystem failure
    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),
}

impl From<GeminiError> for Error {
    fn from(err: GeminiError) -> Self {
        if err.is_empty_result() {
            Error::Decode(err)
        } else {
            Error::Upstream(err)
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Error::Upstream(_) => StatusCode::BAD_GATEWAY,
            Error::Decode(_) | Error::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to hand back to clients
    pub fn user_message(&self) -> String {
        match self {
            Error::Validation(message) => message.clone(),
            Error::NotFound => "File not found".to_string(),
            Error::PayloadTooLarge => "Uploaded image is too large".to_string(),
            Error::Upstream(GeminiError::NotConfigured) => {
                "Image generation service is not configured".to_string()
            }
            Error::Upstream(GeminiError::Timeout) => {
                "Image generation service timed out".to_string()
            }
            Error::Upstream(GeminiError::Blocked(_)) => {
                "Image generation request was blocked".to_string()
            }
            Error::Upstream(_) => "Image generation service failed".to_string(),
            Error::Decode(_) => "Generation returned no usable image".to_string(),
            Error::Storage(_) => "Failed to store image".to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match &self {
            Error::Upstream(_) | Error::Decode(_) | Error::Storage(_) => {
                tracing::error!("Request failed: {}", self);
            }
            Error::Validation(_) | Error::NotFound | Error::PayloadTooLarge => {
                tracing::debug!("Client error: {}", self);
            }
        }

        let body = ErrorResponse {
            error: self.user_message(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}
