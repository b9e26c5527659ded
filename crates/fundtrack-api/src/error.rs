//! Error types for fundtrack-api
//!
//! Failed requests answer with `{"success": false, "message", "error"}`,
//! where `error` is the underlying [`ErrorDetails`].

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use fundtrack_core::{CoreError, ErrorDetails};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// Body was not JSON, or a field could not be read as its type
    #[error("Invalid request body: {message}")]
    InvalidBody { message: String },

    /// Store write or read failed; `context` is the client-facing message
    #[error("{context}: {source}")]
    Store {
        context: &'static str,
        #[source]
        source: CoreError,
    },

    #[error("Invalid CORS origin: {origin}")]
    InvalidOrigin { origin: String },

    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),
}

impl ApiError {
    pub fn store(context: &'static str, source: CoreError) -> Self {
        ApiError::Store { context, source }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidBody { .. } => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> Failure {
        match self {
            ApiError::InvalidBody { message } => Failure {
                success: false,
                message: "Invalid request body".to_string(),
                error: CoreError::ValidationError {
                    message: message.clone(),
                }
                .to_details(),
            },
            ApiError::Store { context, source } => Failure {
                success: false,
                message: context.to_string(),
                error: source.to_details(),
            },
            other => Failure {
                success: false,
                message: "Internal server error".to_string(),
                error: CoreError::InternalError {
                    message: other.to_string(),
                }
                .to_details(),
            },
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidBody {
            message: rejection.body_text(),
        }
    }
}

/// Body of every failed response
#[derive(Debug, Serialize)]
pub struct Failure {
    pub success: bool,
    pub message: String,
    pub error: ErrorDetails,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}
