use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::irristrat::client::UpstreamError;
use crate::validation::ValidationError;

/// Body of every error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{source}")]
    Upstream {
        source: UpstreamError,
        fallback: String,
    },
}

impl ApiError {
    pub fn upstream(source: UpstreamError, fallback: &str) -> Self {
        ApiError::Upstream {
            source,
            fallback: fallback.to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Upstream { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Text shown to the end user, falling back to the localized message
    /// when the failure has none.
    pub fn message(&self) -> String {
        match self {
            ApiError::Validation(e) => e.to_string(),
            ApiError::Upstream { source, fallback } => {
                let message = source.to_string();
                if message.trim().is_empty() {
                    fallback.clone()
                } else {
                    message
                }
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status(),
            Json(ErrorResponse {
                error: self.message(),
            }),
        )
            .into_response()
    }
}
