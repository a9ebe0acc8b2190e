//! API Error Responses

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use data_validator::ValidationErrors;
use inference_engine::InferenceError;
use metrics::counter;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Errors returned by request handlers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid applicant input: {0}")]
    Validation(#[from] ValidationErrors),
    #[error(transparent)]
    Inference(#[from] InferenceError),
    #[error("Malformed request body: {0}")]
    MalformedBody(#[from] JsonRejection),
}

/// Error body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub details: Vec<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::Validation(errors) => {
                counter!("emi_validation_failures_total").increment(1);
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    ErrorResponse {
                        error: "invalid_input".to_string(),
                        details: errors.iter().map(ToString::to_string).collect(),
                    },
                )
            }
            ApiError::MalformedBody(rejection) => (
                rejection.status(),
                ErrorResponse {
                    error: "malformed_body".to_string(),
                    details: vec![rejection.body_text()],
                },
            ),
            ApiError::Inference(e) => {
                error!("Prediction request failed: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        error: "prediction_failed".to_string(),
                        details: vec![e.to_string()],
                    },
                )
            }
        };
        (status, Json(body)).into_response()
    }
}
