//! Error types for the stretchsheet server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use stretchsheet_core::SheetError;

/// Server error types
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Upload failed: {0}")]
    Upload(String),

    #[error(transparent)]
    Sheet(#[from] SheetError),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
    code: String,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ServerError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "INVALID_REQUEST", msg.clone())
            }
            ServerError::Upload(msg) => (StatusCode::BAD_REQUEST, "UPLOAD_ERROR", msg.clone()),
            ServerError::Sheet(err) => {
                let (status, code) = sheet_status(err);
                (status, code, err.to_string())
            }
        };

        let body = ErrorResponse {
            success: false,
            error: message,
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

/// Input-shaped failures are the caller's to fix; everything else is ours.
fn sheet_status(err: &SheetError) -> (StatusCode, &'static str) {
    match err {
        SheetError::MissingColumn(_) | SheetError::InvalidNumber { .. } | SheetError::Csv(_) => {
            (StatusCode::UNPROCESSABLE_ENTITY, "INVALID_INPUT")
        }
        SheetError::Pdf(_) | SheetError::Io(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "RENDER_ERROR")
        }
    }
}
