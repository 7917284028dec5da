use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MixError {
    #[error("Audio file not found: {0}")]
    FileNotFound(String),

    #[error("Unsupported audio format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to decode audio: {0}")]
    DecodingError(String),

    #[error("Invalid audio: {0}")]
    InvalidAudio(String),

    #[error("Analysis produced unusable values: {0}")]
    InvalidAnalysis(String),

    #[error("Failed to encode output: {0}")]
    EncodingError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl IntoResponse for MixError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            MixError::FileNotFound(msg) => (StatusCode::NOT_FOUND, msg),
            MixError::UnsupportedFormat(msg) => (StatusCode::UNSUPPORTED_MEDIA_TYPE, msg),
            MixError::DecodingError(msg) => (StatusCode::BAD_REQUEST, msg),
            MixError::InvalidAudio(msg) => (StatusCode::BAD_REQUEST, msg),
            MixError::InvalidAnalysis(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            MixError::EncodingError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            MixError::IoError(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
            MixError::InternalError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, MixError>;
