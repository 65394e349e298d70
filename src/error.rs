use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::api::response;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Failed to fetch page: {0}")]
    FetchError(String),

    #[error("Unexpected status code: {status} {reason}")]
    StatusError { status: u16, reason: String },

    #[error("Error parsing content: {0}")]
    ParseError(String),

    #[error("Failed to send reply: {0}")]
    ReplyError(String),

    #[error("Invalid webhook signature")]
    SignatureError,

    #[error("Invalid webhook payload: {0}")]
    PayloadError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::SignatureError => StatusCode::UNAUTHORIZED,
            AppError::PayloadError(_) => StatusCode::BAD_REQUEST,
            AppError::FetchError(_) | AppError::StatusError { .. } => StatusCode::BAD_GATEWAY,
            AppError::ParseError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::ReplyError(_) | AppError::ConfigError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        response::error::<()>(status, self.to_string()).into_response()
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::FetchError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
