//! Error handling for the bookshelf HTTP layer

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use uuid::Uuid;

use crate::response::{Envelope, FieldErrors};

/// Application error types that map to HTTP responses
#[derive(Error, Debug)]
pub enum AppError {
    /// Payload or path could not be decoded.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// One or more fields broke their declared rules.
    #[error("validation error on {} field(s)", .0.len())]
    Validation(FieldErrors),

    /// A query flag carried a disallowed value.
    #[error("invalid parameter: {0}")]
    InvalidParam(String),

    #[error("record not found")]
    NotFound,

    /// A listing returned zero rows.
    #[error("table is empty")]
    EmptyResult,

    #[error("resource already exists")]
    Conflict,

    /// The request outlived the server's timeout.
    #[error("request timeout")]
    Timeout,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Create a bad request error
    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::BadRequest(detail.into())
    }

    /// Create an invalid parameter error
    pub fn invalid_param(detail: impl Into<String>) -> Self {
        Self::InvalidParam(detail.into())
    }

    /// Status code and public message for this error kind.
    pub fn status_and_message(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad request"),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "validation error"),
            AppError::InvalidParam(_) => (StatusCode::BAD_REQUEST, "invalid parameter"),
            AppError::NotFound => (StatusCode::NOT_FOUND, "record not found"),
            AppError::EmptyResult => (StatusCode::NOT_FOUND, "table is empty"),
            AppError::Conflict => (StatusCode::CONFLICT, "resource already exists"),
            AppError::Timeout => (StatusCode::REQUEST_TIMEOUT, "request timeout"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal server error"),
        }
    }

    /// Stable machine-readable kind, used in logs.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::BadRequest(_) => "bad_request",
            AppError::Validation(_) => "validation_error",
            AppError::InvalidParam(_) => "invalid_param",
            AppError::NotFound => "not_found",
            AppError::EmptyResult => "empty_result",
            AppError::Conflict => "conflict",
            AppError::Timeout => "timeout",
            AppError::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        if status.is_server_error() {
            let error_id = Uuid::now_v7();
            tracing::error!(
                error_id = %error_id,
                error_code = self.code(),
                status_code = status.as_u16(),
                error = ?self,
                "request failed"
            );
        } else {
            tracing::debug!(
                error_code = self.code(),
                status_code = status.as_u16(),
                detail = %self,
                "request rejected"
            );
        }

        let errors = match self {
            AppError::Validation(fields) => Some(fields),
            _ => None,
        };

        (status, Envelope::failure(message, errors)).into_response()
    }
}
