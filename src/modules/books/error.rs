use bookshelf_http::{AppError, FieldErrors};
use thiserror::Error;

/// Failures produced by the books repository and service.
#[derive(Debug, Error)]
pub enum BookError {
    #[error("validation failed on {} field(s)", .0.len())]
    Validation(FieldErrors),

    #[error("book not found")]
    NotFound,

    /// The listing query succeeded but returned no rows.
    #[error("no books stored")]
    EmptyResult,

    #[error("a book with this title already exists")]
    Conflict,

    #[error("invalid parameter: {0}")]
    InvalidParam(&'static str),

    #[error("persistence failure: {0}")]
    Persistence(#[from] sqlx::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<BookError> for AppError {
    fn from(err: BookError) -> Self {
        match err {
            BookError::Validation(fields) => AppError::Validation(fields),
            BookError::NotFound => AppError::NotFound,
            BookError::EmptyResult => AppError::EmptyResult,
            BookError::Conflict => AppError::Conflict,
            BookError::InvalidParam(detail) => AppError::invalid_param(detail),
            BookError::Persistence(source) => {
                AppError::Internal(anyhow::Error::new(source).context("book persistence failure"))
            }
            BookError::Internal(detail) => AppError::Internal(anyhow::anyhow!(detail)),
        }
    }
}
