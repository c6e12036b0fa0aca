// Application error taxonomy and result alias, built on thiserror.
use thiserror::Error;

use crate::auth::CredentialError;
use crate::services::StoreError;

pub mod response;

pub const JSON_DECODE_MESSAGE: &str = "it's not possible to convert the JSON into an object";
pub const NO_RECORD_MESSAGE: &str = "no record matching given the identification";
pub const BODY_TOO_LARGE_MESSAGE: &str = "the request body is too large";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("invalid request: {0}")]
    UnprocessableEntity(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("server error: {0}")]
    Server(String),
}

impl AppError {
    /// Client-facing message carried in the response envelope.
    pub fn message(&self) -> &str {
        match self {
            AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::BadRequest(msg)
            | AppError::UnprocessableEntity(msg)
            | AppError::NotFound(msg)
            | AppError::PayloadTooLarge(msg)
            | AppError::Server(msg) => msg,
        }
    }
}

// Storage failures are classified here, at the boundary between the
// storage collaborator and the core.
impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => AppError::NotFound(NO_RECORD_MESSAGE.to_string()),
            StoreError::Conflict(msg) => {
                AppError::Server(format!("error when trying to save: {}", msg))
            }
            other => AppError::Server(format!("error when processing request {}", other)),
        }
    }
}

impl From<CredentialError> for AppError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::Signing(e) => AppError::Server(e.to_string()),
            other => AppError::Unauthorized(other.to_string()),
        }
    }
}

// Custom result type
pub type AppResult<T> = Result<T, AppError>;
