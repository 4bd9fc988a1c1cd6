//! Error types for Shelf server

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Machine-readable error kinds exposed in every error body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Unauthenticated,
    Forbidden,
    InvalidRequest,
    NotFound,
    AlreadyBorrowed,
    OutOfStock,
    ConflictOnUpdate,
    StoreFailure,
    InternalFailure,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("You have already borrowed this book")]
    AlreadyBorrowed,

    #[error("No available copies to borrow")]
    OutOfStock,

    #[error("Conflict on update: {0}")]
    ConflictOnUpdate(String),

    #[error("Store error: {0}")]
    Store(#[from] mongodb::error::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Unauthenticated(_) => ErrorCode::Unauthenticated,
            AppError::Forbidden(_) => ErrorCode::Forbidden,
            AppError::InvalidRequest(_) => ErrorCode::InvalidRequest,
            AppError::NotFound(_) => ErrorCode::NotFound,
            AppError::AlreadyBorrowed => ErrorCode::AlreadyBorrowed,
            AppError::OutOfStock => ErrorCode::OutOfStock,
            AppError::ConflictOnUpdate(_) => ErrorCode::ConflictOnUpdate,
            AppError::Store(_) => ErrorCode::StoreFailure,
            AppError::Internal(_) => ErrorCode::InternalFailure,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::InvalidRequest(_)
            | AppError::AlreadyBorrowed
            | AppError::OutOfStock => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ConflictOnUpdate(_) | AppError::Store(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    /// Always false
    pub success: bool,
    /// Error kind, e.g. `OutOfStock`
    pub code: String,
    /// Human-readable message
    pub error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let message = match &self {
            AppError::Unauthenticated(msg) => {
                tracing::debug!("Rejected unauthenticated request: {}", msg);
                "unauthorized access".to_string()
            }
            AppError::Forbidden(msg)
            | AppError::InvalidRequest(msg)
            | AppError::NotFound(msg)
            | AppError::ConflictOnUpdate(msg) => msg.clone(),
            AppError::AlreadyBorrowed | AppError::OutOfStock => self.to_string(),
            AppError::Store(e) => {
                tracing::error!("Store error: {:?}", e);
                "Database error".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal server error".to_string()
            }
        };

        if code == ErrorCode::ConflictOnUpdate {
            tracing::error!("Write affected no records: {}", message);
        }

        let body = Json(ErrorResponse {
            success: false,
            code: format!("{:?}", code),
            error: message,
        });

        (status, body).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(msg) => msg.to_string(),
                    None => format!("Invalid field: {}", field),
                })
            })
            .collect();
        messages.sort();
        AppError::InvalidRequest(messages.join(", "))
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
