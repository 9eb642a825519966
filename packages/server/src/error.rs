use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::storage::StorageError;
use sea_orm::{DbErr, SqlErr};
use serde::Serialize;

/// Error details carried inside [`ErrorResponse`].
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Error kind. One of: `ValidationError`, `AuthenticationError`,
    /// `AuthorizationError`, `NotFoundError`, `ConflictError`, `DatabaseError`,
    /// `ExternalServiceError`, `RateLimitError`, `FileUploadError`,
    /// `BadRequestError`, `InternalServerError`.
    #[schema(example = "ValidationError")]
    pub name: &'static str,
    /// Human-readable error description.
    #[schema(example = "certificate_urls must contain at least one document")]
    pub message: String,
    /// Machine-readable error code.
    #[schema(example = "VALIDATION_ERROR")]
    pub code: &'static str,
}

/// Structured error response returned by all endpoints on failure.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    Authentication(String),
    Authorization(String),
    NotFound(String),
    Conflict(String),
    /// Database failure. The detail is logged, never returned.
    Database(String),
    /// Storage or another upstream service failed.
    ExternalService(String),
    /// Rate limit exceeded. Contains seconds until retry is allowed.
    RateLimited {
        retry_after: u64,
    },
    FileUpload(String),
    BadRequest(String),
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::FileUpload(_) | AppError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Authentication(_) => StatusCode::UNAUTHORIZED,
            AppError::Authorization(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::ExternalService(_) => StatusCode::BAD_GATEWAY,
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "ValidationError",
            AppError::Authentication(_) => "AuthenticationError",
            AppError::Authorization(_) => "AuthorizationError",
            AppError::NotFound(_) => "NotFoundError",
            AppError::Conflict(_) => "ConflictError",
            AppError::Database(_) => "DatabaseError",
            AppError::ExternalService(_) => "ExternalServiceError",
            AppError::RateLimited { .. } => "RateLimitError",
            AppError::FileUpload(_) => "FileUploadError",
            AppError::BadRequest(_) => "BadRequestError",
            AppError::Internal(_) => "InternalServerError",
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Authentication(_) => "AUTHENTICATION_ERROR",
            AppError::Authorization(_) => "AUTHORIZATION_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::ExternalService(_) => "EXTERNAL_SERVICE_ERROR",
            AppError::RateLimited { .. } => "RATE_LIMIT_EXCEEDED",
            AppError::FileUpload(_) => "FILE_UPLOAD_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn into_body(self) -> ErrorBody {
        let name = self.name();
        let code = self.code();
        let message = match self {
            AppError::Validation(msg)
            | AppError::Authentication(msg)
            | AppError::Authorization(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::FileUpload(msg)
            | AppError::BadRequest(msg) => msg,
            AppError::RateLimited { retry_after } => {
                format!("Rate limit exceeded. Try again in {} seconds", retry_after)
            }
            AppError::Database(detail) => {
                tracing::error!("Database error: {}", detail);
                "A database error occurred".into()
            }
            AppError::ExternalService(detail) => {
                tracing::error!("External service error: {}", detail);
                "An upstream service failed to complete the request".into()
            }
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                "An unexpected error occurred".into()
            }
        };
        ErrorBody {
            name,
            message,
            code,
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::RateLimited { retry_after } => {
                write!(f, "{}: retry after {}s", self.name(), retry_after)
            }
            AppError::Validation(msg)
            | AppError::Authentication(msg)
            | AppError::Authorization(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::Database(msg)
            | AppError::ExternalService(msg)
            | AppError::FileUpload(msg)
            | AppError::BadRequest(msg)
            | AppError::Internal(msg) => write!(f, "{}: {}", self.name(), msg),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let retry_after = if let AppError::RateLimited { retry_after } = &self {
            Some(*retry_after)
        } else {
            None
        };

        let status = self.status();
        let body = ErrorResponse {
            error: self.into_body(),
        };

        if let Some(seconds) = retry_after {
            (status, [("Retry-After", seconds.to_string())], Json(body)).into_response()
        } else {
            (status, Json(body)).into_response()
        }
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => {
                tracing::debug!("Unique constraint violation: {detail}");
                AppError::Conflict("A record with the same unique value already exists".into())
            }
            _ => AppError::Database(err.to_string()),
        }
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(key) => AppError::NotFound(format!("File '{key}' not found")),
            StorageError::InvalidKey(msg) => AppError::Validation(msg),
            other => AppError::ExternalService(other.to_string()),
        }
    }
}
