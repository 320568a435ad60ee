//! Application error types.

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{FromRequest, FromRequestParts};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use regdesk_core::auth::AuthError;
use regdesk_core::clients::ClientError;
use regdesk_core::uploads::UploadError;
use regdesk_core::validation::ValidationError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::models::ApiResponse;

/// Convenience alias for handler return types.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level errors with HTTP status mapping.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("Email already registered")]
    DuplicateAccount,

    #[error("Email already registered")]
    DuplicateEmail,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token not provided")]
    MissingToken,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidFile(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Internal server error")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_)
            | AppError::DuplicateAccount
            | AppError::DuplicateEmail
            | AppError::InvalidFile(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials | AppError::MissingToken | AppError::InvalidToken => {
                StatusCode::UNAUTHORIZED
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::StorageUnavailable(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn client_not_found() -> Self {
        AppError::NotFound("Client not found".into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = match &self {
            AppError::StorageUnavailable(detail) => {
                error!("storage unavailable: {detail}");
                "Failed to upload file".to_string()
            }
            AppError::Internal(detail) => {
                error!("internal error: {detail}");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        (self.status(), Json(ApiResponse::<()>::error(message))).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Internal(e.to_string())
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidCredentials => AppError::InvalidCredentials,
            AuthError::InvalidToken => AppError::InvalidToken,
            AuthError::DuplicateAccount => AppError::DuplicateAccount,
            AuthError::ValidationError(msg) => AppError::Validation(msg),
            AuthError::DbError(e) => AppError::from(e),
            AuthError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<ClientError> for AppError {
    fn from(e: ClientError) -> Self {
        match e {
            ClientError::Validation(msg) => AppError::Validation(msg),
            ClientError::DuplicateEmail => AppError::DuplicateEmail,
            ClientError::NotFound => AppError::client_not_found(),
            ClientError::DbError(e) => AppError::from(e),
        }
    }
}

impl From<UploadError> for AppError {
    fn from(e: UploadError) -> Self {
        match e {
            UploadError::Storage(detail) => AppError::StorageUnavailable(detail),
            invalid => AppError::InvalidFile(invalid.to_string()),
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(e: ValidationError) -> Self {
        AppError::Validation(e.0)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<MultipartError> for AppError {
    fn from(e: MultipartError) -> Self {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::InvalidFile("File must be at most 10MB".into())
        } else {
            AppError::Validation(e.body_text())
        }
    }
}

/// `Json` extractor whose rejections use the [`ApiResponse`] envelope.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// `Path` extractor whose rejections use the [`ApiResponse`] envelope.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);

impl<T: Serialize> IntoResponse for AppJson<T> {
    fn into_response(self) -> Response {
        Json(self.0).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(AppError::DuplicateEmail.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::DuplicateAccount.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::InvalidFile("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::InvalidCredentials.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::InvalidToken.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::client_not_found().status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::StorageUnavailable("s3 down".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn upload_errors_split_into_invalid_file_and_storage() {
        assert!(matches!(
            AppError::from(UploadError::Missing),
            AppError::InvalidFile(_)
        ));
        assert!(matches!(
            AppError::from(UploadError::Storage("timeout".into())),
            AppError::StorageUnavailable(_)
        ));
    }

    #[tokio::test]
    async fn internal_detail_is_not_leaked() {
        let resp = AppError::Internal("connection refused at 10.0.0.5".into()).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.contains("\"success\":false"));
        assert!(text.contains("Internal server error"));
        assert!(!text.contains("10.0.0.5"));
    }
}
