//! Authentication logic.
//!
//! Provides password hashing, session token signing, and the account store
//! consumed by `regdesk_api`.

pub mod jwt;
pub mod password;
pub mod queries;
pub mod store;

use thiserror::Error;

use crate::validation::ValidationError;

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown email or wrong password. The two cases are deliberately
    /// indistinguishable.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Email already registered")]
    DuplicateAccount,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DbError(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ValidationError> for AuthError {
    fn from(e: ValidationError) -> Self {
        AuthError::ValidationError(e.0)
    }
}
