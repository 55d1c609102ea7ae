// Authentication and session error types

use crate::error::{error_response, unauthenticated_response, ErrorCode};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{debug, error, warn};

/// Authentication and session error types
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    // Client errors, reported as error code lists
    #[error("Validation failed: {0:?}")]
    ValidationError(Vec<ErrorCode>),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Account already exists")]
    AccountAlreadyExists,

    #[error("Refresh token required")]
    RefreshTokenRequired,

    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    // Bearer authentication errors, all reported as a bare 401
    #[error("Missing authentication token")]
    MissingToken,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token has expired")]
    ExpiredToken,

    // Internal errors
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Password hashing error")]
    PasswordHashError,

    #[error("Token generation error: {0}")]
    TokenGenerationError(String),
}

impl From<sqlx::Error> for AuthError {
    fn from(err: sqlx::Error) -> Self {
        AuthError::DatabaseError(err.to_string())
    }
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::ValidationError(_)
            | AuthError::InvalidCredentials
            | AuthError::AccountAlreadyExists
            | AuthError::RefreshTokenRequired
            | AuthError::InvalidRefreshToken => StatusCode::BAD_REQUEST,
            AuthError::MissingToken | AuthError::InvalidToken | AuthError::ExpiredToken => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::DatabaseError(_)
            | AuthError::PasswordHashError
            | AuthError::TokenGenerationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The error codes sent to the client
    /// Internal failures collapse to `UNEXPECTED_ERROR` (no sensitive data)
    pub fn codes(&self) -> Vec<ErrorCode> {
        match self {
            AuthError::ValidationError(codes) => codes.clone(),
            AuthError::InvalidCredentials => vec![ErrorCode::InvalidCredentials],
            AuthError::AccountAlreadyExists => vec![ErrorCode::AccountAlreadyExists],
            AuthError::RefreshTokenRequired => vec![ErrorCode::RefreshTokenRequired],
            AuthError::InvalidRefreshToken => vec![ErrorCode::InvalidRefreshToken],
            AuthError::MissingToken | AuthError::InvalidToken | AuthError::ExpiredToken => {
                Vec::new()
            }
            AuthError::DatabaseError(_)
            | AuthError::PasswordHashError
            | AuthError::TokenGenerationError(_) => vec![ErrorCode::UnexpectedError],
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match &self {
            AuthError::ValidationError(codes) => debug!("Validation error: {:?}", codes),
            AuthError::InvalidCredentials => debug!("Rejected login attempt"),
            AuthError::AccountAlreadyExists => debug!("Signup for an existing account"),
            AuthError::RefreshTokenRequired => debug!("Refresh token missing from request"),
            AuthError::InvalidRefreshToken => warn!("Invalid refresh token presented"),
            AuthError::MissingToken => debug!("Missing token in request"),
            AuthError::InvalidToken => warn!("Invalid token attempt"),
            AuthError::ExpiredToken => debug!("Expired token attempt"),
            AuthError::DatabaseError(msg) => error!("Database error in auth: {}", msg),
            AuthError::PasswordHashError => error!("Password hashing error"),
            AuthError::TokenGenerationError(msg) => error!("Token generation error: {}", msg),
        }

        let status = self.status_code();
        if status == StatusCode::UNAUTHORIZED {
            return unauthenticated_response();
        }
        error_response(status, self.codes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_are_bad_request() {
        for err in [
            AuthError::ValidationError(vec![ErrorCode::EmailRequired]),
            AuthError::InvalidCredentials,
            AuthError::AccountAlreadyExists,
            AuthError::RefreshTokenRequired,
            AuthError::InvalidRefreshToken,
        ] {
            assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
            assert!(!err.codes().is_empty());
        }
    }

    #[test]
    fn test_session_errors_are_unauthorized() {
        for err in [AuthError::MissingToken, AuthError::InvalidToken, AuthError::ExpiredToken] {
            assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
            assert!(err.codes().is_empty());
        }
    }

    #[test]
    fn test_internal_errors_hide_details() {
        let err = AuthError::DatabaseError("connection refused to 10.0.0.3".to_string());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.codes(), vec![ErrorCode::UnexpectedError]);
    }
}
