// Shared error vocabulary for the API
// Every client-facing failure is reported as a list of stable error codes

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use utoipa::ToSchema;

/// Machine-readable error identifiers returned in `{"errors": [...]}` bodies
///
/// The serialized names are part of the public contract and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    FirstNameRequired,
    FirstNameTypeMismatch,
    FirstNameLengthMismatch,
    LastNameRequired,
    LastNameTypeMismatch,
    LastNameLengthMismatch,
    EmailRequired,
    EmailTypeMismatch,
    EmailLengthMismatch,
    InvalidEmailFormat,
    PasswordRequired,
    PasswordTypeMismatch,
    #[serde(rename = "PASSWORD1_REQUIRED")]
    Password1Required,
    #[serde(rename = "PASSWORD1_TYPE_MISMATCH")]
    Password1TypeMismatch,
    #[serde(rename = "PASSWORD2_REQUIRED")]
    Password2Required,
    #[serde(rename = "PASSWORD2_TYPE_MISMATCH")]
    Password2TypeMismatch,
    PasswordsMismatch,
    PasswordTooWeak,
    AccountAlreadyExists,
    AccountDoesNotExist,
    AccountInactive,
    InvalidCredentials,
    IncorrectPassword,
    RefreshTokenRequired,
    InvalidRefreshToken,
    NameRequired,
    NameLengthMismatch,
    ProjectAlreadyExists,
    SectionAlreadyExists,
    TaskAlreadyExists,
    RecurrenceRequiresDueDate,
    InvalidRequestBody,
    NotFound,
    UnexpectedError,
}

impl ErrorCode {
    /// The wire identifier, e.g. `EMAIL_REQUIRED`
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::FirstNameRequired => "FIRST_NAME_REQUIRED",
            ErrorCode::FirstNameTypeMismatch => "FIRST_NAME_TYPE_MISMATCH",
            ErrorCode::FirstNameLengthMismatch => "FIRST_NAME_LENGTH_MISMATCH",
            ErrorCode::LastNameRequired => "LAST_NAME_REQUIRED",
            ErrorCode::LastNameTypeMismatch => "LAST_NAME_TYPE_MISMATCH",
            ErrorCode::LastNameLengthMismatch => "LAST_NAME_LENGTH_MISMATCH",
            ErrorCode::EmailRequired => "EMAIL_REQUIRED",
            ErrorCode::EmailTypeMismatch => "EMAIL_TYPE_MISMATCH",
            ErrorCode::EmailLengthMismatch => "EMAIL_LENGTH_MISMATCH",
            ErrorCode::InvalidEmailFormat => "INVALID_EMAIL_FORMAT",
            ErrorCode::PasswordRequired => "PASSWORD_REQUIRED",
            ErrorCode::PasswordTypeMismatch => "PASSWORD_TYPE_MISMATCH",
            ErrorCode::Password1Required => "PASSWORD1_REQUIRED",
            ErrorCode::Password1TypeMismatch => "PASSWORD1_TYPE_MISMATCH",
            ErrorCode::Password2Required => "PASSWORD2_REQUIRED",
            ErrorCode::Password2TypeMismatch => "PASSWORD2_TYPE_MISMATCH",
            ErrorCode::PasswordsMismatch => "PASSWORDS_MISMATCH",
            ErrorCode::PasswordTooWeak => "PASSWORD_TOO_WEAK",
            ErrorCode::AccountAlreadyExists => "ACCOUNT_ALREADY_EXISTS",
            ErrorCode::AccountDoesNotExist => "ACCOUNT_DOES_NOT_EXIST",
            ErrorCode::AccountInactive => "ACCOUNT_INACTIVE",
            ErrorCode::InvalidCredentials => "INVALID_CREDENTIALS",
            ErrorCode::IncorrectPassword => "INCORRECT_PASSWORD",
            ErrorCode::RefreshTokenRequired => "REFRESH_TOKEN_REQUIRED",
            ErrorCode::InvalidRefreshToken => "INVALID_REFRESH_TOKEN",
            ErrorCode::NameRequired => "NAME_REQUIRED",
            ErrorCode::NameLengthMismatch => "NAME_LENGTH_MISMATCH",
            ErrorCode::ProjectAlreadyExists => "PROJECT_ALREADY_EXISTS",
            ErrorCode::SectionAlreadyExists => "SECTION_ALREADY_EXISTS",
            ErrorCode::TaskAlreadyExists => "TASK_ALREADY_EXISTS",
            ErrorCode::RecurrenceRequiresDueDate => "RECURRENCE_REQUIRES_DUE_DATE",
            ErrorCode::InvalidRequestBody => "INVALID_REQUEST_BODY",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::UnexpectedError => "UNEXPECTED_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Consistent error response structure: `{"errors": ["CODE", ...]}`
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub errors: Vec<ErrorCode>,
}

impl ErrorBody {
    pub fn new(errors: Vec<ErrorCode>) -> Self {
        Self { errors }
    }
}

/// Build a response carrying a list of error codes
pub fn error_response(status: StatusCode, errors: Vec<ErrorCode>) -> Response {
    (status, Json(ErrorBody::new(errors))).into_response()
}

/// The 401 response; never says which check failed
pub fn unauthenticated_response() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "detail": "unauthenticated" })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_names_match_as_str() {
        let codes = [
            ErrorCode::FirstNameLengthMismatch,
            ErrorCode::InvalidEmailFormat,
            ErrorCode::Password1Required,
            ErrorCode::Password2TypeMismatch,
            ErrorCode::PasswordsMismatch,
            ErrorCode::RefreshTokenRequired,
            ErrorCode::RecurrenceRequiresDueDate,
            ErrorCode::InvalidRequestBody,
            ErrorCode::UnexpectedError,
        ];

        for code in codes {
            let serialized = serde_json::to_value(code).unwrap();
            assert_eq!(serialized, serde_json::Value::String(code.as_str().to_string()));
        }
    }

    #[test]
    fn test_error_body_shape() {
        let body = ErrorBody::new(vec![ErrorCode::EmailRequired, ErrorCode::PasswordRequired]);
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value, json!({ "errors": ["EMAIL_REQUIRED", "PASSWORD_REQUIRED"] }));
    }
}
