use crate::error::{error_response, ErrorCode};
use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Error types for project, section and task operations
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Missing, or owned by someone else
    #[error("Not found")]
    NotFound,

    #[error("Validation failed: {0:?}")]
    ValidationError(Vec<ErrorCode>),

    /// Body missing, not JSON, or of the wrong shape
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("Project name already in use")]
    ProjectAlreadyExists,

    #[error("Section name already in use")]
    SectionAlreadyExists,

    #[error("Task name already in use")]
    TaskAlreadyExists,
}

impl From<sqlx::Error> for ProjectError {
    fn from(err: sqlx::Error) -> Self {
        ProjectError::DatabaseError(err.to_string())
    }
}

impl From<JsonRejection> for ProjectError {
    fn from(rejection: JsonRejection) -> Self {
        ProjectError::InvalidBody(rejection.body_text())
    }
}

// An id that is not a number cannot name a row
impl From<PathRejection> for ProjectError {
    fn from(_: PathRejection) -> Self {
        ProjectError::NotFound
    }
}

impl ProjectError {
    /// Map a unique-constraint violation to `conflict`, anything else to a database error
    pub fn on_unique_violation(err: sqlx::Error, conflict: ProjectError) -> ProjectError {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return conflict;
            }
        }
        ProjectError::from(err)
    }
}

impl IntoResponse for ProjectError {
    fn into_response(self) -> Response {
        let (status, codes) = match self {
            ProjectError::DatabaseError(msg) => {
                tracing::error!("Database error in projects: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, vec![ErrorCode::UnexpectedError])
            }
            ProjectError::NotFound => (StatusCode::NOT_FOUND, vec![ErrorCode::NotFound]),
            ProjectError::ValidationError(codes) => (StatusCode::BAD_REQUEST, codes),
            ProjectError::InvalidBody(detail) => {
                tracing::debug!("Rejected request body: {}", detail);
                (StatusCode::BAD_REQUEST, vec![ErrorCode::InvalidRequestBody])
            }
            ProjectError::ProjectAlreadyExists => {
                (StatusCode::BAD_REQUEST, vec![ErrorCode::ProjectAlreadyExists])
            }
            ProjectError::SectionAlreadyExists => {
                (StatusCode::BAD_REQUEST, vec![ErrorCode::SectionAlreadyExists])
            }
            ProjectError::TaskAlreadyExists => {
                (StatusCode::BAD_REQUEST, vec![ErrorCode::TaskAlreadyExists])
            }
        };

        error_response(status, codes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ProjectError::NotFound.into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ProjectError::ValidationError(vec![ErrorCode::NameRequired])
                .into_response()
                .status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ProjectError::TaskAlreadyExists.into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ProjectError::DatabaseError("pool timed out".to_string())
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_invalid_body_reports_error_code() {
        let response = ProjectError::InvalidBody("expected a string".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, serde_json::json!({ "errors": ["INVALID_REQUEST_BODY"] }));
    }

    #[test]
    fn test_non_database_errors_pass_through() {
        let err = ProjectError::on_unique_violation(
            sqlx::Error::RowNotFound,
            ProjectError::ProjectAlreadyExists,
        );
        assert!(matches!(err, ProjectError::DatabaseError(_)));
    }
}
