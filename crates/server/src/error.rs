//! Unified error handling with Sentry integration.
//!
//! Every handler returns `Result<T, AppError>`. Errors render as the same
//! `{success: false, message}` body the forms read on success, with a status
//! code that matches the failure. Server-side failures are captured to Sentry
//! before responding.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::routes::ActionResponse;
use crate::services::{AuthError, MutationError, UploadError};

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// A create or delete was refused or failed.
    #[error("Mutation error: {0}")]
    Mutation(#[from] MutationError),

    /// Login or session operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Malformed request body.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Request body exceeded the transport limit.
    #[error("Request body too large")]
    BodyTooLarge,

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<tower_sessions::session::Error> for AppError {
    fn from(err: tower_sessions::session::Error) -> Self {
        Self::Auth(AuthError::Session(err))
    }
}

impl AppError {
    fn is_server_fault(&self) -> bool {
        matches!(
            self,
            Self::Internal(_)
                | Self::Auth(AuthError::Session(_))
                | Self::Mutation(
                    MutationError::Store(_) | MutationError::Upload(UploadError::Storage(_))
                )
        )
    }

    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Mutation(err) => match err {
                MutationError::Validation(_) => StatusCode::BAD_REQUEST,
                MutationError::Permission => StatusCode::FORBIDDEN,
                MutationError::Upload(UploadError::MissingCover) => StatusCode::BAD_REQUEST,
                MutationError::Upload(UploadError::TooLarge { .. }) => {
                    StatusCode::PAYLOAD_TOO_LARGE
                }
                MutationError::Upload(UploadError::Storage(_)) => StatusCode::BAD_GATEWAY,
                MutationError::NotFound => StatusCode::NOT_FOUND,
                MutationError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Auth(AuthError::InvalidCredentials) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::BodyTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Auth(AuthError::Session(_)) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message safe to show the caller.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Mutation(err) => match err {
                MutationError::Validation(e) => e.to_string(),
                MutationError::Permission => "Not permitted.".to_string(),
                MutationError::Upload(UploadError::Storage(_)) => {
                    "Image upload failed. Please try again.".to_string()
                }
                MutationError::Upload(e) => e.to_string(),
                MutationError::NotFound => "Not found.".to_string(),
                MutationError::Store(_) => "Something went wrong. Please try again.".to_string(),
            },
            Self::Auth(AuthError::InvalidCredentials) => "Invalid password.".to_string(),
            Self::BadRequest(msg) => msg.clone(),
            Self::BodyTooLarge => "Upload is too large.".to_string(),
            Self::Auth(AuthError::Session(_)) | Self::Internal(_) => {
                "Internal server error".to_string()
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.is_server_fault() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let body = ActionResponse::failure(self.public_message());
        (self.status(), Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for a completed mutation.
pub fn add_breadcrumb(category: &str, message: &str) {
    sentry::add_breadcrumb(sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::RepositoryError;
    use crate::models::ValidationError;
    use crate::storage::StorageError;

    fn status(err: impl Into<AppError>) -> StatusCode {
        err.into().into_response().status()
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            status(MutationError::Validation(ValidationError(
                "Title is required.".to_string()
            ))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status(MutationError::Permission), StatusCode::FORBIDDEN);
        assert_eq!(
            status(MutationError::Upload(UploadError::MissingCover)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(MutationError::Upload(UploadError::TooLarge {
                limit: 1,
                actual: 2
            })),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(status(MutationError::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(
            status(AuthError::InvalidCredentials),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn test_validation_message_is_verbatim() {
        let err = AppError::from(MutationError::Validation(ValidationError(
            "Title is required.".to_string(),
        )));
        assert_eq!(err.public_message(), "Title is required.");
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let err = AppError::from(MutationError::Store(RepositoryError::DataCorruption(
            "secret detail".to_string(),
        )));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.public_message().contains("secret detail"));

        let err = AppError::from(MutationError::Upload(UploadError::Storage(
            StorageError::Request("connection refused".to_string()),
        )));
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert!(!err.public_message().contains("connection refused"));
    }

    #[test]
    fn test_permission_message_is_generic() {
        let err = AppError::from(MutationError::Permission);
        assert_eq!(err.public_message(), "Not permitted.");
    }
}
