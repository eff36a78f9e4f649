//! Errors shared by the mutation services.

use thiserror::Error;

use super::uploads::UploadError;
use crate::db::RepositoryError;
use crate::models::ValidationError;

/// Why a create or delete did not happen.
#[derive(Debug, Error)]
pub enum MutationError {
    /// A required field is missing; the message is shown verbatim.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// The caller's role does not allow this operation.
    #[error("not permitted")]
    Permission,

    /// Asset upload failed before anything was persisted.
    #[error(transparent)]
    Upload(#[from] UploadError),

    /// The record to delete does not exist.
    #[error("not found")]
    NotFound,

    /// Persistence failed.
    #[error("store error: {0}")]
    Store(#[from] RepositoryError),
}
