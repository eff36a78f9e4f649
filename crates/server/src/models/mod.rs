//! Domain models for the portfolio.
//!
//! - [`project`] - Portfolio projects and their creation drafts
//! - [`message`] - Contact form messages
//! - [`session`] - Session-stored role grants

pub mod message;
pub mod project;
pub mod session;

use thiserror::Error;

pub use message::{Message, NewMessage};
pub use project::{NewProject, Project, ProjectDraft, parse_tags};
pub use session::{SessionGrant, keys as session_keys};

/// A required field is missing or malformed.
///
/// The message is shown to the caller verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Trim a required form field, failing with `message` when nothing is left.
pub(crate) fn required(value: &str, message: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new(message));
    }
    Ok(trimmed.to_owned())
}

/// Trim an optional form field; blank input counts as absent.
pub(crate) fn optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}
