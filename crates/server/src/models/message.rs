//! Contact message types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use folio_core::MessageId;

use super::{ValidationError, optional, required};

/// Subject used when the sender leaves it blank.
pub const DEFAULT_SUBJECT: &str = "General";

/// A message left through the public contact form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// A validated message ready to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub content: String,
}

impl NewMessage {
    /// Validate contact form input.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if name, email, or content is blank.
    pub fn parse(
        name: &str,
        email: &str,
        subject: Option<&str>,
        content: &str,
    ) -> Result<Self, ValidationError> {
        const MISSING: &str = "Please fill in all required fields.";

        Ok(Self {
            name: required(name, MISSING)?,
            email: required(email, MISSING)?,
            subject: optional(subject).unwrap_or_else(|| DEFAULT_SUBJECT.to_owned()),
            content: required(content, MISSING)?,
        })
    }
}
