//! Session-related types.
//!
//! The caller's role is stored as a single [`SessionGrant`] rather than
//! separate admin/demo flags, so no contradictory combination can exist.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use folio_core::Role;

/// Role granted to a session, valid until `expires_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionGrant {
    pub role: Role,
    pub expires_at: DateTime<Utc>,
}

impl SessionGrant {
    /// Whether the grant still applies at `now`.
    #[must_use]
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for the caller's role grant.
    pub const GRANT: &str = "grant";
}
