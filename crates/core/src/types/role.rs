//! Access roles.
//!
//! Every request resolves to exactly one [`Role`]. The role alone decides which
//! mutations succeed; there are no per-resource permissions.

use serde::{Deserialize, Serialize};

/// Caller role, ordered by privilege.
///
/// - `None` - anonymous visitor; may read projects and send messages.
/// - `Demo` - simulated admin; may read the inbox but never mutate.
/// - `Admin` - full access to every mutation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    None,
    Demo,
    Admin,
}

impl Role {
    /// Whether this role may create or delete content.
    #[must_use]
    pub const fn can_mutate(self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Whether this role may read the contact inbox.
    #[must_use]
    pub const fn can_read_inbox(self) -> bool {
        !matches!(self, Self::None)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Demo => write!(f, "demo"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_admin_mutates() {
        assert!(Role::Admin.can_mutate());
        assert!(!Role::Demo.can_mutate());
        assert!(!Role::None.can_mutate());
    }

    #[test]
    fn test_inbox_requires_some_role() {
        assert!(Role::Admin.can_read_inbox());
        assert!(Role::Demo.can_read_inbox());
        assert!(!Role::None.can_read_inbox());
    }

    #[test]
    fn test_admin_outranks_demo() {
        assert!(Role::Admin > Role::Demo);
        assert!(Role::Demo > Role::None);
    }

    #[test]
    fn test_display_matches_serde() {
        for role in [Role::None, Role::Demo, Role::Admin] {
            let json = serde_json::to_string(&role).unwrap();
            assert_eq!(json, format!("\"{role}\""));
        }
    }
}
