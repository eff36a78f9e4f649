//! Session role resolution.
//!
//! A session holds at most one [`SessionGrant`]. The role it carries is the
//! caller's role until it expires; no grant (or an expired one) means
//! [`Role::None`].
//!
//! Transitions:
//!
//! | From  | Operation          | To    |
//! |-------|--------------------|-------|
//! | None  | login (match)      | Admin |
//! | Demo  | login (match)      | Admin |
//! | None  | enable demo        | Demo  |
//! | Admin | enable demo        | Admin |
//! | any   | logout             | None  |
//!
//! A failed login leaves the session untouched.

use chrono::{DateTime, Duration, Utc};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tower_sessions::Session;
use tracing::{info, instrument, warn};

use folio_core::Role;

use crate::models::{SessionGrant, session_keys};

/// Lifetime of an admin grant.
const ADMIN_GRANT_HOURS: i64 = 24;

/// Lifetime of a demo grant.
const DEMO_GRANT_HOURS: i64 = 24;

/// Errors from session transitions.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Submitted secret does not match.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Session store failed.
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

/// Resolves and changes the role attached to a session.
#[derive(Clone)]
pub struct SessionResolver {
    admin_secret: SecretString,
}

impl std::fmt::Debug for SessionResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionResolver")
            .field("admin_secret", &"[REDACTED]")
            .finish()
    }
}

impl SessionResolver {
    #[must_use]
    pub const fn new(admin_secret: SecretString) -> Self {
        Self { admin_secret }
    }

    // =========================================================================
    // Pure transitions
    // =========================================================================

    /// Role carried by `grant` at `now`.
    #[must_use]
    pub fn resolve_role(grant: Option<&SessionGrant>, now: DateTime<Utc>) -> Role {
        grant
            .filter(|g| g.is_active(now))
            .map_or(Role::None, |g| g.role)
    }

    /// Admin grant for a matching secret.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if `secret` does not match.
    pub fn grant_for_login(
        &self,
        secret: &str,
        now: DateTime<Utc>,
    ) -> Result<SessionGrant, AuthError> {
        if !constant_time_compare(secret, self.admin_secret.expose_secret()) {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(SessionGrant {
            role: Role::Admin,
            expires_at: now + Duration::hours(ADMIN_GRANT_HOURS),
        })
    }

    /// Demo grant, unless `current` is a live admin grant, which is kept.
    #[must_use]
    pub fn grant_for_demo(current: Option<SessionGrant>, now: DateTime<Utc>) -> SessionGrant {
        match current {
            Some(grant) if grant.role == Role::Admin && grant.is_active(now) => grant,
            _ => SessionGrant {
                role: Role::Demo,
                expires_at: now + Duration::hours(DEMO_GRANT_HOURS),
            },
        }
    }

    // =========================================================================
    // Session operations
    // =========================================================================

    /// Role of the session's caller.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Session` if the session store cannot be read.
    pub async fn current_role(session: &Session) -> Result<Role, AuthError> {
        let grant = session.get::<SessionGrant>(session_keys::GRANT).await?;
        Ok(Self::resolve_role(grant.as_ref(), Utc::now()))
    }

    /// Log in with the shared admin secret.
    ///
    /// On success the session id is rotated and the admin grant replaces any
    /// demo grant.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` on mismatch, leaving the session
    /// untouched, or `AuthError::Session` if the store fails.
    #[instrument(skip_all)]
    pub async fn login(&self, session: &Session, secret: &str) -> Result<Role, AuthError> {
        let grant = match self.grant_for_login(secret, Utc::now()) {
            Ok(grant) => grant,
            Err(e) => {
                warn!("Admin login rejected");
                return Err(e);
            }
        };

        session.cycle_id().await?;
        session.insert(session_keys::GRANT, grant).await?;

        info!("Admin logged in");
        Ok(grant.role)
    }

    /// Enter demo mode without any credential.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Session` if the session store fails.
    #[instrument(skip_all)]
    pub async fn enable_demo(session: &Session) -> Result<Role, AuthError> {
        let current = session.get::<SessionGrant>(session_keys::GRANT).await?;
        let grant = Self::grant_for_demo(current, Utc::now());
        session.insert(session_keys::GRANT, grant).await?;

        info!(role = %grant.role, "Demo mode requested");
        Ok(grant.role)
    }

    /// Drop the grant and the session with it.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Session` if the session store fails.
    pub async fn logout(session: &Session) -> Result<(), AuthError> {
        session.flush().await?;
        Ok(())
    }
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result: u8 = 0;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }

    result == 0
}
