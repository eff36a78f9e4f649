//! Session middleware configuration.
//!
//! Sessions live in `PostgreSQL` (`folio.session`) and are referenced by a
//! signed, HTTP-only, SameSite=Strict cookie. Admin and demo sessions share
//! the same cookie; the role is the stored [`SessionGrant`].
//!
//! [`SessionGrant`]: crate::models::SessionGrant

use axum::Router;
use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use thiserror::Error;
use tower_sessions::cookie::{Key, SameSite};
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::SiteConfig;
use crate::state::AppState;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "folio_session";

/// Session expiry after inactivity (24 hours).
const SESSION_EXPIRY_SECONDS: i64 = 24 * 60 * 60;

/// Errors setting up sessions.
#[derive(Debug, Error)]
pub enum SessionSetupError {
    #[error("session secret is not a valid signing key: {0}")]
    Key(String),
    #[error("invalid session store location: {0}")]
    Store(String),
}

/// Cookie settings for the session layer.
#[derive(Clone)]
pub struct SessionSettings {
    key: Key,
    secure: bool,
}

impl std::fmt::Debug for SessionSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionSettings")
            .field("key", &"[REDACTED]")
            .field("secure", &self.secure)
            .finish()
    }
}

impl SessionSettings {
    /// Build settings from a signing secret of at least 64 bytes.
    ///
    /// # Errors
    ///
    /// Returns `SessionSetupError::Key` if the secret is too short.
    pub fn new(secret: &SecretString, secure: bool) -> Result<Self, SessionSetupError> {
        let key = Key::try_from(secret.expose_secret().as_bytes())
            .map_err(|e| SessionSetupError::Key(e.to_string()))?;
        Ok(Self { key, secure })
    }

    /// Settings for the configured site; cookies are `Secure` on HTTPS.
    ///
    /// # Errors
    ///
    /// Returns `SessionSetupError::Key` if the session secret is unusable.
    pub fn from_config(config: &SiteConfig) -> Result<Self, SessionSetupError> {
        Self::new(&config.session_secret, config.is_secure())
    }
}

/// Session store in the `folio.session` table.
///
/// # Errors
///
/// Returns `SessionSetupError::Store` if the schema or table name is rejected.
pub fn postgres_session_store(pool: &PgPool) -> Result<PostgresStore, SessionSetupError> {
    PostgresStore::new(pool.clone())
        .with_schema_name("folio")
        .map_err(SessionSetupError::Store)?
        .with_table_name("session")
        .map_err(SessionSetupError::Store)
}

/// Wrap `router` in a session layer over `store`.
pub fn with_session_layer<S>(
    router: Router<AppState>,
    store: S,
    settings: &SessionSettings,
) -> Router<AppState>
where
    S: SessionStore + Clone,
{
    router.layer(
        SessionManagerLayer::new(store)
            .with_name(SESSION_COOKIE_NAME)
            .with_expiry(Expiry::OnInactivity(
                tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
            ))
            .with_secure(settings.secure)
            .with_same_site(SameSite::Strict)
            .with_http_only(true)
            .with_path("/")
            .with_signed(settings.key.clone()),
    )
}
