//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! folio migrate
//! ```
//!
//! # Environment Variables
//!
//! - `FOLIO_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`)
//!
//! # Migration Files
//!
//! Content migrations live in `crates/server/migrations/`. The session table
//! (`folio.session`) is created by the session store's own migration.

use secrecy::SecretString;
use thiserror::Error;
use tower_sessions_sqlx_store::PostgresStore;

use folio_server::db;
use folio_server::middleware::{SessionSetupError, postgres_session_store};

/// Errors that can occur while migrating.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A content migration failed.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Session store could not be set up.
    #[error("Session store error: {0}")]
    Session(#[from] SessionSetupError),
}

fn database_url() -> Result<SecretString, MigrationError> {
    std::env::var("FOLIO_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| MigrationError::MissingEnvVar("FOLIO_DATABASE_URL"))
}

/// Apply content migrations, then create the session table.
///
/// # Errors
///
/// Returns `MigrationError` if the database is unreachable or a migration
/// fails.
pub async fn run() -> Result<(), MigrationError> {
    dotenvy::dotenv().ok();

    let database_url = database_url()?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&database_url).await?;

    tracing::info!("Running content migrations...");
    db::run_migrations(&pool).await?;

    tracing::info!("Creating session table...");
    let store: PostgresStore = postgres_session_store(&pool)?;
    store.migrate().await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
