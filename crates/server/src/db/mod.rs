//! Persistence for portfolio content.
//!
//! # Database: `folio`
//!
//! ## Tables
//!
//! - `folio.project` - Portfolio projects (`images[1]` is the cover)
//! - `folio.message` - Contact form messages
//! - `folio.session` - Tower-sessions storage
//!
//! # Stores
//!
//! Handlers never touch the pool directly. They go through the
//! [`ProjectStore`] and [`MessageStore`] traits, implemented for `PostgreSQL`
//! ([`PgProjectStore`], [`PgMessageStore`]) and in memory ([`memory`]).
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p folio-cli -- migrate
//! ```

pub mod memory;
pub mod messages;
pub mod projects;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use folio_core::{MessageId, ProjectId};

use crate::models::{Message, NewMessage, NewProject, Project};

pub use memory::{MemoryMessageStore, MemoryProjectStore};
pub use messages::PgMessageStore;
pub use projects::PgProjectStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

/// Storage for projects.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// Insert a project and return it with its assigned id and timestamp.
    async fn insert(&self, project: NewProject) -> Result<Project, RepositoryError>;

    /// Delete a project. Returns `false` if no project had this id.
    async fn delete(&self, id: ProjectId) -> Result<bool, RepositoryError>;

    /// All projects, newest first.
    async fn list(&self) -> Result<Vec<Project>, RepositoryError>;

    /// Verify the backing store is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// Storage for contact messages.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Insert a message and return it with its assigned id and timestamp.
    async fn insert(&self, message: NewMessage) -> Result<Message, RepositoryError>;

    /// Delete a message. Returns `false` if no message had this id.
    async fn delete(&self, id: MessageId) -> Result<bool, RepositoryError>;

    /// All messages, newest first.
    async fn list(&self) -> Result<Vec<Message>, RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Apply the content schema migrations.
///
/// # Errors
///
/// Returns `MigrateError` if a migration fails or the history is inconsistent.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
