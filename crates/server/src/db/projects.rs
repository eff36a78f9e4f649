//! `PostgreSQL` project store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use folio_core::{ProjectId, ProjectType};

use super::{ProjectStore, RepositoryError};
use crate::models::{NewProject, Project};

/// Row shape shared by every project query.
#[derive(Debug, sqlx::FromRow)]
struct ProjectRow {
    id: i32,
    title: String,
    description: String,
    project_type: String,
    demo_link: Option<String>,
    repo_link: Option<String>,
    tags: Vec<String>,
    images: Vec<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<ProjectRow> for Project {
    type Error = RepositoryError;

    fn try_from(row: ProjectRow) -> Result<Self, Self::Error> {
        let project_type = row.project_type.parse::<ProjectType>().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid project type in database: {e}"))
        })?;

        if row.images.is_empty() {
            return Err(RepositoryError::DataCorruption(format!(
                "project {} has no cover image",
                row.id
            )));
        }

        Ok(Self {
            id: ProjectId::new(row.id),
            title: row.title,
            description: row.description,
            project_type,
            demo_link: row.demo_link,
            repo_link: row.repo_link,
            tags: row.tags,
            images: row.images,
            created_at: row.created_at,
        })
    }
}

/// Project store backed by the `folio.project` table.
#[derive(Debug, Clone)]
pub struct PgProjectStore {
    pool: PgPool,
}

impl PgProjectStore {
    /// Create a new project store.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProjectStore for PgProjectStore {
    #[instrument(skip(self, project), fields(title = %project.title))]
    async fn insert(&self, project: NewProject) -> Result<Project, RepositoryError> {
        let row = sqlx::query_as::<_, ProjectRow>(
            r"
            INSERT INTO folio.project
                (title, description, project_type, demo_link, repo_link, tags, images)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, title, description, project_type, demo_link, repo_link,
                      tags, images, created_at
            ",
        )
        .bind(&project.title)
        .bind(&project.description)
        .bind(project.project_type.as_str())
        .bind(&project.demo_link)
        .bind(&project.repo_link)
        .bind(&project.tags)
        .bind(&project.images)
        .fetch_one(&self.pool)
        .await?;

        Project::try_from(row)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: ProjectId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM folio.project WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<Project>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProjectRow>(
            r"
            SELECT id, title, description, project_type, demo_link, repo_link,
                   tags, images, created_at
            FROM folio.project
            ORDER BY created_at DESC, id DESC
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Project::try_from).collect()
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
