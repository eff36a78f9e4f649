//! Project listing, creation, and deletion.

use axum::{
    Json,
    extract::{
        Path, State,
        multipart::{Field, Multipart, MultipartError},
    },
    http::StatusCode,
};
use tracing::instrument;

use folio_core::ProjectId;

use super::ActionResponse;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::CurrentRole;
use crate::models::{Project, ProjectDraft};
use crate::services::{MutationError, UploadedFile};
use crate::state::AppState;

/// Create form contents.
#[derive(Debug, Default)]
struct ProjectForm {
    draft: ProjectDraft,
    cover: Option<UploadedFile>,
    gallery: Vec<UploadedFile>,
}

fn multipart_error(err: &MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return AppError::BodyTooLarge;
    }
    AppError::BadRequest(format!("Invalid form data: {}", err.body_text()))
}

async fn read_file(field: Field<'_>) -> Result<UploadedFile> {
    let file_name = field.file_name().unwrap_or_default().to_string();
    let content_type = field.content_type().map(str::to_string);
    let body = field.bytes().await.map_err(|e| multipart_error(&e))?;
    Ok(UploadedFile {
        file_name,
        content_type,
        body,
    })
}

async fn read_text(field: Field<'_>) -> Result<String> {
    field.text().await.map_err(|e| multipart_error(&e))
}

async fn read_form(mut multipart: Multipart) -> Result<ProjectForm> {
    let mut form = ProjectForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(&e))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "title" => form.draft.title = read_text(field).await?,
            "description" => form.draft.description = read_text(field).await?,
            "project_type" => form.draft.project_type = read_text(field).await?,
            "demo_link" => form.draft.demo_link = Some(read_text(field).await?),
            "repo_link" => form.draft.repo_link = Some(read_text(field).await?),
            "tags" => form.draft.tags = read_text(field).await?,
            "cover" => form.cover = Some(read_file(field).await?),
            "gallery" => form.gallery.push(read_file(field).await?),
            other => tracing::debug!(field = other, "Ignoring unknown form field"),
        }
    }

    Ok(form)
}

/// GET /api/projects
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Project>>> {
    let projects = state.projects().list().await?;
    Ok(Json(projects.as_ref().clone()))
}

/// POST /api/projects
///
/// Multipart fields: `title`, `description`, `project_type`, `demo_link`,
/// `repo_link`, `tags` (comma-separated), `cover` (file), and any number of
/// `gallery` files in display order.
#[instrument(skip_all, fields(role = %role))]
pub async fn create(
    State(state): State<AppState>,
    CurrentRole(role): CurrentRole,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ActionResponse>)> {
    if !role.can_mutate() {
        return Err(MutationError::Permission.into());
    }

    let form = read_form(multipart).await?;
    let project = state
        .projects()
        .publish(role, form.draft, form.cover, form.gallery, state.uploads())
        .await?;

    add_breadcrumb("projects", "Project created");
    Ok((
        StatusCode::CREATED,
        Json(ActionResponse::ok(format!(
            "Project \"{}\" created.",
            project.title
        ))),
    ))
}

/// DELETE /api/projects/{id}
#[instrument(skip(state))]
pub async fn delete(
    State(state): State<AppState>,
    CurrentRole(role): CurrentRole,
    Path(id): Path<ProjectId>,
) -> Result<Json<ActionResponse>> {
    state.projects().delete(role, id).await?;
    add_breadcrumb("projects", "Project deleted");
    Ok(Json(ActionResponse::ok("Project deleted.")))
}
