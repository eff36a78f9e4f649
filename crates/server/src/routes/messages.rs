//! Contact messages.

use axum::{
    Form, Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::instrument;

use folio_core::MessageId;

use super::ActionResponse;
use crate::error::{Result, add_breadcrumb};
use crate::middleware::CurrentRole;
use crate::models::Message;
use crate::state::AppState;

/// Contact form data.
///
/// Fields default to empty so missing ones surface as a validation message
/// instead of a deserialization error.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MessageForm {
    pub name: String,
    pub email: String,
    pub subject: Option<String>,
    pub message: String,
}

/// GET /api/messages
pub async fn list(
    State(state): State<AppState>,
    CurrentRole(role): CurrentRole,
) -> Result<Json<Vec<Message>>> {
    let messages = state.messages().list(role).await?;
    Ok(Json(messages.as_ref().clone()))
}

/// POST /api/messages
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    Form(form): Form<MessageForm>,
) -> Result<(StatusCode, Json<ActionResponse>)> {
    state
        .messages()
        .create(
            &form.name,
            &form.email,
            form.subject.as_deref(),
            &form.message,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ActionResponse::ok("Thanks! Your message has been sent.")),
    ))
}

/// DELETE /api/messages/{id}
#[instrument(skip(state))]
pub async fn delete(
    State(state): State<AppState>,
    CurrentRole(role): CurrentRole,
    Path(id): Path<MessageId>,
) -> Result<Json<ActionResponse>> {
    state.messages().delete(role, id).await?;
    add_breadcrumb("messages", "Message deleted");
    Ok(Json(ActionResponse::ok("Message deleted.")))
}
