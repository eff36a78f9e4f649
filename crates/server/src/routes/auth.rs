//! Login, demo mode, and logout.

use axum::{
    Form, Json,
    extract::State,
    response::{IntoResponse, Redirect},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use folio_core::Role;

use super::ActionResponse;
use crate::error::{Result, add_breadcrumb};
use crate::middleware::CurrentRole;
use crate::services::SessionResolver;
use crate::state::AppState;

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub password: String,
}

/// Current role, for the presentation layer.
#[derive(Debug, Serialize)]
pub struct SessionInfo {
    pub role: Role,
}

/// POST /auth/login
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Json<ActionResponse>> {
    state.sessions().login(&session, &form.password).await?;
    add_breadcrumb("auth", "Admin logged in");
    Ok(Json(ActionResponse::ok("Logged in.")))
}

/// POST /auth/demo
pub async fn demo(session: Session) -> Result<impl IntoResponse> {
    SessionResolver::enable_demo(&session).await?;
    Ok(Redirect::to("/admin"))
}

/// POST /auth/logout
pub async fn logout(session: Session) -> Result<impl IntoResponse> {
    SessionResolver::logout(&session).await?;
    Ok(Redirect::to("/"))
}

/// GET /api/session
pub async fn whoami(CurrentRole(role): CurrentRole) -> Json<SessionInfo> {
    Json(SessionInfo { role })
}
