//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                - Liveness
//! GET    /health/ready          - Store readiness
//!
//! # Auth
//! POST   /auth/login            - Log in with the admin secret (form: password)
//! POST   /auth/demo             - Enter demo mode, redirect to /admin
//! POST   /auth/logout           - Log out, redirect to /
//!
//! # API
//! GET    /api/session           - Caller's role
//! GET    /api/projects          - Project listing (public)
//! POST   /api/projects          - Create project (admin, multipart)
//! DELETE /api/projects/{id}     - Delete project (admin)
//! GET    /api/messages          - Message inbox (demo or admin)
//! POST   /api/messages          - Contact form (public)
//! DELETE /api/messages/{id}     - Delete message (admin)
//! ```

pub mod auth;
pub mod messages;
pub mod projects;

use axum::{
    Router,
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};
use tower_sessions::SessionStore;

use crate::middleware::{SessionSettings, with_session_layer};
use crate::state::AppState;

/// Room for multipart boundaries and text fields on top of the file bytes.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Result body for form actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResponse {
    pub success: bool,
    pub message: String,
}

impl ActionResponse {
    #[must_use]
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/demo", post(auth::demo))
        .route("/logout", post(auth::logout))
}

/// Create the JSON API router.
///
/// `upload_limit` is the aggregate file limit; the body limit on project
/// creation allows for multipart overhead on top of it so oversized uploads
/// are reported by the upload check rather than cut off mid-stream.
pub fn api_routes(upload_limit: usize) -> Router<AppState> {
    let body_limit = upload_limit.saturating_add(MULTIPART_OVERHEAD_BYTES);

    Router::new()
        .route("/session", get(auth::whoami))
        .route(
            "/projects",
            get(projects::list)
                .post(projects::create)
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/projects/{id}", delete(projects::delete))
        .route("/messages", get(messages::list).post(messages::create))
        .route("/messages/{id}", delete(messages::delete))
}

/// Build the full application with sessions over `store`.
pub fn app<S>(state: AppState, store: S, settings: &SessionSettings) -> Router
where
    S: SessionStore + Clone,
{
    let router = Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/auth", auth_routes())
        .nest("/api", api_routes(state.uploads().limit_bytes()));

    with_session_layer(router, store, settings).with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the store is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
