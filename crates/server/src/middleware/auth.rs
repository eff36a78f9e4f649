//! Caller role extractor.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use folio_core::Role;

use crate::error::AppError;
use crate::services::SessionResolver;

/// The caller's current role.
///
/// Resolves to [`Role::None`] when there is no live grant. Handlers pass the
/// role to the services, which decide what it allows.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(CurrentRole(role): CurrentRole) -> impl IntoResponse {
///     role.to_string()
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct CurrentRole(pub Role);

impl<S> FromRequestParts<S> for CurrentRole
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or_else(|| AppError::Internal("session layer missing".to_string()))?;

        let role = SessionResolver::current_role(session).await?;
        Ok(Self(role))
    }
}
