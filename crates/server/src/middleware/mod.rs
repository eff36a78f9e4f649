//! HTTP middleware and extractors.
//!
//! - [`session`] - Signed-cookie session layer backed by `PostgreSQL`
//! - [`auth`] - Caller role extractor

pub mod auth;
pub mod session;

pub use auth::CurrentRole;
pub use session::{
    SESSION_COOKIE_NAME, SessionSettings, SessionSetupError, postgres_session_store,
    with_session_layer,
};
