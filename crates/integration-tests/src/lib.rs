//! Integration tests for Folio.
//!
//! Tests drive the full router in process with `tower::ServiceExt::oneshot`.
//! Stores are in memory, so no database or object storage is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p folio-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `session` - Login, demo mode, logout, and health checks
//! - `projects` - Project create/delete permissions and upload ordering
//! - `messages` - Contact form and inbox access

#![allow(clippy::missing_panics_doc, clippy::expect_used)]

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, Bytes},
    http::{HeaderMap, Request, StatusCode, header},
};
use secrecy::SecretString;
use serde::de::DeserializeOwned;
use tower::ServiceExt;
use tower_sessions::MemoryStore;

use folio_core::Role;
use folio_server::db::{MemoryMessageStore, MemoryProjectStore};
use folio_server::middleware::{SESSION_COOKIE_NAME, SessionSettings};
use folio_server::routes::{self, ActionResponse};
use folio_server::state::{AppState, Components};
use folio_server::storage::MemoryBlobStore;

/// Admin secret the test app accepts.
pub const ADMIN_SECRET: &str = "integration-admin-secret";

/// Public URL prefix of the in-memory blob store.
pub const BLOB_BASE_URL: &str = "https://blobs.test";

const SESSION_SECRET_BYTES: usize = 64;

/// A router wired to in-memory backends the test can inspect.
pub struct TestApp {
    pub router: Router,
    pub projects: Arc<MemoryProjectStore>,
    pub messages: Arc<MemoryMessageStore>,
    pub blobs: Arc<MemoryBlobStore>,
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

impl TestApp {
    /// App with a 1 MiB upload limit.
    #[must_use]
    pub fn new() -> Self {
        Self::with_upload_limit(1024 * 1024)
    }

    #[must_use]
    pub fn with_upload_limit(upload_limit_bytes: usize) -> Self {
        let projects = Arc::new(MemoryProjectStore::new());
        let messages = Arc::new(MemoryMessageStore::new());
        let blobs = Arc::new(MemoryBlobStore::new(BLOB_BASE_URL));

        let state = AppState::from_components(Components {
            project_store: projects.clone(),
            message_store: messages.clone(),
            blob_store: blobs.clone(),
            admin_secret: SecretString::from(ADMIN_SECRET),
            upload_limit_bytes,
        });

        let settings = SessionSettings::new(
            &SecretString::from("s".repeat(SESSION_SECRET_BYTES)),
            false,
        )
        .expect("valid session key");

        Self {
            router: routes::app(state, MemoryStore::default(), &settings),
            projects,
            messages,
            blobs,
        }
    }

    /// Send a request through the router.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("readable body");

        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// GET `uri`, optionally with a session cookie.
    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> TestResponse {
        self.send(request("GET", uri, cookie).body(Body::empty()).expect("request"))
            .await
    }

    /// POST a url-encoded form.
    pub async fn post_form(
        &self,
        uri: &str,
        cookie: Option<&str>,
        fields: &[(&str, &str)],
    ) -> TestResponse {
        let body = fields
            .iter()
            .map(|(k, v)| format!("{}={}", form_encode(k), form_encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        self.send(
            request("POST", uri, cookie)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body))
                .expect("request"),
        )
        .await
    }

    /// POST a multipart form.
    pub async fn post_multipart(
        &self,
        uri: &str,
        cookie: Option<&str>,
        form: MultipartForm,
    ) -> TestResponse {
        let (content_type, body) = form.finish();
        self.send(
            request("POST", uri, cookie)
                .header(header::CONTENT_TYPE, content_type)
                .body(Body::from(body))
                .expect("request"),
        )
        .await
    }

    pub async fn delete(&self, uri: &str, cookie: Option<&str>) -> TestResponse {
        self.send(request("DELETE", uri, cookie).body(Body::empty()).expect("request"))
            .await
    }

    /// Log in with the admin secret and return the session cookie.
    pub async fn admin_cookie(&self) -> String {
        let response = self
            .post_form("/auth/login", None, &[("password", ADMIN_SECRET)])
            .await;
        assert_eq!(response.status, StatusCode::OK);
        response.session_cookie().expect("login sets a cookie")
    }

    /// Enter demo mode and return the session cookie.
    pub async fn demo_cookie(&self) -> String {
        let response = self.post_form("/auth/demo", None, &[]).await;
        assert_eq!(response.status, StatusCode::SEE_OTHER);
        response.session_cookie().expect("demo sets a cookie")
    }

    /// Role the app reports for `cookie`.
    pub async fn role(&self, cookie: Option<&str>) -> Role {
        let response = self.get("/api/session", cookie).await;
        assert_eq!(response.status, StatusCode::OK);
        let info: serde_json::Value = response.json();
        serde_json::from_value(info["role"].clone()).expect("role")
    }
}

fn request(method: &str, uri: &str, cookie: Option<&str>) -> axum::http::request::Builder {
    let builder = Request::builder().method(method).uri(uri);
    match cookie {
        Some(cookie) => builder.header(header::COOKIE, cookie),
        None => builder,
    }
}

fn form_encode(value: &str) -> String {
    value
        .bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                char::from(b).to_string()
            }
            b' ' => "+".to_string(),
            _ => format!("%{b:02X}"),
        })
        .collect()
}

/// A buffered response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn json<T: DeserializeOwned>(&self) -> T {
        serde_json::from_slice(&self.body).expect("JSON body")
    }

    pub fn action(&self) -> ActionResponse {
        self.json()
    }

    /// `name=value` of the session cookie set by this response, if any.
    #[must_use]
    pub fn session_cookie(&self) -> Option<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .filter_map(|v| v.split(';').next())
            .find(|pair| pair.starts_with(&format!("{SESSION_COOKIE_NAME}=")))
            .map(str::to_string)
    }

    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }
}

/// Hand-built `multipart/form-data` body.
#[derive(Debug)]
pub struct MultipartForm {
    boundary: String,
    body: Vec<u8>,
}

impl Default for MultipartForm {
    fn default() -> Self {
        Self::new()
    }
}

impl MultipartForm {
    #[must_use]
    pub fn new() -> Self {
        Self {
            boundary: "folio-test-boundary".to_string(),
            body: Vec::new(),
        }
    }

    #[must_use]
    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n",
                self.boundary
            )
            .as_bytes(),
        );
        self
    }

    #[must_use]
    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, data: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n",
                self.boundary
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(data);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    /// Content-Type header value and body bytes.
    #[must_use]
    pub fn finish(mut self) -> (String, Vec<u8>) {
        self.body
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        (
            format!("multipart/form-data; boundary={}", self.boundary),
            self.body,
        )
    }
}

/// A valid project form with the given cover bytes and no gallery.
#[must_use]
pub fn project_form(cover: &[u8]) -> MultipartForm {
    MultipartForm::new()
        .text("title", "Folio")
        .text("description", "Portfolio content API")
        .text("project_type", "web")
        .text("demo_link", "https://folio.test")
        .text("repo_link", "")
        .text("tags", "React,  Python ,,Docker")
        .file("cover", "cover.png", "image/png", cover)
}
