//! Login, demo mode, logout, and health checks.

use axum::http::StatusCode;

use folio_core::Role;
use folio_integration_tests::{ADMIN_SECRET, TestApp};

#[tokio::test]
async fn anonymous_caller_has_no_role() {
    let app = TestApp::new();
    assert_eq!(app.role(None).await, Role::None);
}

#[tokio::test]
async fn correct_password_grants_admin() {
    let app = TestApp::new();
    let response = app
        .post_form("/auth/login", None, &[("password", ADMIN_SECRET)])
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.action().success);

    let cookie = response.session_cookie().expect("session cookie");
    assert_eq!(app.role(Some(&cookie)).await, Role::Admin);
}

#[tokio::test]
async fn wrong_password_fails_and_keeps_role() {
    let app = TestApp::new();
    let demo = app.demo_cookie().await;

    let response = app
        .post_form("/auth/login", Some(&demo), &[("password", "wrong")])
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    let action = response.action();
    assert!(!action.success);
    assert!(!action.message.is_empty());
    assert_eq!(app.role(Some(&demo)).await, Role::Demo);
}

#[tokio::test]
async fn login_from_demo_clears_demo() {
    let app = TestApp::new();
    let demo = app.demo_cookie().await;

    let response = app
        .post_form("/auth/login", Some(&demo), &[("password", ADMIN_SECRET)])
        .await;
    let cookie = response.session_cookie().expect("rotated cookie");

    assert_eq!(app.role(Some(&cookie)).await, Role::Admin);
}

#[tokio::test]
async fn demo_redirects_to_admin() {
    let app = TestApp::new();
    let response = app.post_form("/auth/demo", None, &[]).await;

    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/admin"));

    let cookie = response.session_cookie().expect("session cookie");
    assert_eq!(app.role(Some(&cookie)).await, Role::Demo);
}

#[tokio::test]
async fn demo_keeps_existing_admin() {
    let app = TestApp::new();
    let admin = app.admin_cookie().await;

    let response = app.post_form("/auth/demo", Some(&admin), &[]).await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);

    assert_eq!(app.role(Some(&admin)).await, Role::Admin);
}

#[tokio::test]
async fn logout_clears_role_and_redirects_home() {
    let app = TestApp::new();
    let admin = app.admin_cookie().await;

    let response = app.post_form("/auth/logout", Some(&admin), &[]).await;

    assert_eq!(response.status, StatusCode::SEE_OTHER);
    assert_eq!(response.location(), Some("/"));
    assert_eq!(app.role(Some(&admin)).await, Role::None);
}

#[tokio::test]
async fn health_endpoints() {
    let app = TestApp::new();

    let response = app.get("/health", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(&response.body[..], b"ok");

    assert_eq!(app.get("/health/ready", None).await.status, StatusCode::OK);

    app.projects.set_offline(true);
    assert_eq!(
        app.get("/health/ready", None).await.status,
        StatusCode::SERVICE_UNAVAILABLE
    );
}
