//! Contact form and inbox.

use axum::http::StatusCode;
use serde_json::Value;

use folio_integration_tests::TestApp;

async fn send_message(app: &TestApp, subject: &str) {
    let response = app
        .post_form(
            "/api/messages",
            None,
            &[
                ("name", "Ada Lovelace"),
                ("email", "ada@example.com"),
                ("subject", subject),
                ("message", "Let's work together."),
            ],
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert!(response.action().success);
}

#[tokio::test]
async fn anyone_can_send_a_message() {
    let app = TestApp::new();
    send_message(&app, "").await;

    let admin = app.admin_cookie().await;
    let inbox: Vec<Value> = app.get("/api/messages", Some(&admin)).await.json();

    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0]["subject"], "General");
    assert_eq!(inbox[0]["content"], "Let's work together.");
}

#[tokio::test]
async fn missing_fields_are_rejected() {
    let app = TestApp::new();
    let response = app
        .post_form("/api/messages", None, &[("name", "Ada")])
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.action().message,
        "Please fill in all required fields."
    );
}

#[tokio::test]
async fn inbox_requires_a_role() {
    let app = TestApp::new();
    send_message(&app, "Hiring").await;

    assert_eq!(
        app.get("/api/messages", None).await.status,
        StatusCode::FORBIDDEN
    );

    let demo = app.demo_cookie().await;
    let inbox: Vec<Value> = app.get("/api/messages", Some(&demo)).await.json();
    assert_eq!(inbox.len(), 1);
}

#[tokio::test]
async fn inbox_is_newest_first() {
    let app = TestApp::new();
    send_message(&app, "first").await;
    send_message(&app, "second").await;

    let admin = app.admin_cookie().await;
    let inbox: Vec<Value> = app.get("/api/messages", Some(&admin)).await.json();

    assert_eq!(inbox[0]["subject"], "second");
    assert_eq!(inbox[1]["subject"], "first");
}

#[tokio::test]
async fn only_admin_can_delete_messages() {
    let app = TestApp::new();
    send_message(&app, "Hiring").await;
    let demo = app.demo_cookie().await;
    let admin = app.admin_cookie().await;

    let response = app.delete("/api/messages/1", Some(&demo)).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app.delete("/api/messages/1", Some(&admin)).await;
    assert_eq!(response.status, StatusCode::OK);

    let inbox: Vec<Value> = app.get("/api/messages", Some(&admin)).await.json();
    assert!(inbox.is_empty());
}
