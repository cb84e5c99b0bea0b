//! End-to-end integration tests for the blocklab HTTP API.
//!
//! Tests exercise the full stack: HTTP request -> axum router -> handler ->
//! ProjectService / SandboxSet -> HTTP response.
//!
//! Each test creates a fresh AppState over a private in-memory database and
//! sends requests with `tower::ServiceExt::oneshot`, without starting a
//! network server. Execution tests swap in a scripted sandbox so they do not
//! depend on a local node or python installation.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{DateTime, Utc};
use serde_json::json;
use tower::ServiceExt;

use blocklab_sandbox::{ExecutionResult, Sandbox, SandboxSet};
use blocklab_server::router::build_router;
use blocklab_server::service::ProjectService;
use blocklab_server::state::AppState;
use blocklab_storage::Language;

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

/// Echoes the source back as output; `fail:` prefixed source becomes an error.
struct EchoSandbox(Language);

#[async_trait]
impl Sandbox for EchoSandbox {
    fn language(&self) -> Language {
        self.0
    }

    async fn execute(&self, source: &str) -> ExecutionResult {
        match source.strip_prefix("fail:") {
            Some(message) => ExecutionResult::failure(message),
            None => ExecutionResult::new(format!("{}:{}", self.0, source), ""),
        }
    }
}

fn echo_sandboxes() -> SandboxSet {
    SandboxSet::new(
        Arc::new(EchoSandbox(Language::JavaScript)),
        Arc::new(EchoSandbox(Language::Python)),
    )
}

/// Creates a fresh router backed by a private in-memory database.
fn test_app() -> Router {
    let service = ProjectService::in_memory().expect("failed to create in-memory service");
    build_router(AppState::with_parts(service, echo_sandboxes()))
}

/// Sends a request with an optional JSON body and returns (status, json).
async fn send(
    app: &Router,
    method: &str,
    path: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let builder = Request::builder().method(method).uri(path);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap_or(json!(null));
    (status, json)
}

async fn post_json(
    app: &Router,
    path: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    send(app, "POST", path, Some(body)).await
}

async fn put_json(
    app: &Router,
    path: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    send(app, "PUT", path, Some(body)).await
}

async fn get_json(app: &Router, path: &str) -> (StatusCode, serde_json::Value) {
    send(app, "GET", path, None).await
}

async fn delete(app: &Router, path: &str) -> (StatusCode, serde_json::Value) {
    send(app, "DELETE", path, None).await
}

/// Creates a project and returns its JSON body.
async fn create_project(app: &Router, name: &str, language: &str) -> serde_json::Value {
    let (status, body) = post_json(
        app,
        "/projects",
        json!({
            "name": name,
            "language": language,
            "diagram": "<xml><block type=\"text_print\"/></xml>",
            "generatedCode": "console.log('hi');"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create project failed: {:?}", body);
    body
}

fn stamp(value: &serde_json::Value) -> DateTime<Utc> {
    value.as_str().unwrap().parse().unwrap()
}

fn assert_error(body: &serde_json::Value, code: &str) {
    assert_eq!(body["success"], json!(false), "not an error body: {:?}", body);
    assert_eq!(body["error"]["code"], json!(code), "unexpected error: {:?}", body);
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_then_get_returns_stored_fields() {
    let app = test_app();
    let created = create_project(&app, "Hello", "javascript").await;

    let id = created["id"].as_str().unwrap();
    assert!(!id.is_empty());
    assert!(created["createdAt"].is_string());
    assert_eq!(created["createdAt"], created["updatedAt"]);

    let (status, fetched) = get_json(&app, &format!("/projects/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);
    assert_eq!(fetched["name"], json!("Hello"));
    assert_eq!(fetched["language"], json!("javascript"));
    assert_eq!(fetched["generatedCode"], json!("console.log('hi');"));
}

#[tokio::test]
async fn create_accepts_blockly_xml_and_defaults_code() {
    let app = test_app();
    let (status, body) = post_json(
        &app,
        "/projects",
        json!({ "name": "p", "language": "python", "blocklyXml": "<xml/>" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["diagram"], json!("<xml/>"));
    assert_eq!(body["generatedCode"], json!(""));
}

#[tokio::test]
async fn create_ignores_client_supplied_identity() {
    let app = test_app();
    let (status, body) = post_json(
        &app,
        "/projects",
        json!({
            "id": "00000000-0000-0000-0000-000000000000",
            "createdAt": "2000-01-01T00:00:00Z",
            "name": "p",
            "language": "python",
            "diagram": "<xml/>"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_ne!(body["id"], json!("00000000-0000-0000-0000-000000000000"));
    assert_ne!(body["createdAt"], json!("2000-01-01T00:00:00Z"));
}

#[tokio::test]
async fn create_with_missing_fields_is_bad_request() {
    let app = test_app();
    let (status, body) = post_json(&app, "/projects", json!({ "name": "only a name" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error(&body, "BAD_REQUEST");
    assert_eq!(body["error"]["message"], json!("Missing required project fields"));

    let (_, listed) = get_json(&app, "/projects").await;
    assert_eq!(listed, json!([]));
}

#[tokio::test]
async fn create_with_unknown_language_is_bad_request() {
    let app = test_app();
    let (status, body) = post_json(
        &app,
        "/projects",
        json!({ "name": "p", "language": "cobol", "diagram": "<xml/>" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error(&body, "BAD_REQUEST");
}

#[tokio::test]
async fn malformed_json_body_uses_error_envelope() {
    let app = test_app();
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/projects")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_error(&body, "BAD_REQUEST");
}

#[tokio::test]
async fn listing_is_newest_first() {
    let app = test_app();
    for name in ["first", "second", "third"] {
        create_project(&app, name, "javascript").await;
    }

    let (status, body) = get_json(&app, "/projects").await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["third", "second", "first"]);
}

#[tokio::test]
async fn rename_touches_only_name_and_updated_at() {
    let app = test_app();
    let created = create_project(&app, "before", "python").await;
    let path = format!("/projects/{}", created["id"].as_str().unwrap());

    let (status, updated) = put_json(&app, &path, json!({ "name": "X" })).await;
    assert_eq!(status, StatusCode::OK, "update failed: {:?}", updated);
    assert_eq!(updated["name"], json!("X"));
    for field in ["id", "language", "diagram", "generatedCode", "createdAt"] {
        assert_eq!(updated[field], created[field], "{} changed", field);
    }

    assert!(
        stamp(&updated["updatedAt"]) > stamp(&created["updatedAt"]),
        "updatedAt did not advance"
    );

    let (_, fetched) = get_json(&app, &path).await;
    assert_eq!(fetched, updated);
}

#[tokio::test]
async fn empty_update_still_advances_updated_at() {
    let app = test_app();
    let created = create_project(&app, "p", "javascript").await;
    let path = format!("/projects/{}", created["id"].as_str().unwrap());

    let (status, updated) = put_json(&app, &path, json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert!(stamp(&updated["updatedAt"]) > stamp(&created["updatedAt"]));
    assert_eq!(updated["name"], created["name"]);
}

#[tokio::test]
async fn update_can_switch_language_and_code() {
    let app = test_app();
    let created = create_project(&app, "p", "javascript").await;
    let path = format!("/projects/{}", created["id"].as_str().unwrap());

    let (status, updated) = put_json(
        &app,
        &path,
        json!({ "language": "python", "generatedCode": "print('hi')" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["language"], json!("python"));
    assert_eq!(updated["generatedCode"], json!("print('hi')"));
    assert_eq!(updated["diagram"], created["diagram"]);
}

#[tokio::test]
async fn update_with_blank_name_is_rejected() {
    let app = test_app();
    let created = create_project(&app, "p", "javascript").await;
    let path = format!("/projects/{}", created["id"].as_str().unwrap());

    let (status, body) = put_json(&app, &path, json!({ "name": "" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error(&body, "BAD_REQUEST");

    let (_, fetched) = get_json(&app, &path).await;
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn delete_then_get_is_not_found() {
    let app = test_app();
    let created = create_project(&app, "doomed", "javascript").await;
    let path = format!("/projects/{}", created["id"].as_str().unwrap());

    let (status, body) = delete(&app, &path).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));

    let (status, body) = get_json(&app, &path).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_error(&body, "NOT_FOUND");

    let (status, _) = delete(&app, &path).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_id_is_not_found_everywhere() {
    let app = test_app();
    let path = "/projects/6f1c1f2e-8a4b-4d8e-9c61-1f3b5e0f6a7d";

    assert_eq!(get_json(&app, path).await.0, StatusCode::NOT_FOUND);
    assert_eq!(
        put_json(&app, path, json!({ "name": "x" })).await.0,
        StatusCode::NOT_FOUND
    );
    assert_eq!(delete(&app, path).await.0, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_id_is_invalid_identifier() {
    let app = test_app();
    for (status, body) in [
        get_json(&app, "/projects/not-a-uuid").await,
        put_json(&app, "/projects/not-a-uuid", json!({ "name": "x" })).await,
        delete(&app, "/projects/not-a-uuid").await,
    ] {
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_error(&body, "INVALID_IDENTIFIER");
    }
}

// ---------------------------------------------------------------------------
// Execution
// ---------------------------------------------------------------------------

#[tokio::test]
async fn execute_dispatches_by_language() {
    let app = test_app();
    let (status, body) = post_json(
        &app,
        "/execute",
        json!({ "language": "python", "code": "print(1)" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "output": "python:print(1)", "error": "" }));

    let (_, body) = post_json(
        &app,
        "/execute",
        json!({ "language": "javascript", "code": "x" }),
    )
    .await;
    assert_eq!(body["output"], json!("javascript:x"));
}

#[tokio::test]
async fn program_failure_is_a_successful_response() {
    let app = test_app();
    let (status, body) = post_json(
        &app,
        "/execute",
        json!({ "language": "javascript", "code": "fail:Error: boom" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "output": "", "error": "Error: boom" }));
}

#[tokio::test]
async fn execute_rejects_blank_code_and_unknown_language() {
    let app = test_app();
    for language in ["javascript", "python"] {
        let (status, body) = post_json(
            &app,
            "/execute",
            json!({ "language": language, "code": "   \n" }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_error(&body, "BAD_REQUEST");
    }

    let (status, _) = post_json(
        &app,
        "/execute",
        json!({ "language": "brainfuck", "code": "+" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
