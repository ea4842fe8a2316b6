use axum::{
    body::Body,
    http::{header::AUTHORIZATION, Method, Request, StatusCode},
    Router,
};
use linkup::{build_router, TomlConfig};
use serde_json::Value;
use tower::ServiceExt; // for oneshot

const CONFIG: &str = r#"
[[users]]
id = "u-alice"
first_name = "Alice"
last_name = "Doe"
token = "alice-token"

[[users]]
id = "u-bob"
first_name = "Bob"
last_name = "Roe"
token = "bob-token"

[[users]]
id = "u-carol"
first_name = "Carol"
token = "carol-token"
"#;

fn app() -> Router {
    let config = TomlConfig::from_toml_str(CONFIG).unwrap();
    build_router(&config)
}

async fn call(app: &Router, method: Method, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
    }
    let response = app
        .clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

async fn send(app: &Router, token: &str, status: &str, user_id: &str) -> (StatusCode, Value) {
    let uri = format!("/connection/{}/{}", status, user_id);
    call(app, Method::POST, &uri, Some(token)).await
}

async fn review(app: &Router, token: &str, status: &str, request_id: &str) -> (StatusCode, Value) {
    let uri = format!("/connection/review/{}/{}", status, request_id);
    call(app, Method::POST, &uri, Some(token)).await
}

async fn pending_request_id(app: &Router, token: &str) -> String {
    let (status, body) = call(app, Method::GET, "/user/requests/received", Some(token)).await;
    assert_eq!(status, StatusCode::OK);
    body["data"][0]["request"]["id"]
        .as_str()
        .expect("a pending request")
        .to_string()
}

#[tokio::test]
async fn test_health_needs_no_auth() {
    let app = app();
    let (status, body) = call(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_missing_or_unknown_token_is_rejected() {
    let app = app();

    let (status, body) = call(&app, Method::POST, "/connection/interested/u-bob", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "unauthorized");

    let (status, _) = send(&app, "forged", "interested", "u-bob").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_lowercase_bearer_scheme_is_accepted() {
    let app = app();
    let request = Request::builder()
        .method(Method::GET)
        .uri("/user/connections")
        .header(AUTHORIZATION, "bearer alice-token")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_send_interested_request() {
    let app = app();

    let (status, body) = send(&app, "alice-token", "interested", "u-bob").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "you are interested Bob's account");
    assert!(body.get("data").is_none());
}

#[tokio::test]
async fn test_duplicate_in_either_direction_is_reported() {
    let app = app();

    send(&app, "alice-token", "interested", "u-bob").await;

    let (status, body) = send(&app, "alice-token", "interested", "u-bob").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "connection was made before");

    let (status, body) = send(&app, "bob-token", "interested", "u-alice").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "connection was made before");

    // the surviving record still points alice -> bob
    let (_, body) = call(&app, Method::GET, "/user/requests/received", Some("bob-token")).await;
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["request"]["fromUserId"], "u-alice");
    assert_eq!(data[0]["fromUser"]["firstName"], "Alice");

    let (_, body) = call(&app, Method::GET, "/user/requests/received", Some("alice-token")).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_send_rejects_bad_input() {
    let app = app();

    let (status, body) = send(&app, "alice-token", "accepted", "u-bob").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_status");

    let (status, body) = send(&app, "alice-token", "interested", "u-nobody").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "user_not_found");

    let (status, body) = send(&app, "alice-token", "interested", "u-alice").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "self_connection");

    let (_, body) = call(&app, Method::GET, "/user/requests/received", Some("bob-token")).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_accept_then_second_review_fails() {
    let app = app();
    send(&app, "alice-token", "interested", "u-bob").await;
    let request_id = pending_request_id(&app, "bob-token").await;

    let (status, body) = review(&app, "bob-token", "accepted", &request_id).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "connection accepted");
    assert_eq!(body["data"]["id"], request_id.as_str());
    assert_eq!(body["data"]["status"], "accepted");
    assert_eq!(body["data"]["toUserId"], "u-bob");

    let (status, body) = review(&app, "bob-token", "rejected", &request_id).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "request_not_found");

    let (_, body) = call(&app, Method::GET, "/user/connections", Some("alice-token")).await;
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["id"], "u-bob");
}

#[tokio::test]
async fn test_review_requires_recipient_and_valid_status() {
    let app = app();
    send(&app, "alice-token", "interested", "u-bob").await;
    let request_id = pending_request_id(&app, "bob-token").await;

    let (status, _) = review(&app, "alice-token", "accepted", &request_id).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = review(&app, "carol-token", "accepted", &request_id).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = review(&app, "bob-token", "ignored", &request_id).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_status");

    // still pending after the failed attempts
    assert_eq!(pending_request_id(&app, "bob-token").await, request_id);

    let (status, body) = review(&app, "bob-token", "rejected", &request_id).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "rejected");

    let (_, body) = call(&app, Method::GET, "/user/connections", Some("bob-token")).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_ignored_request_is_not_reviewable() {
    let app = app();

    let (status, body) = send(&app, "carol-token", "ignored", "u-bob").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "you are ignored Bob's account");

    let (_, body) = call(&app, Method::GET, "/user/requests/received", Some("bob-token")).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);

    let (status, _) = review(&app, "bob-token", "accepted", "not-a-request").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
