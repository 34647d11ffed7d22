use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use jsonwebtoken::Algorithm;
use serde_json::{Value, json};
use sqlx::SqlitePool;
use tower::ServiceExt;

use todo_api::api::router;
use todo_api::auth::TokenService;
use todo_api::config::AuthConfig;
use todo_api::db::connect_in_memory;
use todo_api::state::AppState;

async fn setup_app() -> Router {
    setup_app_with_db().await.0
}

async fn setup_app_with_db() -> (Router, SqlitePool) {
    let pool = connect_in_memory().await.expect("Failed to create test db");
    let tokens = TokenService::new(AuthConfig {
        access_secret: "access-secret".to_string(),
        refresh_secret: "refresh-secret".to_string(),
        algorithm: Algorithm::HS256,
        access_token_expire_minutes: 15,
        refresh_token_expire_minutes: 60,
    });
    let app = router(AppState {
        db: pool.clone(),
        tokens: Arc::new(tokens),
    });
    (app, pool)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("Request failed");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("Body is not JSON")
    };
    (status, body)
}

fn empty(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn json_post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health() {
    let app = setup_app().await;
    let (status, _) = send(&app, empty(Method::GET, "/health")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_todo_lifecycle() {
    let app = setup_app().await;

    let (status, body) = send(&app, empty(Method::POST, "/create?text=Buy%20milk")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "todo added": "Buy milk" }));

    let (_, body) = send(&app, empty(Method::GET, "/todo")).await;
    assert_eq!(body, json!([{ "id": 1, "text": "Buy milk", "is_done": false }]));

    let (status, body) = send(&app, empty(Method::PATCH, "/update/1?is_complete=true")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "todo updated": 1 }));

    let (_, body) = send(&app, empty(Method::GET, "/done")).await;
    assert_eq!(body, json!([{ "id": 1, "text": "Buy milk", "is_done": true }]));

    let (status, body) = send(&app, empty(Method::DELETE, "/delete/1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "todo deleted": 1 }));

    let (_, body) = send(&app, empty(Method::GET, "/todo")).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_done_filters_and_update_keeps_unsupplied_fields() {
    let app = setup_app().await;
    send(&app, empty(Method::POST, "/create?text=Buy%20milk&is_complete=true")).await;
    send(&app, empty(Method::POST, "/create?text=Wash%20dishes")).await;

    let (status, _) = send(&app, empty(Method::PATCH, "/update/2?text=Dry%20dishes")).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, empty(Method::GET, "/todo")).await;
    assert_eq!(
        body,
        json!([
            { "id": 1, "text": "Buy milk", "is_done": true },
            { "id": 2, "text": "Dry dishes", "is_done": false }
        ])
    );

    send(&app, empty(Method::PATCH, "/update/1?is_complete=false")).await;
    let (_, body) = send(&app, empty(Method::GET, "/done")).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_missing_todo() {
    let app = setup_app().await;

    let (status, body) = send(&app, empty(Method::PATCH, "/update/7?text=x")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "message": "Todo not found" }));

    let (status, body) = send(&app, empty(Method::DELETE, "/delete/7")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "message": "Todo not found" }));
}

#[tokio::test]
async fn test_create_with_empty_text() {
    let app = setup_app().await;

    let (status, body) = send(&app, empty(Method::POST, "/create?text=")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Text cannot be empty." }));

    let (_, body) = send(&app, empty(Method::GET, "/todo")).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_create_keeps_whitespace_text() {
    let app = setup_app().await;

    let (status, body) = send(&app, empty(Method::POST, "/create?text=%20")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "todo added": " " }));

    let (_, body) = send(&app, empty(Method::GET, "/todo")).await;
    assert_eq!(body, json!([{ "id": 1, "text": " ", "is_done": false }]));
}

#[tokio::test]
async fn test_bad_input_is_reported_as_json() {
    let app = setup_app().await;

    let (status, body) = send(&app, empty(Method::POST, "/create")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("text"));

    let (status, body) = send(&app, empty(Method::PATCH, "/update/1?is_complete=maybe")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = send(&app, empty(Method::DELETE, "/delete/abc")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let malformed = Request::builder()
        .method(Method::POST)
        .uri("/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&app, malformed).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_persistence_failure_is_reported_as_json() {
    let (app, pool) = setup_app_with_db().await;
    send(&app, empty(Method::POST, "/create?text=Buy%20milk")).await;

    sqlx::query(
        "CREATE TRIGGER reject_delete BEFORE DELETE ON todos \
         BEGIN SELECT RAISE(ABORT, 'delete rejected'); END",
    )
    .execute(&pool)
    .await
    .expect("Failed to create trigger");

    let (status, body) = send(&app, empty(Method::DELETE, "/delete/1")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("delete rejected"));

    let (status, body) = send(&app, empty(Method::GET, "/todo")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([{ "id": 1, "text": "Buy milk", "is_done": false }]));
}

#[tokio::test]
async fn test_signup_login_me_refresh() {
    let app = setup_app().await;
    let creds = json!({ "username": "alice", "password": "wonderland" });

    let (status, body) = send(&app, json_post("/signup", creds.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({ "id": 1, "username": "alice" }));

    let (status, _) = send(&app, json_post("/signup", creds.clone())).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(&app, json_post("/login", creds)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "bearer");
    let access = body["access_token"].as_str().unwrap().to_string();
    let refresh = body["refresh_token"].as_str().unwrap().to_string();

    let me = Request::builder()
        .uri("/me")
        .header(header::AUTHORIZATION, format!("Bearer {}", access))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, me).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "username": "alice" }));

    let (status, body) =
        send(&app, json_post("/refresh", json!({ "refresh_token": refresh }))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["access_token"].is_string());

    let (status, _) = send(&app, json_post("/refresh", json!({ "refresh_token": access }))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_bad_login_and_missing_token() {
    let app = setup_app().await;
    send(
        &app,
        json_post("/signup", json!({ "username": "alice", "password": "wonderland" })),
    )
    .await;

    let (status, body) = send(
        &app,
        json_post("/login", json!({ "username": "alice", "password": "nope" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "error": "Incorrect username or password" }));

    let (status, _) = send(&app, empty(Method::GET, "/me")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let garbage = Request::builder()
        .uri("/me")
        .header(header::AUTHORIZATION, "Bearer garbage")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, garbage).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
