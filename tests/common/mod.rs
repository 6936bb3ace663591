//! Shared helpers for database-backed integration tests.
//!
//! These tests need a reachable PostgreSQL instance. When `DATABASE_URL`
//! is not set, [`db_app`] returns `None` and each test skips itself, so
//! the rest of the suite stays runnable without a database.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use campus_lostfound_api::config::AppConfig;
use campus_lostfound_api::state::AppState;
use campus_lostfound_api::{app, db};

/// Router over the real database, or `None` when `DATABASE_URL` is unset.
pub async fn db_app() -> Option<Router> {
    let database_url = std::env::var("DATABASE_URL").ok()?;
    let config = AppConfig {
        database_url,
        port: 0,
        jwt_secret: "integration-test-secret".to_string(),
        jwt_expiry_hours: 24,
        max_connections: 5,
        max_page_size: 100,
    };
    let pool = db::connect(&config).await.expect("database connection");
    db::init_schema(&pool).await.expect("schema init");
    Some(app(AppState::new(pool, config)))
}

static COUNTER: AtomicU32 = AtomicU32::new(0);

/// Unique tag per call so runs against a persistent database never collide
/// on unique columns.
pub fn unique_tag() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    format!("{}_{}", nanos, COUNTER.fetch_add(1, Ordering::Relaxed))
}

pub async fn get(app: &Router, uri: &str, token: Option<&str>) -> Response {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = builder.body(Body::empty()).expect("request");
    app.clone().oneshot(request).await.expect("response")
}

pub async fn send_json(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Value,
) -> Response {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = builder.body(Body::from(body.to_string())).expect("request");
    app.clone().oneshot(request).await.expect("response")
}

pub async fn json_body(response: Response) -> Value {
    let bytes = response.into_body().collect().await.expect("body").to_bytes();
    serde_json::from_slice(&bytes).expect("json body")
}

/// Register a fresh student account and log in; returns (username, token).
pub async fn register_and_login(app: &Router, tag: &str) -> (String, String) {
    let username = format!("user_{}", tag);
    let response = send_json(
        app,
        "POST",
        "/api/v1/auth/register",
        None,
        json!({
            "username": username,
            "email": format!("{}@campus.edu", username),
            "password": "hunter2",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = send_json(
        app,
        "POST",
        "/api/v1/auth/login",
        None,
        json!({ "username": username, "password": "hunter2" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let token = json_body(response).await["token"]
        .as_str()
        .expect("token field")
        .to_string();

    (username, token)
}
