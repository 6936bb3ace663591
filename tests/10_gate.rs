//! Authentication and role-gate behavior over the real router.
//!
//! Every request here is rejected (or answered) before any SQL runs, so the
//! pool is a lazy one pointed at a port nothing listens on.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use campus_lostfound_api::auth::{issue_token, Claims};
use campus_lostfound_api::config::AppConfig;
use campus_lostfound_api::models::Role;
use campus_lostfound_api::state::AppState;
use campus_lostfound_api::{app, db};

const SECRET: &str = "integration-test-secret";

fn test_state() -> AppState {
    let config = AppConfig {
        database_url: "postgres://postgres@127.0.0.1:1/lostfound".to_string(),
        port: 0,
        jwt_secret: SECRET.to_string(),
        jwt_expiry_hours: 24,
        max_connections: 1,
        max_page_size: 100,
    };
    let pool = db::connect_lazy(&config).expect("lazy pool");
    AppState::new(pool, config)
}

fn token_for(user_id: i32, role: Role) -> String {
    let claims = Claims::new(user_id, format!("user{}", user_id), role, 24);
    issue_token(SECRET, &claims).expect("token")
}

fn expired_token() -> String {
    let mut claims = Claims::new(1, "user1".to_string(), Role::Student, 24);
    claims.iat -= 90_000;
    claims.exp -= 90_000;
    issue_token(SECRET, &claims).expect("token")
}

async fn send(request: Request<Body>) -> Response {
    app(test_state()).oneshot(request).await.expect("response")
}

async fn error_body(response: Response) -> String {
    let bytes = response.into_body().collect().await.expect("body").to_bytes();
    let json: Value = serde_json::from_slice(&bytes).expect("json body");
    json["error"].as_str().expect("error field").to_string()
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).expect("request")
}

fn send_json(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).expect("request")
}

#[tokio::test]
async fn missing_token_is_unauthorized() {
    let response = send(get("/api/v1/user/profile", None)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        error_body(response).await,
        "Missing or invalid authorization token"
    );
}

#[tokio::test]
async fn non_bearer_scheme_is_unauthorized() {
    let request = Request::builder()
        .method("GET")
        .uri("/api/v1/user/profile")
        .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
        .body(Body::empty())
        .unwrap();
    let response = send(request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn tampered_token_is_unauthorized() {
    let mut token = token_for(1, Role::Admin);
    token.pop();
    token.push('x');
    let response = send(get("/api/v1/admin/stats", Some(&token))).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(error_body(response).await.starts_with("Unauthorized:"));
}

#[tokio::test]
async fn expired_token_is_unauthorized() {
    let token = expired_token();
    let response = send(get("/api/v1/user/items", Some(&token))).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(error_body(response).await, "Unauthorized: token expired");
}

#[tokio::test]
async fn wrong_secret_token_is_unauthorized() {
    let claims = Claims::new(1, "user1".to_string(), Role::Admin, 24);
    let token = issue_token("some-other-secret", &claims).unwrap();
    let response = send(get("/api/v1/admin/users", Some(&token))).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn student_cannot_reach_admin_routes() {
    let token = token_for(7, Role::Student);
    let response = send(get("/api/v1/admin/users", Some(&token))).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(error_body(response).await, "Admin access required");
}

#[tokio::test]
async fn guard_cannot_reach_admin_routes() {
    let token = token_for(8, Role::Guard);
    let response = send(get("/api/v1/admin/reports", Some(&token))).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn student_cannot_reach_guard_routes() {
    let token = token_for(7, Role::Student);
    let response = send(get("/api/v1/guard/items", Some(&token))).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(error_body(response).await, "Guard or admin access required");
}

// Authentication is checked before the role, so an anonymous request to a
// role-gated route gets 401, never 403.
#[tokio::test]
async fn missing_token_on_admin_route_is_unauthorized_not_forbidden() {
    let response = send(get("/api/v1/admin/stats", None)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// An admin token passes both gates: this request reaches the handler and is
// rejected there (self role change), proving the chain admits it.
#[tokio::test]
async fn admin_token_passes_both_gates() {
    let token = token_for(3, Role::Admin);
    let request = send_json(
        "PUT",
        "/api/v1/admin/users/3/role",
        Some(&token),
        serde_json::json!({ "role": "guard" }),
    );
    let response = send(request).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(error_body(response).await, "Cannot change your own role");
}

// A valid student token passes the auth gate on user routes: the request
// reaches handler validation.
#[tokio::test]
async fn student_token_reaches_handlers() {
    let token = token_for(7, Role::Student);
    let request = send_json(
        "POST",
        "/api/v1/items/lost",
        Some(&token),
        serde_json::json!({ "title": "", "category": "", "location": "" }),
    );
    let response = send(request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        error_body(response).await,
        "Title, category, and location are required"
    );
}

#[tokio::test]
async fn invalid_status_is_rejected_before_lookup() {
    let token = token_for(7, Role::Student);
    let request = send_json(
        "PUT",
        "/api/v1/items/5/status",
        Some(&token),
        serde_json::json!({ "status": "vanished" }),
    );
    let response = send(request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        error_body(response).await,
        "Invalid status. Must be one of: lost, found, claimed, returned"
    );
}

#[tokio::test]
async fn search_requires_query_term() {
    let response = send(get("/api/v1/items/search", None)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_body(response).await, "Search query is required");
}

#[tokio::test]
async fn register_requires_all_fields() {
    let request = send_json(
        "POST",
        "/api/v1/auth/register",
        None,
        serde_json::json!({ "username": "bob" }),
    );
    let response = send(request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
