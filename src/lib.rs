pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod query;
pub mod state;

use axum::{
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{require_admin, require_auth, require_guard_or_admin};
use crate::state::AppState;

/// Build the full application router. Route groups mirror the access
/// tiers: public, authenticated, guard+admin, admin.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(public_routes())
        .merge(user_routes(state.clone()))
        .merge(item_routes(state.clone()))
        .merge(guard_routes(state.clone()))
        .merge(admin_routes(state.clone()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    use handlers::{auth, items};

    Router::new()
        .route("/api/v1/auth/register", post(auth::register))
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/items", get(items::list_items))
        .route("/api/v1/items/search", get(items::search_items))
        .route("/api/v1/items/:id", get(items::get_item))
}

fn user_routes(state: AppState) -> Router<AppState> {
    use handlers::{items, messages, profile, reports};

    Router::new()
        .route(
            "/api/v1/user/profile",
            get(profile::get_profile).put(profile::update_profile),
        )
        .route("/api/v1/user/password", put(profile::change_password))
        .route("/api/v1/user/items", get(items::my_items))
        .route("/api/v1/user/messages", post(messages::send_message))
        .route("/api/v1/user/messages/unread", get(messages::unread_count))
        .route(
            "/api/v1/user/messages/conversations",
            get(messages::conversations),
        )
        .route("/api/v1/user/messages/:id", get(messages::thread))
        .route("/api/v1/user/reports", post(reports::create_report))
        .route_layer(axum::middleware::from_fn_with_state(state, require_auth))
}

fn item_routes(state: AppState) -> Router<AppState> {
    use handlers::items;

    Router::new()
        .route("/api/v1/items/lost", post(items::report_lost))
        .route("/api/v1/items/found", post(items::report_found))
        .route("/api/v1/items/:id/status", put(items::update_status))
        .route("/api/v1/items/:id/image", post(items::attach_image))
        .route_layer(axum::middleware::from_fn_with_state(state, require_auth))
}

fn guard_routes(state: AppState) -> Router<AppState> {
    use handlers::items;

    // Same listing as the public browse route; the gate is the difference.
    Router::new()
        .route("/api/v1/guard/items", get(items::list_items))
        .route_layer(axum::middleware::from_fn(require_guard_or_admin))
        .route_layer(axum::middleware::from_fn_with_state(state, require_auth))
}

fn admin_routes(state: AppState) -> Router<AppState> {
    use handlers::admin;

    Router::new()
        .route("/api/v1/admin/users", get(admin::list_users))
        .route("/api/v1/admin/users/:id/role", put(admin::update_role))
        .route("/api/v1/admin/reports", get(admin::list_reports))
        .route(
            "/api/v1/admin/reports/:id/status",
            put(admin::update_report_status),
        )
        .route("/api/v1/admin/stats", get(admin::stats))
        .route_layer(axum::middleware::from_fn(require_admin))
        .route_layer(axum::middleware::from_fn_with_state(state, require_auth))
}

async fn health(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> (axum::http::StatusCode, Json<Value>) {
    match db::health_check(&state.db).await {
        Ok(()) => (
            axum::http::StatusCode::OK,
            Json(json!({ "status": "ok", "message": "Campus Lost and Found API is running" })),
        ),
        Err(err) => {
            tracing::error!("health check failed: {}", err);
            (
                axum::http::StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "degraded", "error": "database unavailable" })),
            )
        }
    }
}
