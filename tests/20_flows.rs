//! End-to-end flows over a real database: registration conflicts, login
//! failures, and filtered pagination. Skipped when `DATABASE_URL` is unset.

mod common;

use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn duplicate_username_registration_conflicts() {
    let Some(app) = common::db_app().await else {
        return;
    };
    let tag = common::unique_tag();

    let body = json!({
        "username": format!("dup_{}", tag),
        "email": format!("dup_{}@campus.edu", tag),
        "password": "hunter2",
    });
    let first = common::send_json(&app, "POST", "/api/v1/auth/register", None, body.clone()).await;
    assert_eq!(first.status(), StatusCode::CREATED);

    // Same username, fresh email: the username check fires.
    let mut retry = body;
    retry["email"] = json!(format!("dup_retry_{}@campus.edu", tag));
    let second = common::send_json(&app, "POST", "/api/v1/auth/register", None, retry).await;
    assert_eq!(second.status(), StatusCode::CONFLICT);
    assert_eq!(
        common::json_body(second).await["error"],
        "Username already exists"
    );
}

#[tokio::test]
async fn wrong_password_login_is_unauthorized() {
    let Some(app) = common::db_app().await else {
        return;
    };
    let tag = common::unique_tag();
    let (username, _token) = common::register_and_login(&app, &tag).await;

    let response = common::send_json(
        &app,
        "POST",
        "/api/v1/auth/login",
        None,
        json!({ "username": username, "password": "wrong-password" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        common::json_body(response).await["error"],
        "Invalid username or password"
    );

    // Unknown username gets the same body; the response does not reveal
    // which part was wrong.
    let response = common::send_json(
        &app,
        "POST",
        "/api/v1/auth/login",
        None,
        json!({ "username": format!("nobody_{}", tag), "password": "hunter2" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        common::json_body(response).await["error"],
        "Invalid username or password"
    );
}

#[tokio::test]
async fn filtered_listing_paginates_with_exact_counts() {
    let Some(app) = common::db_app().await else {
        return;
    };
    let tag = common::unique_tag();
    let (_username, token) = common::register_and_login(&app, &tag).await;

    // A per-run category keeps the filter deterministic on a shared
    // database.
    let category = format!("cat_{}", tag);
    for i in 0..25 {
        let response = common::send_json(
            &app,
            "POST",
            "/api/v1/items/lost",
            Some(&token),
            json!({
                "title": format!("Item {}", i),
                "category": category,
                "location": "Library",
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let uri = format!(
        "/api/v1/items?status=lost&category={}&page=2&limit=10",
        category
    );
    let response = common::get(&app, &uri, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let page = common::json_body(response).await;
    assert_eq!(page["items"].as_array().expect("items array").len(), 10);
    assert_eq!(page["meta"]["total"], 25);
    assert_eq!(page["meta"]["page"], 2);
    assert_eq!(page["meta"]["limit"], 10);
    assert_eq!(page["meta"]["pages"], 3);

    // Last page holds the remainder.
    let uri = format!(
        "/api/v1/items?status=lost&category={}&page=3&limit=10",
        category
    );
    let response = common::get(&app, &uri, None).await;
    let page = common::json_body(response).await;
    assert_eq!(page["items"].as_array().expect("items array").len(), 5);
}
