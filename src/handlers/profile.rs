use axum::{extract::State, Extension, Json};
use serde_json::{json, Value};

use crate::auth::password;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::models::{ChangePasswordRequest, UpdateProfileRequest, UserProfile};
use crate::state::AppState;

const PROFILE_COLUMNS: &str =
    "id, username, email, role, first_name, last_name, phone, created_at, updated_at";

/// GET /api/v1/user/profile
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<UserProfile>, ApiError> {
    let profile: Option<UserProfile> =
        sqlx::query_as(&format!("SELECT {} FROM users WHERE id = $1", PROFILE_COLUMNS))
            .bind(user.user_id)
            .fetch_optional(&state.db)
            .await?;

    profile.map(Json).ok_or_else(|| ApiError::not_found("User not found"))
}

/// PUT /api/v1/user/profile
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<Value>, ApiError> {
    if payload.email.is_empty() {
        return Err(ApiError::bad_request("Email is required"));
    }

    // A duplicate email trips the unique constraint and maps to 409.
    sqlx::query(
        "UPDATE users SET first_name = $1, last_name = $2, phone = $3, email = $4, \
         updated_at = NOW() WHERE id = $5",
    )
    .bind(&payload.first_name)
    .bind(&payload.last_name)
    .bind(&payload.phone)
    .bind(&payload.email)
    .bind(user.user_id)
    .execute(&state.db)
    .await?;

    Ok(Json(json!({ "message": "Profile updated successfully" })))
}

/// PUT /api/v1/user/password
pub async fn change_password(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<Value>, ApiError> {
    if payload.current_password.is_empty() || payload.new_password.is_empty() {
        return Err(ApiError::bad_request(
            "Current and new password are required",
        ));
    }

    let current_hash: String = sqlx::query_scalar("SELECT password_hash FROM users WHERE id = $1")
        .bind(user.user_id)
        .fetch_one(&state.db)
        .await?;

    if !password::verify_password(&payload.current_password, &current_hash) {
        return Err(ApiError::unauthorized("Current password is incorrect"));
    }

    let new_hash = password::hash_password(&payload.new_password)?;

    sqlx::query("UPDATE users SET password_hash = $1, updated_at = NOW() WHERE id = $2")
        .bind(&new_hash)
        .bind(user.user_id)
        .execute(&state.db)
        .await?;

    Ok(Json(json!({ "message": "Password changed successfully" })))
}
