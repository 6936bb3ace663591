use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::auth::{self, password, Claims};
use crate::error::ApiError;
use crate::models::{LoginRequest, RegisterRequest, User};
use crate::state::AppState;

/// POST /api/v1/auth/register
///
/// New accounts always start as students; roles are only changed through
/// the admin surface.
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    if payload.username.is_empty() || payload.email.is_empty() || payload.password.is_empty() {
        return Err(ApiError::bad_request(
            "Username, email and password are required",
        ));
    }

    // Explicit pre-checks give distinct messages; the unique constraints
    // remain the backstop against the insert race.
    let username_taken: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
            .bind(&payload.username)
            .fetch_one(&state.db)
            .await?;
    if username_taken {
        return Err(ApiError::conflict("Username already exists"));
    }

    let email_taken: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(&payload.email)
            .fetch_one(&state.db)
            .await?;
    if email_taken {
        return Err(ApiError::conflict("Email already exists"));
    }

    let password_hash = password::hash_password(&payload.password)?;

    let user_id: i32 = sqlx::query_scalar(
        "INSERT INTO users (username, email, password_hash, role, first_name, last_name, phone) \
         VALUES ($1, $2, $3, 'student', $4, $5, $6) RETURNING id",
    )
    .bind(&payload.username)
    .bind(&payload.email)
    .bind(&password_hash)
    .bind(&payload.first_name)
    .bind(&payload.last_name)
    .bind(&payload.phone)
    .fetch_one(&state.db)
    .await?;

    tracing::info!(user_id, username = %payload.username, "user registered");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User registered successfully",
            "user_id": user_id,
        })),
    ))
}

/// POST /api/v1/auth/login
///
/// Unknown username and wrong password produce the same 401 body so the
/// response does not reveal which part was wrong.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<Value>, ApiError> {
    if payload.username.is_empty() || payload.password.is_empty() {
        return Err(ApiError::bad_request("Username and password are required"));
    }

    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE username = $1")
        .bind(&payload.username)
        .fetch_optional(&state.db)
        .await?;

    let Some(user) = user else {
        return Err(ApiError::unauthorized("Invalid username or password"));
    };

    if !password::verify_password(&payload.password, &user.password_hash) {
        return Err(ApiError::unauthorized("Invalid username or password"));
    }

    let claims = Claims::new(
        user.id,
        user.username.clone(),
        user.role,
        state.config.jwt_expiry_hours,
    );
    let token = auth::issue_token(&state.config.jwt_secret, &claims).map_err(|err| {
        tracing::error!("token generation failed: {}", err);
        ApiError::internal("Error generating token")
    })?;

    Ok(Json(json!({ "token": token })))
}
