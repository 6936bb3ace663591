use axum::{extract::State, http::StatusCode, Extension, Json};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::models::{ReportRequest, ReportStatus};
use crate::state::AppState;

/// POST /api/v1/user/reports - any authenticated user may file a report;
/// reading and resolving them is admin-only (see handlers::admin).
pub async fn create_report(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<ReportRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Some(reported_id) = payload.reported_id else {
        return Err(ApiError::bad_request(
            "Reported user ID and reason are required",
        ));
    };
    if payload.reason.is_empty() {
        return Err(ApiError::bad_request(
            "Reported user ID and reason are required",
        ));
    }

    let reported_exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(reported_id)
            .fetch_one(&state.db)
            .await?;
    if !reported_exists {
        return Err(ApiError::bad_request("Reported user not found"));
    }

    if let Some(item_id) = payload.item_id {
        let item_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM items WHERE id = $1)")
                .bind(item_id)
                .fetch_one(&state.db)
                .await?;
        if !item_exists {
            return Err(ApiError::bad_request("Item not found"));
        }
    }

    let report_id: i32 = sqlx::query_scalar(
        "INSERT INTO reports (reporter_id, reported_id, item_id, reason, status) \
         VALUES ($1, $2, $3, $4, $5) RETURNING id",
    )
    .bind(user.user_id)
    .bind(reported_id)
    .bind(payload.item_id)
    .bind(&payload.reason)
    .bind(ReportStatus::Pending.as_str())
    .fetch_one(&state.db)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Report submitted successfully",
            "report_id": report_id,
        })),
    ))
}
