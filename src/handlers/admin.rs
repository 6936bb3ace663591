use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::models::{
    ReportStatus, ReportWithUsers, Role, UpdateReportStatusRequest, UpdateRoleRequest, UserProfile,
};
use crate::query::{ListQuery, Page, Pagination};
use crate::state::AppState;

const DEFAULT_LIMIT: i64 = 20;

#[derive(Debug, Deserialize)]
pub struct UserListParams {
    pub role: Option<String>,
    pub search: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// GET /api/v1/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    Query(params): Query<UserListParams>,
) -> Result<Json<Page<UserProfile>>, ApiError> {
    let pagination = Pagination::resolve(
        params.page,
        params.limit,
        DEFAULT_LIMIT,
        state.config.max_page_size,
    );

    let mut query = ListQuery::new("users")
        .columns("id, username, email, role, first_name, last_name, phone, created_at, updated_at");
    query.filter_eq("role", params.role.as_deref()).search(
        &["username", "email", "first_name", "last_name"],
        params.search.as_deref().unwrap_or(""),
    );

    let page = query.fetch_page(&state.db, pagination).await?;
    Ok(Json(page))
}

/// PUT /api/v1/admin/users/:id/role
///
/// An admin can never change their own role; demoting the last admin by
/// accident would lock the moderation surface.
pub async fn update_role(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthUser>,
    Path(user_id): Path<i32>,
    Json(payload): Json<UpdateRoleRequest>,
) -> Result<Json<Value>, ApiError> {
    if user_id == admin.user_id {
        return Err(ApiError::forbidden("Cannot change your own role"));
    }

    let role: Role = payload.role.parse().map_err(|_| {
        ApiError::bad_request("Invalid role. Must be one of: student, guard, admin")
    })?;

    let result = sqlx::query("UPDATE users SET role = $1, updated_at = NOW() WHERE id = $2")
        .bind(role.as_str())
        .bind(user_id)
        .execute(&state.db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("User not found"));
    }

    tracing::info!(user_id, role = %role, changed_by = admin.user_id, "user role updated");

    Ok(Json(json!({ "message": "User role updated successfully" })))
}

#[derive(Debug, Deserialize)]
pub struct ReportListParams {
    pub status: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// GET /api/v1/admin/reports
pub async fn list_reports(
    State(state): State<AppState>,
    Query(params): Query<ReportListParams>,
) -> Result<Json<Page<ReportWithUsers>>, ApiError> {
    let pagination = Pagination::resolve(
        params.page,
        params.limit,
        DEFAULT_LIMIT,
        state.config.max_page_size,
    );

    // Left join on the reporter side: reporter_id is nullable and the
    // count must cover exactly the same rows as the page.
    let mut query = ListQuery::new(
        "reports r \
         LEFT JOIN users reporter ON r.reporter_id = reporter.id \
         JOIN users reported ON r.reported_id = reported.id",
    )
    .columns(
        "r.*, reporter.username AS reporter_username, reported.username AS reported_username",
    )
    .order_by("r.created_at DESC, r.id DESC");
    query.filter_eq("r.status", params.status.as_deref());

    let page = query.fetch_page(&state.db, pagination).await?;
    Ok(Json(page))
}

/// PUT /api/v1/admin/reports/:id/status
pub async fn update_report_status(
    State(state): State<AppState>,
    Path(report_id): Path<i32>,
    Json(payload): Json<UpdateReportStatusRequest>,
) -> Result<Json<Value>, ApiError> {
    let status: ReportStatus = payload.status.parse().map_err(|_| {
        ApiError::bad_request("Invalid status. Must be one of: pending, resolved, dismissed")
    })?;

    let result = sqlx::query(
        "UPDATE reports SET status = $1, admin_comment = $2, updated_at = NOW() WHERE id = $3",
    )
    .bind(status.as_str())
    .bind(&payload.comment)
    .bind(report_id)
    .execute(&state.db)
    .await?;
    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Report not found"));
    }

    Ok(Json(json!({ "message": "Report status updated successfully" })))
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct Stats {
    pub total_users: i64,
    pub student_count: i64,
    pub guard_count: i64,
    pub admin_count: i64,
    pub total_items: i64,
    pub lost_items: i64,
    pub found_items: i64,
    pub claimed_items: i64,
    pub returned_items: i64,
    pub pending_reports: i64,
}

/// GET /api/v1/admin/stats - dashboard counters.
pub async fn stats(State(state): State<AppState>) -> Result<Json<Stats>, ApiError> {
    let (total_users, student_count, guard_count, admin_count): (i64, i64, i64, i64) =
        sqlx::query_as(
            "SELECT COUNT(*), \
             COUNT(*) FILTER (WHERE role = 'student'), \
             COUNT(*) FILTER (WHERE role = 'guard'), \
             COUNT(*) FILTER (WHERE role = 'admin') \
             FROM users",
        )
        .fetch_one(&state.db)
        .await?;

    let (total_items, lost_items, found_items, claimed_items, returned_items): (
        i64,
        i64,
        i64,
        i64,
        i64,
    ) = sqlx::query_as(
        "SELECT COUNT(*), \
         COUNT(*) FILTER (WHERE status = 'lost'), \
         COUNT(*) FILTER (WHERE status = 'found'), \
         COUNT(*) FILTER (WHERE status = 'claimed'), \
         COUNT(*) FILTER (WHERE status = 'returned') \
         FROM items",
    )
    .fetch_one(&state.db)
    .await?;

    let pending_reports: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM reports WHERE status = 'pending'")
            .fetch_one(&state.db)
            .await?;

    Ok(Json(Stats {
        total_users,
        student_count,
        guard_count,
        admin_count,
        total_items,
        lost_items,
        found_items,
        claimed_items,
        returned_items,
        pending_reports,
    }))
}
