use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::models::{ImageRequest, Item, ItemRequest, ItemStatus, Role, UpdateItemStatusRequest};
use crate::query::{ListQuery, Page, Pagination};
use crate::state::AppState;

const DEFAULT_LIMIT: i64 = 10;

#[derive(Debug, Deserialize)]
pub struct ItemListParams {
    pub status: Option<String>,
    pub category: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// GET /api/v1/items - public browse, also served to guards under
/// /api/v1/guard/items with the role gate in front.
pub async fn list_items(
    State(state): State<AppState>,
    Query(params): Query<ItemListParams>,
) -> Result<Json<Page<Item>>, ApiError> {
    let pagination = Pagination::resolve(
        params.page,
        params.limit,
        DEFAULT_LIMIT,
        state.config.max_page_size,
    );

    let mut query = ListQuery::new("items");
    query
        .filter_eq("status", params.status.as_deref())
        .filter_eq("category", params.category.as_deref());

    let page = query.fetch_page(&state.db, pagination).await?;
    Ok(Json(page))
}

#[derive(Debug, Deserialize)]
pub struct ItemSearchParams {
    pub q: Option<String>,
    pub status: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// GET /api/v1/items/search - substring match over title and description.
pub async fn search_items(
    State(state): State<AppState>,
    Query(params): Query<ItemSearchParams>,
) -> Result<Json<Page<Item>>, ApiError> {
    let term = params.q.as_deref().unwrap_or("");
    if term.is_empty() {
        return Err(ApiError::bad_request("Search query is required"));
    }

    let pagination = Pagination::resolve(
        params.page,
        params.limit,
        DEFAULT_LIMIT,
        state.config.max_page_size,
    );

    let mut query = ListQuery::new("items");
    query
        .search(&["title", "description"], term)
        .filter_eq("status", params.status.as_deref());

    let page = query.fetch_page(&state.db, pagination).await?;
    Ok(Json(page))
}

/// GET /api/v1/items/:id
pub async fn get_item(
    State(state): State<AppState>,
    Path(item_id): Path<i32>,
) -> Result<Json<Item>, ApiError> {
    let item: Option<Item> = sqlx::query_as("SELECT * FROM items WHERE id = $1")
        .bind(item_id)
        .fetch_optional(&state.db)
        .await?;

    item.map(Json).ok_or_else(|| ApiError::not_found("Item not found"))
}

/// GET /api/v1/user/items - items where the caller is reporter or finder.
pub async fn my_items(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<ItemListParams>,
) -> Result<Json<Page<Item>>, ApiError> {
    let pagination = Pagination::resolve(
        params.page,
        params.limit,
        DEFAULT_LIMIT,
        state.config.max_page_size,
    );

    let mut query = ListQuery::new("items");
    query
        .owned_by(user.user_id)
        .filter_eq("status", params.status.as_deref());

    let page = query.fetch_page(&state.db, pagination).await?;
    Ok(Json(page))
}

/// POST /api/v1/items/lost
pub async fn report_lost(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<ItemRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    validate_item_request(&payload)?;

    let item_id: i32 = sqlx::query_scalar(
        "INSERT INTO items (title, description, category, status, location, lost_time, reporter_id) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING id",
    )
    .bind(&payload.title)
    .bind(&payload.description)
    .bind(&payload.category)
    .bind(ItemStatus::Lost.as_str())
    .bind(&payload.location)
    .bind(payload.lost_time)
    .bind(user.user_id)
    .fetch_one(&state.db)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Lost item reported successfully",
            "item_id": item_id,
        })),
    ))
}

/// POST /api/v1/items/found
pub async fn report_found(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<ItemRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    validate_item_request(&payload)?;

    let item_id: i32 = sqlx::query_scalar(
        "INSERT INTO items (title, description, category, status, location, finder_id) \
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING id",
    )
    .bind(&payload.title)
    .bind(&payload.description)
    .bind(&payload.category)
    .bind(ItemStatus::Found.as_str())
    .bind(&payload.location)
    .bind(user.user_id)
    .fetch_one(&state.db)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Found item reported successfully",
            "item_id": item_id,
        })),
    ))
}

fn validate_item_request(payload: &ItemRequest) -> Result<(), ApiError> {
    if payload.title.is_empty() || payload.category.is_empty() || payload.location.is_empty() {
        return Err(ApiError::bad_request(
            "Title, category, and location are required",
        ));
    }
    Ok(())
}

/// PUT /api/v1/items/:id/status
///
/// Guards and admins may update any item; everyone else only items they
/// reported or found. Moving to `claimed` stamps `claimed_time` in the
/// same transaction as the status write.
pub async fn update_status(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(item_id): Path<i32>,
    Json(payload): Json<UpdateItemStatusRequest>,
) -> Result<Json<Value>, ApiError> {
    let status: ItemStatus = payload.status.parse().map_err(|_| {
        ApiError::bad_request("Invalid status. Must be one of: lost, found, claimed, returned")
    })?;

    let item: Option<Item> = sqlx::query_as("SELECT * FROM items WHERE id = $1")
        .bind(item_id)
        .fetch_optional(&state.db)
        .await?;
    let Some(item) = item else {
        return Err(ApiError::not_found("Item not found"));
    };

    let privileged = matches!(user.role, Role::Guard | Role::Admin);
    if !privileged && !item.is_owned_by(user.user_id) {
        return Err(ApiError::forbidden(
            "You do not have permission to update this item",
        ));
    }

    let mut tx = state.db.begin().await?;
    sqlx::query("UPDATE items SET status = $1, updated_at = NOW() WHERE id = $2")
        .bind(status.as_str())
        .bind(item_id)
        .execute(&mut *tx)
        .await?;
    if status == ItemStatus::Claimed {
        sqlx::query("UPDATE items SET claimed_time = NOW() WHERE id = $1")
            .bind(item_id)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;

    Ok(Json(json!({ "message": "Item status updated successfully" })))
}

/// POST /api/v1/items/:id/image
///
/// Records image metadata and points the item at it. The image blob
/// itself is stored out of band; only the URL travels through here.
pub async fn attach_image(
    State(state): State<AppState>,
    Path(item_id): Path<i32>,
    Json(payload): Json<ImageRequest>,
) -> Result<Json<Value>, ApiError> {
    if payload.image_url.is_empty() {
        return Err(ApiError::bad_request("Image URL is required"));
    }

    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM items WHERE id = $1)")
        .bind(item_id)
        .fetch_one(&state.db)
        .await?;
    if !exists {
        return Err(ApiError::not_found("Item not found"));
    }

    let mut tx = state.db.begin().await?;
    sqlx::query(
        "INSERT INTO images (item_id, image_url, timestamp, latitude, longitude) \
         VALUES ($1, $2, COALESCE($3, NOW()), $4, $5)",
    )
    .bind(item_id)
    .bind(&payload.image_url)
    .bind(payload.timestamp)
    .bind(payload.latitude)
    .bind(payload.longitude)
    .execute(&mut *tx)
    .await?;
    sqlx::query("UPDATE items SET image_url = $1, updated_at = NOW() WHERE id = $2")
        .bind(&payload.image_url)
        .bind(item_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    Ok(Json(json!({
        "message": "Image recorded successfully",
        "image_url": payload.image_url,
    })))
}
