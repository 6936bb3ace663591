use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::models::{Conversation, MessageRequest, MessageWithSender};
use crate::query::{ListQuery, Page, Pagination};
use crate::state::AppState;

// Threads page at 50 by default; conversations are not paginated.
const DEFAULT_LIMIT: i64 = 50;

/// POST /api/v1/user/messages
pub async fn send_message(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<MessageRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    if payload.content.is_empty() {
        return Err(ApiError::bad_request("Message content is required"));
    }
    let Some(receiver_id) = payload.receiver_id else {
        return Err(ApiError::bad_request("Receiver ID is required"));
    };

    let receiver_exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(receiver_id)
            .fetch_one(&state.db)
            .await?;
    if !receiver_exists {
        return Err(ApiError::not_found("Receiver not found"));
    }

    if let Some(item_id) = payload.item_id {
        let item_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM items WHERE id = $1)")
                .bind(item_id)
                .fetch_one(&state.db)
                .await?;
        if !item_exists {
            return Err(ApiError::not_found("Item not found"));
        }
    }

    let message_id: i32 = sqlx::query_scalar(
        "INSERT INTO messages (sender_id, receiver_id, item_id, content) \
         VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(user.user_id)
    .bind(receiver_id)
    .bind(payload.item_id)
    .bind(&payload.content)
    .fetch_one(&state.db)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Message sent successfully",
            "message_id": message_id,
        })),
    ))
}

/// GET /api/v1/user/messages/conversations
///
/// One row per counterpart: who, the latest message, and how many of
/// their messages are still unread.
pub async fn conversations(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<Conversation>>, ApiError> {
    let rows: Vec<Conversation> = sqlx::query_as(
        r#"
        WITH conversations AS (
            SELECT
                CASE WHEN sender_id = $1 THEN receiver_id ELSE sender_id END AS other_user_id,
                MAX(created_at) AS latest_time
            FROM messages
            WHERE sender_id = $1 OR receiver_id = $1
            GROUP BY other_user_id
        )
        SELECT
            c.other_user_id,
            u.username AS other_username,
            m.id AS latest_message_id,
            m.content AS latest_message,
            m.created_at AS latest_message_time,
            (SELECT COUNT(*) FROM messages
             WHERE receiver_id = $1 AND sender_id = c.other_user_id AND read = false) AS unread_count
        FROM conversations c
        JOIN users u ON c.other_user_id = u.id
        JOIN messages m ON (
            (m.sender_id = $1 AND m.receiver_id = c.other_user_id) OR
            (m.sender_id = c.other_user_id AND m.receiver_id = $1)
        )
        WHERE m.created_at = c.latest_time
        ORDER BY m.created_at DESC
        "#,
    )
    .bind(user.user_id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(rows))
}

#[derive(Debug, Deserialize)]
pub struct ThreadParams {
    pub item_id: Option<i32>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// GET /api/v1/user/messages/:id - thread with one counterpart.
///
/// Always scoped to the requesting principal, so a user can only ever see
/// messages they sent or received. Fetching the thread marks the
/// counterpart's messages as read.
pub async fn thread(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(other_user_id): Path<i32>,
    Query(params): Query<ThreadParams>,
) -> Result<Json<Page<MessageWithSender>>, ApiError> {
    let pagination = Pagination::resolve(
        params.page,
        params.limit,
        DEFAULT_LIMIT,
        state.config.max_page_size,
    );

    let mut query = ListQuery::new("messages m JOIN users u ON m.sender_id = u.id")
        .columns("m.*, u.username AS sender_username")
        .order_by("m.created_at DESC, m.id DESC");
    query
        .between_participants("m.sender_id", "m.receiver_id", user.user_id, other_user_id)
        .filter_eq_int("m.item_id", params.item_id);

    let page = query.fetch_page(&state.db, pagination).await?;

    // Mark the counterpart's messages read; a failure here should not
    // fail the read itself.
    let marked = sqlx::query(
        "UPDATE messages SET read = true \
         WHERE receiver_id = $1 AND sender_id = $2 AND read = false",
    )
    .bind(user.user_id)
    .bind(other_user_id)
    .execute(&state.db)
    .await;
    if let Err(err) = marked {
        tracing::warn!("failed to mark messages read: {}", err);
    }

    Ok(Json(page))
}

/// GET /api/v1/user/messages/unread
pub async fn unread_count(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Value>, ApiError> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM messages WHERE receiver_id = $1 AND read = false",
    )
    .bind(user.user_id)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(json!({ "unread_count": count })))
}
