use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Message {
    pub id: i32,
    pub sender_id: i32,
    pub receiver_id: i32,
    pub item_id: Option<i32>,
    pub content: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// Message joined with the sender's username for thread listings.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MessageWithSender {
    pub id: i32,
    pub sender_id: i32,
    pub receiver_id: i32,
    pub item_id: Option<i32>,
    pub content: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
    pub sender_username: String,
}

/// One row per counterpart the user has exchanged messages with, carrying
/// the most recent message and the unread tally.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Conversation {
    pub other_user_id: i32,
    pub other_username: String,
    pub latest_message_id: i32,
    pub latest_message: String,
    pub latest_message_time: DateTime<Utc>,
    pub unread_count: i64,
}

#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    pub receiver_id: Option<i32>,
    #[serde(default)]
    pub item_id: Option<i32>,
    #[serde(default)]
    pub content: String,
}
