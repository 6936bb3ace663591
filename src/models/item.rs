use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::ParseEnumError;

/// Lifecycle state of a reported item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Lost,
    Found,
    Claimed,
    Returned,
}

impl ItemStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Lost => "lost",
            ItemStatus::Found => "found",
            ItemStatus::Claimed => "claimed",
            ItemStatus::Returned => "returned",
        }
    }
}

impl std::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ItemStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lost" => Ok(ItemStatus::Lost),
            "found" => Ok(ItemStatus::Found),
            "claimed" => Ok(ItemStatus::Claimed),
            "returned" => Ok(ItemStatus::Returned),
            other => Err(ParseEnumError::new("item status", other)),
        }
    }
}

impl TryFrom<String> for ItemStatus {
    type Error = ParseEnumError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Item {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    #[sqlx(try_from = "String")]
    pub status: ItemStatus,
    pub location: Option<String>,
    pub lost_time: Option<DateTime<Utc>>,
    pub report_time: DateTime<Utc>,
    pub claimed_time: Option<DateTime<Utc>>,
    pub reporter_id: Option<i32>,
    pub finder_id: Option<i32>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Item {
    /// Whether the given user reported or found this item. Both foreign
    /// keys are nullable, so a NULL never matches anyone.
    pub fn is_owned_by(&self, user_id: i32) -> bool {
        self.reporter_id == Some(user_id) || self.finder_id == Some(user_id)
    }
}

#[derive(Debug, Deserialize)]
pub struct ItemRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub lost_time: Option<DateTime<Utc>>,
}

/// Body of `PUT /items/:id/status`; parsed to [`ItemStatus`] in the handler
/// so an invalid value becomes a 400 with the allowed set named.
#[derive(Debug, Deserialize)]
pub struct UpdateItemStatusRequest {
    #[serde(default)]
    pub status: String,
}

/// Image metadata attached to an item. The blob itself lives elsewhere;
/// only the URL and capture metadata are recorded.
#[derive(Debug, Deserialize)]
pub struct ImageRequest {
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}
