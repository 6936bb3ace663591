use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::ParseEnumError;

/// Moderation state of an abuse report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Pending,
    Resolved,
    Dismissed,
}

impl ReportStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Pending => "pending",
            ReportStatus::Resolved => "resolved",
            ReportStatus::Dismissed => "dismissed",
        }
    }
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ReportStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ReportStatus::Pending),
            "resolved" => Ok(ReportStatus::Resolved),
            "dismissed" => Ok(ReportStatus::Dismissed),
            other => Err(ParseEnumError::new("report status", other)),
        }
    }
}

impl TryFrom<String> for ReportStatus {
    type Error = ParseEnumError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Report {
    pub id: i32,
    pub reporter_id: Option<i32>,
    pub reported_id: i32,
    pub item_id: Option<i32>,
    pub reason: String,
    #[sqlx(try_from = "String")]
    pub status: ReportStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub admin_comment: Option<String>,
}

/// Report joined with both usernames for the admin listing. The reporter
/// side is a left join because `reporter_id` is nullable.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ReportWithUsers {
    pub id: i32,
    pub reporter_id: Option<i32>,
    pub reported_id: i32,
    pub item_id: Option<i32>,
    pub reason: String,
    #[sqlx(try_from = "String")]
    pub status: ReportStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub admin_comment: Option<String>,
    pub reporter_username: Option<String>,
    pub reported_username: String,
}

#[derive(Debug, Deserialize)]
pub struct ReportRequest {
    pub reported_id: Option<i32>,
    #[serde(default)]
    pub item_id: Option<i32>,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateReportStatusRequest {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub comment: Option<String>,
}
