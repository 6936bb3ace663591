pub mod item;
pub mod message;
pub mod report;
pub mod user;

pub use item::{ImageRequest, Item, ItemRequest, ItemStatus, UpdateItemStatusRequest};
pub use message::{Conversation, Message, MessageRequest, MessageWithSender};
pub use report::{Report, ReportRequest, ReportStatus, ReportWithUsers, UpdateReportStatusRequest};
pub use user::{
    ChangePasswordRequest, LoginRequest, RegisterRequest, Role, UpdateProfileRequest,
    UpdateRoleRequest, User, UserProfile,
};

/// Returned when a string does not name a known domain enum variant.
#[derive(Debug, thiserror::Error)]
#[error("unrecognized {kind}: {value}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseEnumError {
    pub(crate) fn new(kind: &'static str, value: impl Into<String>) -> Self {
        Self { kind, value: value.into() }
    }
}
