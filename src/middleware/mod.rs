pub mod auth;
pub mod role;

pub use auth::{require_auth, AuthUser};
pub use role::{require_admin, require_guard_or_admin};
