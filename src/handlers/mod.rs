pub mod admin;
pub mod auth;
pub mod items;
pub mod messages;
pub mod profile;
pub mod reports;
