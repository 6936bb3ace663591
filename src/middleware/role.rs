use axum::{extract::Request, middleware::Next, response::Response};

use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::models::Role;

// Role gates run after `require_auth`. A missing principal is always a 401
// (authentication problem), a present-but-wrong role is a 403 - never the
// other way around.

pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    check_role(&request, &[Role::Admin], "Admin access required")?;
    Ok(next.run(request).await)
}

pub async fn require_guard_or_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    check_role(
        &request,
        &[Role::Guard, Role::Admin],
        "Guard or admin access required",
    )?;
    Ok(next.run(request).await)
}

fn check_role(request: &Request, allowed: &[Role], denial: &str) -> Result<(), ApiError> {
    let user = request
        .extensions()
        .get::<AuthUser>()
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    if allowed.contains(&user.role) {
        Ok(())
    } else {
        Err(ApiError::forbidden(denial))
    }
}
