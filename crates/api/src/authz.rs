//! Handler-side role and permission guards.
//!
//! Guards run in handlers before any service call, so a refused request never
//! reaches the stores.

use axum::http::StatusCode;
use axum::response::Response;

use agora_auth::{AuthzError, Permission, Role, authorize, require_role};

use crate::app::errors::json_error;
use crate::context::RequestIdentity;

const FORBIDDEN: &str = "You are not allowed to make this request";

/// Require the caller to hold `role` and be granted `permission`.
pub fn guard(identity: &RequestIdentity, role: Role, permission: &Permission) -> Result<(), Response> {
    require_role(identity.principal(), role).map_err(forbidden)?;
    authorize(identity.principal(), permission).map_err(forbidden)
}

/// Require `permission`, whatever the caller's role.
pub fn permit(identity: &RequestIdentity, permission: &Permission) -> Result<(), Response> {
    authorize(identity.principal(), permission).map_err(forbidden)
}

fn forbidden(err: AuthzError) -> Response {
    tracing::warn!(error = %err, "authorization refused");
    json_error(StatusCode::FORBIDDEN, "forbidden", FORBIDDEN)
}
