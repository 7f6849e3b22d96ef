use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::Response};

use agora_core::DomainError;

use crate::app::{dto, errors};
use crate::app::services::AppServices;
use crate::context::RequestIdentity;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn banner() -> &'static str {
    concat!("agora-api ", env!("CARGO_PKG_VERSION"), " is running")
}

/// The caller's own profile.
pub async fn profile(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<RequestIdentity>,
) -> Result<Response, Response> {
    let profile = services
        .identity
        .find_profile_by_email(identity.email())
        .await
        .map_err(errors::store_error_to_response)?
        .ok_or_else(|| errors::domain_error_to_response(DomainError::not_found("Profile not found.")))?;

    Ok(dto::success(StatusCode::OK, "Profile retrieved", dto::profile_to_json(&profile)))
}
