use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use agora_auth::{JwtValidator, Principal, TokenKind};

use crate::app::errors::json_error;
use crate::context::RequestIdentity;

#[derive(Clone)]
pub struct AuthState {
    pub jwt: Arc<dyn JwtValidator>,
}

/// Require a valid access token and attach the caller's [`RequestIdentity`].
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let identity = match authenticate(&state, req.headers(), TokenKind::Access) {
        Ok(identity) => identity,
        Err(response) => return response,
    };
    req.extensions_mut().insert(identity);
    next.run(req).await
}

/// Validate the bearer token in `headers` as a token of `kind`.
pub fn authenticate(state: &AuthState, headers: &HeaderMap, kind: TokenKind) -> Result<RequestIdentity, Response> {
    let token = extract_bearer(headers).ok_or_else(|| {
        json_error(StatusCode::UNAUTHORIZED, "unauthorized", "Missing Authorization Header")
    })?;

    let claims = state.jwt.validate(token, kind, Utc::now()).map_err(|e| {
        tracing::debug!(error = %e, "rejected bearer token");
        json_error(StatusCode::UNAUTHORIZED, "unauthorized", e.to_string())
    })?;

    Ok(RequestIdentity::new(Principal::from_claims(&claims)))
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(axum::http::header::AUTHORIZATION)?;
    let header = header.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token)
}
