//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store selection and service construction
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request bodies and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router};
use tower::ServiceBuilder;

use crate::config::Config;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs` and tests).
pub async fn build_app(config: Config) -> anyhow::Result<Router> {
    let jwt = Arc::new(agora_auth::Hs256JwtValidator::new(config.jwt_secret.as_bytes()));
    let auth_state = middleware::AuthState { jwt };

    let services = Arc::new(services::build_services(&config).await?);

    // Protected routes: require a valid access token.
    let protected = routes::protected_router().route_layer(axum::middleware::from_fn_with_state(
        auth_state.clone(),
        middleware::auth_middleware,
    ));

    Ok(routes::public_router()
        .merge(protected)
        .layer(
            ServiceBuilder::new()
                .layer(Extension(services))
                .layer(Extension(auth_state)),
        ))
}
