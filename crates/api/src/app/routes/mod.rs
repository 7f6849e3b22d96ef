use axum::{
    routing::{get, post, put},
    Router,
};

pub mod agents;
pub mod auth;
pub mod distributors;
pub mod purchases;
pub mod system;

/// Routes reachable without a bearer token.
pub fn public_router() -> Router {
    Router::new()
        .route("/health", get(system::health))
        .route("/test", get(system::banner))
        .route("/auth/register", post(auth::register_agent))
        .route("/auth/distributor/register", post(auth::register_distributor))
        .route("/auth/insurance/register", post(auth::register_insurance_company))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", get(auth::refresh))
        .route("/distributors", get(distributors::list_summaries))
}

/// Routes behind the access-token middleware.
pub fn protected_router() -> Router {
    Router::new()
        .route("/auth/admin/register", post(auth::register_admin))
        .route("/profile", get(system::profile))
        .route("/agents", get(agents::list_agents))
        .route("/agents/:id", get(agents::get_agent))
        .route("/agents/request-approval", post(agents::request_approval))
        .route("/agents/request-approval/:agent_id", post(agents::request_approval_for))
        .route("/distributors/agent-requests", get(distributors::list_agent_requests))
        .route(
            "/distributors/agent-requests/:request_id",
            get(distributors::get_agent_request).put(distributors::decide_agent_request),
        )
        .route("/distributors/:id", get(distributors::get_distributor))
        .route("/admin/distributors", get(distributors::admin_list))
        .route("/purchase", post(purchases::create_purchase).get(purchases::list_purchases))
        .route("/purchase/:id", get(purchases::get_purchase))
}
