use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::Response,
};
use chrono::Utc;
use serde_json::json;

use agora_affiliation::ApprovalRequested;
use agora_auth::permissions::{AGENTS_LIST, APPROVALS_REQUEST, APPROVALS_REQUEST_ON_BEHALF};
use agora_auth::Role;
use agora_core::{AgentId, DistributorId, DomainError, Email};
use agora_identity::Agent;

use crate::app::errors::{self, ApiJson};
use crate::app::dto;
use crate::app::services::AppServices;
use crate::authz;
use crate::context::RequestIdentity;

pub async fn list_agents(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<RequestIdentity>,
) -> Result<Response, Response> {
    authz::guard(&identity, Role::Admin, &AGENTS_LIST)?;

    let agents = services
        .identity
        .list_agents()
        .await
        .map_err(errors::store_error_to_response)?;

    Ok(dto::success(
        StatusCode::OK,
        "Agents retrieved",
        json!(agents.iter().map(dto::agent_to_json).collect::<Vec<_>>()),
    ))
}

pub async fn get_agent(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Response, Response> {
    let id: AgentId = errors::parse_id(&id)?;
    let agent = services
        .identity
        .find_agent(id)
        .await
        .map_err(errors::store_error_to_response)?
        .ok_or_else(agent_not_found)?;

    Ok(dto::success(StatusCode::OK, "Agent retrieved", dto::agent_to_json(&agent)))
}

/// The calling agent asks a distributor for affiliation.
pub async fn request_approval(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<RequestIdentity>,
    ApiJson(body): ApiJson<dto::RequestApprovalRequest>,
) -> Result<Response, Response> {
    authz::guard(&identity, Role::Agent, &APPROVALS_REQUEST)?;
    let distributor_id: DistributorId = errors::parse_id(&body.distributor_id)?;
    let agent = resolve_agent(&services, identity.email()).await?;

    let requested = services
        .affiliation
        .request_approval(agent.id, distributor_id, Utc::now())
        .await
        .map_err(errors::service_error_to_response)?;

    Ok(requested_response(&requested))
}

/// Request approval for the agent in the path.
///
/// Administrators may act for any agent; an agent only for itself.
pub async fn request_approval_for(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<RequestIdentity>,
    Path(agent_id): Path<String>,
    ApiJson(body): ApiJson<dto::RequestApprovalRequest>,
) -> Result<Response, Response> {
    authz::permit(&identity, &APPROVALS_REQUEST)?;
    let agent_id: AgentId = errors::parse_id(&agent_id)?;

    match identity.role() {
        Role::Admin => authz::permit(&identity, &APPROVALS_REQUEST_ON_BEHALF)?,
        _ => {
            let caller = resolve_agent(&services, identity.email()).await?;
            if caller.id != agent_id {
                return Err(errors::domain_error_to_response(DomainError::forbidden(
                    "You are not allowed to make this request",
                )));
            }
        }
    }

    let distributor_id: DistributorId = errors::parse_id(&body.distributor_id)?;
    let requested = services
        .affiliation
        .request_approval(agent_id, distributor_id, Utc::now())
        .await
        .map_err(errors::service_error_to_response)?;

    Ok(requested_response(&requested))
}

/// The agent account owning `email`.
pub(crate) async fn resolve_agent(services: &AppServices, email: &Email) -> Result<Agent, Response> {
    services
        .identity
        .find_agent_by_email(email)
        .await
        .map_err(errors::store_error_to_response)?
        .ok_or_else(agent_not_found)
}

fn agent_not_found() -> Response {
    errors::domain_error_to_response(DomainError::not_found("Agent not found."))
}

fn requested_response(requested: &ApprovalRequested) -> Response {
    dto::success(
        StatusCode::OK,
        requested.message,
        json!({
            "agent_id": requested.agent_id().to_string(),
            "distributor_id": requested.distributor_id().to_string(),
            "request_id": requested.request.id.to_string(),
        }),
    )
}
