use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::Response,
};
use chrono::Utc;
use serde_json::{json, Value};

use agora_affiliation::Decision;
use agora_auth::permissions::{APPROVALS_DECIDE, APPROVALS_READ, DISTRIBUTORS_ADMIN_LIST};
use agora_auth::Role;
use agora_core::{ApprovalRequestId, DistributorId, DomainError};
use agora_identity::Distributor;

use crate::app::errors::{self, ApiJson};
use crate::app::dto;
use crate::app::services::AppServices;
use crate::authz;
use crate::context::RequestIdentity;

/// Public directory of distributors agents can apply to.
pub async fn list_summaries(Extension(services): Extension<Arc<AppServices>>) -> Result<Response, Response> {
    let distributors = services
        .identity
        .list_distributors()
        .await
        .map_err(errors::store_error_to_response)?;

    Ok(dto::success(
        StatusCode::OK,
        "Distributors retrieved",
        json!(distributors.iter().map(dto::distributor_summary_to_json).collect::<Vec<_>>()),
    ))
}

/// Full distributor records with their affiliated agents.
pub async fn admin_list(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<RequestIdentity>,
) -> Result<Response, Response> {
    authz::guard(&identity, Role::Admin, &DISTRIBUTORS_ADMIN_LIST)?;

    let distributors = services
        .identity
        .list_distributors()
        .await
        .map_err(errors::store_error_to_response)?;

    let mut data = Vec::with_capacity(distributors.len());
    for distributor in &distributors {
        data.push(with_agents(&services, distributor).await?);
    }

    Ok(dto::success(StatusCode::OK, "Distributors retrieved", json!(data)))
}

pub async fn get_distributor(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Response, Response> {
    let id: DistributorId = errors::parse_id(&id)?;
    let distributor = services
        .identity
        .find_distributor(id)
        .await
        .map_err(errors::store_error_to_response)?
        .ok_or_else(|| errors::domain_error_to_response(DomainError::not_found("Distributor not found.")))?;

    Ok(dto::success(
        StatusCode::OK,
        "Distributor retrieved",
        with_agents(&services, &distributor).await?,
    ))
}

/// Every request addressed to the calling distributor.
pub async fn list_agent_requests(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<RequestIdentity>,
) -> Result<Response, Response> {
    authz::guard(&identity, Role::Distributor, &APPROVALS_READ)?;

    let requests = services
        .affiliation
        .list_agent_requests(identity.email(), None)
        .await
        .map_err(errors::service_error_to_response)?;

    Ok(dto::success(
        StatusCode::OK,
        "Agent requests retrieved",
        json!(requests.iter().map(dto::request_to_json).collect::<Vec<_>>()),
    ))
}

/// A single request, only when it is addressed to the calling distributor.
pub async fn get_agent_request(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<RequestIdentity>,
    Path(request_id): Path<String>,
) -> Result<Response, Response> {
    authz::guard(&identity, Role::Distributor, &APPROVALS_READ)?;
    let request_id: ApprovalRequestId = errors::parse_id(&request_id)?;

    let requests = services
        .affiliation
        .list_agent_requests(identity.email(), Some(request_id))
        .await
        .map_err(errors::service_error_to_response)?;

    let data = requests.first().map(dto::request_to_json).unwrap_or(Value::Null);
    Ok(dto::success(StatusCode::OK, "Agent request retrieved", data))
}

pub async fn decide_agent_request(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<RequestIdentity>,
    Path(request_id): Path<String>,
    ApiJson(body): ApiJson<dto::DecideRequest>,
) -> Result<Response, Response> {
    authz::guard(&identity, Role::Distributor, &APPROVALS_DECIDE)?;
    let request_id: ApprovalRequestId = errors::parse_id(&request_id)?;
    let decision = Decision::parse(&body.status).map_err(errors::domain_error_to_response)?;

    let recorded = services
        .affiliation
        .decide(identity.email(), request_id, decision, Utc::now())
        .await
        .map_err(errors::service_error_to_response)?;

    Ok(dto::success(
        StatusCode::OK,
        recorded.message,
        dto::request_to_json(&recorded.request),
    ))
}

async fn with_agents(services: &AppServices, distributor: &Distributor) -> Result<Value, Response> {
    let agents = services
        .identity
        .list_agents_for_distributor(distributor.id)
        .await
        .map_err(errors::store_error_to_response)?;
    Ok(dto::distributor_to_json(distributor, &agents))
}
