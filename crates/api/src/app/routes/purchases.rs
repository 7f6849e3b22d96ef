use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::Response,
};
use chrono::Utc;
use serde_json::json;

use agora_auth::permissions::{PURCHASES_CREATE, PURCHASES_READ};
use agora_auth::Role;
use agora_core::{AgentId, DomainError, PurchaseId};
use agora_identity::Agent;
use agora_purchasing::{record_purchase, NewPurchase};

use crate::app::routes::agents::resolve_agent;
use crate::app::errors::{self, ApiJson};
use crate::app::dto;
use crate::app::services::AppServices;
use crate::authz;
use crate::context::RequestIdentity;

/// Record a purchase made through the calling agent.
pub async fn create_purchase(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<RequestIdentity>,
    ApiJson(body): ApiJson<NewPurchase>,
) -> Result<Response, Response> {
    authz::guard(&identity, Role::Agent, &PURCHASES_CREATE)?;
    let agent = resolve_agent(&services, identity.email()).await?;

    let purchase = record_purchase(services.purchases.as_ref(), &agent, &body, Utc::now())
        .await
        .map_err(errors::service_error_to_response)?;

    Ok(dto::success(
        StatusCode::CREATED,
        "Purchase recorded successfully!",
        dto::purchase_to_json(&purchase, Some(&agent)),
    ))
}

pub async fn list_purchases(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<RequestIdentity>,
) -> Result<Response, Response> {
    authz::permit(&identity, &PURCHASES_READ)?;

    let purchases = services
        .purchases
        .list_purchases()
        .await
        .map_err(errors::store_error_to_response)?;

    let mut agents: HashMap<AgentId, Option<Agent>> = HashMap::new();
    let mut data = Vec::with_capacity(purchases.len());
    for purchase in &purchases {
        if !agents.contains_key(&purchase.agent_id) {
            let agent = services
                .identity
                .find_agent(purchase.agent_id)
                .await
                .map_err(errors::store_error_to_response)?;
            agents.insert(purchase.agent_id, agent);
        }
        let agent = agents.get(&purchase.agent_id).and_then(Option::as_ref);
        data.push(dto::purchase_to_json(purchase, agent));
    }

    Ok(dto::success(StatusCode::OK, "Purchases retrieved", json!(data)))
}

pub async fn get_purchase(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<RequestIdentity>,
    Path(id): Path<String>,
) -> Result<Response, Response> {
    authz::permit(&identity, &PURCHASES_READ)?;
    let id: PurchaseId = errors::parse_id(&id)?;

    let purchase = services
        .purchases
        .find_purchase(id)
        .await
        .map_err(errors::store_error_to_response)?
        .ok_or_else(|| errors::domain_error_to_response(DomainError::not_found("Purchase not found.")))?;
    let agent = services
        .identity
        .find_agent(purchase.agent_id)
        .await
        .map_err(errors::store_error_to_response)?;

    Ok(dto::success(
        StatusCode::OK,
        "Purchase retrieved",
        dto::purchase_to_json(&purchase, agent.as_ref()),
    ))
}
