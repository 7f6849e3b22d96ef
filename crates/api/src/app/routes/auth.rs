//! Registration, login and token refresh.
//!
//! Every successful registration or login answers with a fresh token pair and
//! the account record; refresh exchanges a refresh token for a new access token.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::Response,
};
use chrono::Utc;
use serde_json::json;

use agora_auth::permissions::ACCOUNTS_REGISTER_ADMIN;
use agora_auth::{Role, TokenKind};
use agora_core::ServiceError;
use agora_identity::{
    accounts, Account, AgentRegistration, DistributorRegistration, InsuranceRegistration, LoginRequest,
};

use crate::app::errors::{self, ApiJson};
use crate::app::dto;
use crate::app::services::AppServices;
use crate::authz;
use crate::context::RequestIdentity;
use crate::middleware::{self, AuthState};

const ACCOUNT_CREATED: &str = "Account Created Successfully!";

pub async fn register_agent(
    Extension(services): Extension<Arc<AppServices>>,
    ApiJson(body): ApiJson<AgentRegistration>,
) -> Result<Response, Response> {
    let agent = accounts::register_agent(
        services.identity.as_ref(),
        &services.hasher,
        &body,
        Role::Agent,
        Utc::now(),
    )
    .await
    .map_err(errors::service_error_to_response)?;

    session(&services, &Account::Agent(agent), StatusCode::CREATED, ACCOUNT_CREATED)
}

pub async fn register_admin(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<RequestIdentity>,
    ApiJson(body): ApiJson<AgentRegistration>,
) -> Result<Response, Response> {
    authz::guard(&identity, Role::Admin, &ACCOUNTS_REGISTER_ADMIN)?;

    let admin = accounts::register_agent(
        services.identity.as_ref(),
        &services.hasher,
        &body,
        Role::Admin,
        Utc::now(),
    )
    .await
    .map_err(errors::service_error_to_response)?;

    tracing::info!(by = %identity.email(), agent_id = %admin.id, "administrator registered");
    session(&services, &Account::Agent(admin), StatusCode::CREATED, ACCOUNT_CREATED)
}

pub async fn register_distributor(
    Extension(services): Extension<Arc<AppServices>>,
    ApiJson(body): ApiJson<DistributorRegistration>,
) -> Result<Response, Response> {
    let distributor =
        accounts::register_distributor(services.identity.as_ref(), &services.hasher, &body, Utc::now())
            .await
            .map_err(errors::service_error_to_response)?;

    session(
        &services,
        &Account::Distributor(distributor),
        StatusCode::CREATED,
        ACCOUNT_CREATED,
    )
}

pub async fn register_insurance_company(
    Extension(services): Extension<Arc<AppServices>>,
    ApiJson(body): ApiJson<InsuranceRegistration>,
) -> Result<Response, Response> {
    let company =
        accounts::register_insurance_company(services.identity.as_ref(), &services.hasher, &body, Utc::now())
            .await
            .map_err(errors::service_error_to_response)?;

    session(
        &services,
        &Account::InsuranceCompany(company),
        StatusCode::CREATED,
        ACCOUNT_CREATED,
    )
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<Response, Response> {
    let account = accounts::login(services.identity.as_ref(), &services.hasher, &body)
        .await
        .map_err(errors::service_error_to_response)?;

    session(&services, &account, StatusCode::OK, "Login successful")
}

/// Exchange a refresh token (in the `Authorization` header) for a new access token.
pub async fn refresh(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(auth): Extension<AuthState>,
    headers: HeaderMap,
) -> Result<Response, Response> {
    let identity = middleware::authenticate(&auth, &headers, TokenKind::Refresh)?;

    let access_token = services
        .tokens
        .issue(identity.email().as_str(), identity.role(), TokenKind::Access, Utc::now())
        .map_err(|e| errors::service_error_to_response(ServiceError::internal(e.to_string())))?;

    Ok(dto::success(
        StatusCode::OK,
        "Token refreshed",
        json!({ "accessToken": access_token }),
    ))
}

fn session(
    services: &AppServices,
    account: &Account,
    status: StatusCode,
    message: &str,
) -> Result<Response, Response> {
    let tokens = services
        .tokens
        .issue_pair(account.email().as_str(), account.role(), Utc::now())
        .map_err(|e| errors::service_error_to_response(ServiceError::internal(e.to_string())))?;

    Ok(dto::success(status, message, dto::session_to_json(&tokens, account)))
}
