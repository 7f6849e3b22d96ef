use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Deserialize;
use serde_json::{Value, json};

use agora_affiliation::ApprovalRequest;
use agora_auth::TokenPair;
use agora_identity::{Account, Agent, Distributor, InsuranceCompany, Profile};
use agora_purchasing::Purchase;

#[derive(Debug, Deserialize)]
pub struct RequestApprovalRequest {
    #[serde(default)]
    pub distributor_id: String,
}

#[derive(Debug, Deserialize)]
pub struct DecideRequest {
    #[serde(default)]
    pub status: String,
}

/// `{"success": true, "message": ..., "data": ...}` with `status`.
pub fn success(status: StatusCode, message: impl Into<String>, data: Value) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "success": true,
            "message": message.into(),
            "data": data,
        })),
    )
        .into_response()
}

pub fn agent_to_json(agent: &Agent) -> Value {
    json!({
        "id": agent.id.to_string(),
        "firstname": agent.firstname,
        "lastname": agent.lastname,
        "email": agent.email.as_str(),
        "phone_number": agent.phone_number,
        "otp_verified": agent.otp_verified,
        "kyc_status": agent.kyc_status.as_str(),
        "kyc_document_url": agent.kyc_document_url,
        "is_approved": agent.is_approved,
        "is_active": agent.is_active,
        "account_type": agent.account_type.as_str(),
        "distributor_id": agent.distributor_id.map(|d| d.to_string()),
        "profile_id": agent.profile_id.map(|p| p.to_string()),
        "created_at": agent.created_at,
        "updated_at": agent.updated_at,
    })
}

pub fn agent_summary_to_json(agent: &Agent) -> Value {
    json!({
        "id": agent.id.to_string(),
        "firstname": agent.firstname,
        "lastname": agent.lastname,
    })
}

pub fn distributor_to_json(distributor: &Distributor, agents: &[Agent]) -> Value {
    json!({
        "id": distributor.id.to_string(),
        "business_name": distributor.business_name,
        "representative_name": distributor.representative_name,
        "email": distributor.email.as_str(),
        "contact_email": distributor.contact_email,
        "phone_number": distributor.phone_number,
        "otp_verified": distributor.otp_verified,
        "email_verified": distributor.email_verified,
        "phone_verified": distributor.phone_verified,
        "kyb_status": distributor.kyb_status.as_str(),
        "kyc_status": distributor.kyc_status.as_str(),
        "kyc_document_url": distributor.kyc_document_url,
        "business_document_url": distributor.business_document_url,
        "is_active": distributor.is_active,
        "profile_id": distributor.profile_id.map(|p| p.to_string()),
        "agents": agents.iter().map(agent_summary_to_json).collect::<Vec<_>>(),
        "created_at": distributor.created_at,
        "updated_at": distributor.updated_at,
    })
}

pub fn distributor_summary_to_json(distributor: &Distributor) -> Value {
    json!({
        "id": distributor.id.to_string(),
        "business_name": distributor.business_name,
        "contact_email": distributor.contact_email,
        "phone_number": distributor.phone_number,
    })
}

pub fn insurance_company_to_json(company: &InsuranceCompany) -> Value {
    json!({
        "id": company.id.to_string(),
        "company_name": company.company_name,
        "email": company.email.as_str(),
        "contact_email": company.contact_email,
        "contact_phone": company.contact_phone,
        "kyb_status": company.kyb_status.as_str(),
        "kyc_status": company.kyc_status.as_str(),
        "is_verified": company.is_verified,
        "is_active": company.is_active,
        "created_at": company.created_at,
    })
}

pub fn account_to_json(account: &Account) -> Value {
    let mut user = match account {
        Account::Agent(a) => agent_to_json(a),
        Account::Distributor(d) => distributor_to_json(d, &[]),
        Account::InsuranceCompany(c) => insurance_company_to_json(c),
    };
    user["role"] = json!(account.role().as_str());
    user
}

/// Registration/login payload: the token pair plus the account.
pub fn session_to_json(tokens: &TokenPair, account: &Account) -> Value {
    json!({
        "accessToken": tokens.access_token,
        "refreshToken": tokens.refresh_token,
        "user": account_to_json(account),
    })
}

pub fn profile_to_json(profile: &Profile) -> Value {
    json!({
        "id": profile.id.to_string(),
        "display_name": profile.display_name,
        "email": profile.email.as_str(),
        "phone_number": profile.phone_number,
        "account_type": profile.account_type.as_str(),
        "profile_image": profile.profile_image,
        "address": profile.address,
        "bio": profile.bio,
        "city": profile.city,
        "country": profile.country,
        "created_at": profile.created_at,
    })
}

pub fn request_to_json(request: &ApprovalRequest) -> Value {
    json!({
        "id": request.id.to_string(),
        "agent_id": request.agent_id.to_string(),
        "distributor_id": request.distributor_id.to_string(),
        "status": request.status.as_str(),
        "created_at": request.created_at,
        "decided_at": request.decided_at,
    })
}

pub fn purchase_to_json(purchase: &Purchase, agent: Option<&Agent>) -> Value {
    json!({
        "id": purchase.id.to_string(),
        "firstname": purchase.firstname,
        "lastname": purchase.lastname,
        "email": purchase.email.as_str(),
        "phone_number": purchase.phone_number,
        "product_category": purchase.product_category,
        "product": purchase.product,
        "receipt_image": purchase.receipt_image,
        "product_image": purchase.product_image,
        "purchase_status": purchase.purchase_status.as_str(),
        "purchase_date": purchase.purchase_date,
        "purchase_secret": purchase.purchase_secret,
        "agent_id": purchase.agent_id.to_string(),
        "distributor_id": purchase.distributor_id.map(|d| d.to_string()),
        "agent": agent.map(agent_summary_to_json),
    })
}
