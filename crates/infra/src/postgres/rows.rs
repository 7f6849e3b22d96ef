//! Row decoding and column constants.

use std::str::FromStr;

use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

use agora_affiliation::ApprovalRequest;
use agora_core::{
    AgentId, ApprovalRequestId, DistributorId, Email, InsuranceCompanyId, ProfileId, PurchaseId,
    StoreError, StoreResult,
};
use agora_identity::{Agent, Distributor, InsuranceCompany, Profile};
use agora_purchasing::Purchase;

pub(crate) const AGENT_COLUMNS: &str = "id, firstname, lastname, email, password_hash, phone_number, \
     otp_verified, kyc_status, kyc_document_url, is_approved, is_active, account_type, \
     distributor_id, profile_id, created_at, updated_at";

pub(crate) const DISTRIBUTOR_COLUMNS: &str = "id, business_name, representative_name, email, \
     password_hash, contact_email, phone_number, otp_verified, email_verified, phone_verified, \
     kyb_status, kyc_status, kyc_document_url, business_document_url, is_active, profile_id, \
     created_at, updated_at";

pub(crate) const INSURANCE_COLUMNS: &str = "id, email, password_hash, company_name, contact_email, \
     contact_phone, kyb_status, kyc_status, is_verified, otp_verified, email_verified, \
     phone_verified, kyc_document_url, business_document_url, is_active, profile_id, created_at, \
     updated_at";

pub(crate) const PROFILE_COLUMNS: &str = "id, display_name, email, phone_number, account_type, \
     profile_image, address, bio, city, country, created_at";

pub(crate) const REQUEST_COLUMNS: &str = "id, agent_id, distributor_id, status, created_at, decided_at";

pub(crate) const PURCHASE_COLUMNS: &str = "id, firstname, lastname, email, phone_number, \
     product_category, product, receipt_image, product_image, purchase_status, purchase_date, \
     purchase_secret, agent_id, distributor_id";

fn col<'r, T>(row: &'r PgRow, name: &str) -> StoreResult<T>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get(name)
        .map_err(|e| StoreError::corrupt(format!("column {name}: {e}")))
}

fn parsed<T>(row: &PgRow, name: &str) -> StoreResult<T>
where
    T: FromStr<Err = String>,
{
    let raw: String = col(row, name)?;
    raw.parse()
        .map_err(|e: String| StoreError::corrupt(format!("column {name}: {e}")))
}

fn email(row: &PgRow) -> StoreResult<Email> {
    Ok(Email::from_trusted(col::<String>(row, "email")?))
}

pub(crate) fn agent(row: &PgRow) -> StoreResult<Agent> {
    Ok(Agent {
        id: AgentId::from_uuid(col(row, "id")?),
        firstname: col(row, "firstname")?,
        lastname: col(row, "lastname")?,
        email: email(row)?,
        password_hash: col(row, "password_hash")?,
        phone_number: col(row, "phone_number")?,
        otp_verified: col(row, "otp_verified")?,
        kyc_status: parsed(row, "kyc_status")?,
        kyc_document_url: col(row, "kyc_document_url")?,
        is_approved: col(row, "is_approved")?,
        is_active: col(row, "is_active")?,
        account_type: parsed(row, "account_type")?,
        distributor_id: col::<Option<Uuid>>(row, "distributor_id")?.map(DistributorId::from_uuid),
        profile_id: col::<Option<Uuid>>(row, "profile_id")?.map(ProfileId::from_uuid),
        created_at: col(row, "created_at")?,
        updated_at: col(row, "updated_at")?,
    })
}

pub(crate) fn distributor(row: &PgRow) -> StoreResult<Distributor> {
    Ok(Distributor {
        id: DistributorId::from_uuid(col(row, "id")?),
        business_name: col(row, "business_name")?,
        representative_name: col(row, "representative_name")?,
        email: email(row)?,
        password_hash: col(row, "password_hash")?,
        contact_email: col(row, "contact_email")?,
        phone_number: col(row, "phone_number")?,
        otp_verified: col(row, "otp_verified")?,
        email_verified: col(row, "email_verified")?,
        phone_verified: col(row, "phone_verified")?,
        kyb_status: parsed(row, "kyb_status")?,
        kyc_status: parsed(row, "kyc_status")?,
        kyc_document_url: col(row, "kyc_document_url")?,
        business_document_url: col(row, "business_document_url")?,
        is_active: col(row, "is_active")?,
        profile_id: col::<Option<Uuid>>(row, "profile_id")?.map(ProfileId::from_uuid),
        created_at: col(row, "created_at")?,
        updated_at: col(row, "updated_at")?,
    })
}

pub(crate) fn insurance_company(row: &PgRow) -> StoreResult<InsuranceCompany> {
    Ok(InsuranceCompany {
        id: InsuranceCompanyId::from_uuid(col(row, "id")?),
        email: email(row)?,
        password_hash: col(row, "password_hash")?,
        company_name: col(row, "company_name")?,
        contact_email: col(row, "contact_email")?,
        contact_phone: col(row, "contact_phone")?,
        kyb_status: parsed(row, "kyb_status")?,
        kyc_status: parsed(row, "kyc_status")?,
        is_verified: col(row, "is_verified")?,
        otp_verified: col(row, "otp_verified")?,
        email_verified: col(row, "email_verified")?,
        phone_verified: col(row, "phone_verified")?,
        kyc_document_url: col(row, "kyc_document_url")?,
        business_document_url: col(row, "business_document_url")?,
        is_active: col(row, "is_active")?,
        profile_id: col::<Option<Uuid>>(row, "profile_id")?.map(ProfileId::from_uuid),
        created_at: col(row, "created_at")?,
        updated_at: col(row, "updated_at")?,
    })
}

pub(crate) fn profile(row: &PgRow) -> StoreResult<Profile> {
    Ok(Profile {
        id: ProfileId::from_uuid(col(row, "id")?),
        display_name: col(row, "display_name")?,
        email: email(row)?,
        phone_number: col(row, "phone_number")?,
        account_type: parsed(row, "account_type")?,
        profile_image: col(row, "profile_image")?,
        address: col(row, "address")?,
        bio: col(row, "bio")?,
        city: col(row, "city")?,
        country: col(row, "country")?,
        created_at: col(row, "created_at")?,
    })
}

pub(crate) fn approval_request(row: &PgRow) -> StoreResult<ApprovalRequest> {
    Ok(ApprovalRequest {
        id: ApprovalRequestId::from_uuid(col(row, "id")?),
        agent_id: AgentId::from_uuid(col(row, "agent_id")?),
        distributor_id: DistributorId::from_uuid(col(row, "distributor_id")?),
        status: parsed(row, "status")?,
        created_at: col(row, "created_at")?,
        decided_at: col(row, "decided_at")?,
    })
}

pub(crate) fn purchase(row: &PgRow) -> StoreResult<Purchase> {
    Ok(Purchase {
        id: PurchaseId::from_uuid(col(row, "id")?),
        firstname: col(row, "firstname")?,
        lastname: col(row, "lastname")?,
        email: email(row)?,
        phone_number: col(row, "phone_number")?,
        product_category: col(row, "product_category")?,
        product: col(row, "product")?,
        receipt_image: col(row, "receipt_image")?,
        product_image: col(row, "product_image")?,
        purchase_status: parsed(row, "purchase_status")?,
        purchase_date: col(row, "purchase_date")?,
        purchase_secret: col(row, "purchase_secret")?,
        agent_id: AgentId::from_uuid(col(row, "agent_id")?),
        distributor_id: col::<Option<Uuid>>(row, "distributor_id")?.map(DistributorId::from_uuid),
    })
}

/// Decode every row with `decode`, stopping at the first failure.
pub(crate) fn all<T>(rows: &[PgRow], decode: fn(&PgRow) -> StoreResult<T>) -> StoreResult<Vec<T>> {
    rows.iter().map(decode).collect()
}
