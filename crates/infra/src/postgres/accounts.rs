use sqlx::{PgConnection, PgPool};

use agora_core::{StoreError, StoreResult};
use agora_identity::store::{DUPLICATE_BUSINESS_NAME, DUPLICATE_EMAIL};
use agora_identity::{Account, Agent, Distributor, InsuranceCompany, Profile};

use super::{map_sqlx_error, rows, uuid_opt, violated_unique_constraint};

const BUSINESS_NAME_CONSTRAINT: &str = "distributors_business_name_key";

/// Claim the email, then insert account and profile, in one transaction.
pub(super) async fn register(pool: &PgPool, account: &Account, profile: &Profile) -> StoreResult<()> {
    let mut tx = pool
        .begin()
        .await
        .map_err(|e| map_sqlx_error("register_account", e))?;

    sqlx::query("INSERT INTO account_emails (email, account_type) VALUES ($1, $2)")
        .bind(account.email().as_str())
        .bind(account.role().as_str())
        .execute(&mut *tx)
        .await
        .map_err(|e| registration_error("claim_email", e))?;

    match account {
        Account::Agent(agent) => insert_agent(&mut tx, agent).await,
        Account::Distributor(distributor) => insert_distributor(&mut tx, distributor).await,
        Account::InsuranceCompany(company) => insert_insurance_company(&mut tx, company).await,
    }
    .map_err(|e| registration_error("insert_account", e))?;

    insert_profile(&mut tx, profile)
        .await
        .map_err(|e| registration_error("insert_profile", e))?;

    tx.commit()
        .await
        .map_err(|e| map_sqlx_error("register_account.commit", e))
}

/// Unique violations become the field-level duplicates callers understand.
fn registration_error(operation: &str, err: sqlx::Error) -> StoreError {
    match violated_unique_constraint(&err).as_deref() {
        Some(BUSINESS_NAME_CONSTRAINT) => StoreError::duplicate(DUPLICATE_BUSINESS_NAME),
        Some(_) => StoreError::duplicate(DUPLICATE_EMAIL),
        None => map_sqlx_error(operation, err),
    }
}

async fn insert_agent(conn: &mut PgConnection, agent: &Agent) -> Result<(), sqlx::Error> {
    let sql = format!(
        "INSERT INTO agents ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)",
        rows::AGENT_COLUMNS
    );
    sqlx::query(&sql)
        .bind(agent.id.as_uuid())
        .bind(&agent.firstname)
        .bind(&agent.lastname)
        .bind(agent.email.as_str())
        .bind(&agent.password_hash)
        .bind(&agent.phone_number)
        .bind(agent.otp_verified)
        .bind(agent.kyc_status.as_str())
        .bind(&agent.kyc_document_url)
        .bind(agent.is_approved)
        .bind(agent.is_active)
        .bind(agent.account_type.as_str())
        .bind(uuid_opt(agent.distributor_id))
        .bind(uuid_opt(agent.profile_id))
        .bind(agent.created_at)
        .bind(agent.updated_at)
        .execute(conn)
        .await?;
    Ok(())
}

async fn insert_distributor(conn: &mut PgConnection, distributor: &Distributor) -> Result<(), sqlx::Error> {
    let sql = format!(
        "INSERT INTO distributors ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)",
        rows::DISTRIBUTOR_COLUMNS
    );
    sqlx::query(&sql)
        .bind(distributor.id.as_uuid())
        .bind(&distributor.business_name)
        .bind(&distributor.representative_name)
        .bind(distributor.email.as_str())
        .bind(&distributor.password_hash)
        .bind(&distributor.contact_email)
        .bind(&distributor.phone_number)
        .bind(distributor.otp_verified)
        .bind(distributor.email_verified)
        .bind(distributor.phone_verified)
        .bind(distributor.kyb_status.as_str())
        .bind(distributor.kyc_status.as_str())
        .bind(&distributor.kyc_document_url)
        .bind(&distributor.business_document_url)
        .bind(distributor.is_active)
        .bind(uuid_opt(distributor.profile_id))
        .bind(distributor.created_at)
        .bind(distributor.updated_at)
        .execute(conn)
        .await?;
    Ok(())
}

async fn insert_insurance_company(conn: &mut PgConnection, company: &InsuranceCompany) -> Result<(), sqlx::Error> {
    let sql = format!(
        "INSERT INTO insurance_companies ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)",
        rows::INSURANCE_COLUMNS
    );
    sqlx::query(&sql)
        .bind(company.id.as_uuid())
        .bind(company.email.as_str())
        .bind(&company.password_hash)
        .bind(&company.company_name)
        .bind(&company.contact_email)
        .bind(&company.contact_phone)
        .bind(company.kyb_status.as_str())
        .bind(company.kyc_status.as_str())
        .bind(company.is_verified)
        .bind(company.otp_verified)
        .bind(company.email_verified)
        .bind(company.phone_verified)
        .bind(&company.kyc_document_url)
        .bind(&company.business_document_url)
        .bind(company.is_active)
        .bind(uuid_opt(company.profile_id))
        .bind(company.created_at)
        .bind(company.updated_at)
        .execute(conn)
        .await?;
    Ok(())
}

async fn insert_profile(conn: &mut PgConnection, profile: &Profile) -> Result<(), sqlx::Error> {
    let sql = format!(
        "INSERT INTO profiles ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        rows::PROFILE_COLUMNS
    );
    sqlx::query(&sql)
        .bind(profile.id.as_uuid())
        .bind(&profile.display_name)
        .bind(profile.email.as_str())
        .bind(&profile.phone_number)
        .bind(profile.account_type.as_str())
        .bind(&profile.profile_image)
        .bind(&profile.address)
        .bind(&profile.bio)
        .bind(&profile.city)
        .bind(&profile.country)
        .bind(profile.created_at)
        .execute(conn)
        .await?;
    Ok(())
}
