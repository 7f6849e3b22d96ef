//! Account services: registration, login and administrator bootstrap.

use chrono::{DateTime, Utc};
use tracing::{info, instrument, warn};

use agora_auth::{PasswordHasher, Role};
use agora_core::{Email, ServiceError, ServiceResult, StoreError, StoreResult, ValidationErrors};

use crate::store::{DUPLICATE_BUSINESS_NAME, DUPLICATE_EMAIL};
use crate::{
    Agent, AgentRegistration, Distributor, DistributorRegistration, IdentityStore,
    InsuranceCompany, InsuranceRegistration, LoginRequest, Profile,
};

const EMAIL_TAKEN: &str = "Email is already registered.";
const BUSINESS_TAKEN: &str = "Business is already registered.";
const LOGIN_FAILED: &str = "Invalid email or password";

/// Any account that can log in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Account {
    Agent(Agent),
    Distributor(Distributor),
    InsuranceCompany(InsuranceCompany),
}

impl Account {
    pub fn role(&self) -> Role {
        match self {
            Account::Agent(a) => a.account_type,
            Account::Distributor(_) => Role::Distributor,
            Account::InsuranceCompany(_) => Role::InsuranceCompany,
        }
    }

    pub fn email(&self) -> &Email {
        match self {
            Account::Agent(a) => &a.email,
            Account::Distributor(d) => &d.email,
            Account::InsuranceCompany(c) => &c.email,
        }
    }

    fn password_hash(&self) -> &str {
        match self {
            Account::Agent(a) => &a.password_hash,
            Account::Distributor(d) => &d.password_hash,
            Account::InsuranceCompany(c) => &c.password_hash,
        }
    }
}

/// Resolve an email to whichever account kind owns it.
pub async fn find_account<S>(store: &S, email: &Email) -> StoreResult<Option<Account>>
where
    S: IdentityStore + ?Sized,
{
    if let Some(agent) = store.find_agent_by_email(email).await? {
        return Ok(Some(Account::Agent(agent)));
    }
    if let Some(distributor) = store.find_distributor_by_email(email).await? {
        return Ok(Some(Account::Distributor(distributor)));
    }
    Ok(store
        .find_insurance_company_by_email(email)
        .await?
        .map(Account::InsuranceCompany))
}

async fn check_email_free<S>(store: &S, errors: &mut ValidationErrors, email: Option<&Email>) -> StoreResult<()>
where
    S: IdentityStore + ?Sized,
{
    if let Some(email) = email {
        if find_account(store, email).await?.is_some() {
            errors.add("email", EMAIL_TAKEN);
        }
    }
    Ok(())
}

async fn hash_password(hasher: &PasswordHasher, plain: &str) -> ServiceResult<String> {
    hasher
        .hash_blocking(plain)
        .await
        .map_err(|e| ServiceError::internal(e.to_string()))
}

/// Store the account and its profile atomically.
///
/// The uniqueness pre-checks only produce friendly errors; a registration that
/// races past them is refused here with the same field messages.
async fn persist<S>(store: &S, account: &Account, profile: &Profile) -> ServiceResult<()>
where
    S: IdentityStore + ?Sized,
{
    match store.register_account(account, profile).await {
        Ok(()) => Ok(()),
        Err(StoreError::Duplicate(what)) if what == DUPLICATE_EMAIL => {
            warn!(role = %account.role(), "email claimed concurrently");
            Err(ValidationErrors::single("email", EMAIL_TAKEN).into())
        }
        Err(StoreError::Duplicate(what)) if what == DUPLICATE_BUSINESS_NAME => {
            warn!("business name claimed concurrently");
            Err(ValidationErrors::single("business_name", BUSINESS_TAKEN).into())
        }
        Err(e) => Err(e.into()),
    }
}

/// Register an agent (or, with `account_type = Role::Admin`, an administrator).
#[instrument(skip_all, fields(account_type = %account_type))]
pub async fn register_agent<S>(
    store: &S,
    hasher: &PasswordHasher,
    input: &AgentRegistration,
    account_type: Role,
    now: DateTime<Utc>,
) -> ServiceResult<Agent>
where
    S: IdentityStore + ?Sized,
{
    let (mut errors, email) = input.check();
    check_email_free(store, &mut errors, email.as_ref()).await?;
    errors.into_result()?;
    let email = email.ok_or_else(|| ValidationErrors::single("email", "Email field is blank."))?;

    let password_hash = hash_password(hasher, &input.password).await?;
    let firstname = input.firstname.trim().to_string();
    let lastname = input.lastname.trim().to_string();

    let profile = Profile::new(
        format!("{firstname} {lastname}"),
        email.clone(),
        input.phone_number.clone(),
        account_type,
        now,
    );
    let mut agent = Agent::new(firstname, lastname, email, password_hash, account_type, now);
    agent.phone_number = input.phone_number.clone();
    agent.profile_id = Some(profile.id);

    persist(store, &Account::Agent(agent.clone()), &profile).await?;
    info!(agent_id = %agent.id, "account registered");
    Ok(agent)
}

#[instrument(skip_all)]
pub async fn register_distributor<S>(
    store: &S,
    hasher: &PasswordHasher,
    input: &DistributorRegistration,
    now: DateTime<Utc>,
) -> ServiceResult<Distributor>
where
    S: IdentityStore + ?Sized,
{
    let (mut errors, email) = input.check();
    check_email_free(store, &mut errors, email.as_ref()).await?;
    let business_name = input.business_name.trim().to_string();
    if !errors.has("business_name")
        && store.find_distributor_by_business_name(&business_name).await?.is_some()
    {
        errors.add("business_name", BUSINESS_TAKEN);
    }
    errors.into_result()?;
    let email = email.ok_or_else(|| ValidationErrors::single("email", "Email field is blank."))?;

    let password_hash = hash_password(hasher, &input.password).await?;
    let profile = Profile::new(
        input.representative_name.trim().to_string(),
        email.clone(),
        input.phone_number.clone(),
        Role::Distributor,
        now,
    );
    let mut distributor = Distributor::new(
        business_name,
        input.representative_name.trim().to_string(),
        email,
        password_hash,
        now,
    );
    distributor.contact_email = input
        .contact_email
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string);
    distributor.phone_number = input.phone_number.clone();
    distributor.profile_id = Some(profile.id);

    persist(store, &Account::Distributor(distributor.clone()), &profile).await?;
    info!(distributor_id = %distributor.id, "distributor registered");
    Ok(distributor)
}

#[instrument(skip_all)]
pub async fn register_insurance_company<S>(
    store: &S,
    hasher: &PasswordHasher,
    input: &InsuranceRegistration,
    now: DateTime<Utc>,
) -> ServiceResult<InsuranceCompany>
where
    S: IdentityStore + ?Sized,
{
    let (mut errors, email) = input.check();
    check_email_free(store, &mut errors, email.as_ref()).await?;
    errors.into_result()?;
    let email = email.ok_or_else(|| ValidationErrors::single("email", "Email field is blank."))?;

    let password_hash = hash_password(hasher, &input.password).await?;
    let profile = Profile::new(
        input.company_name.trim().to_string(),
        email.clone(),
        Some(input.contact_phone.trim().to_string()),
        Role::InsuranceCompany,
        now,
    );
    let mut company = InsuranceCompany::new(
        input.company_name.trim().to_string(),
        email,
        password_hash,
        input.contact_email.trim().to_lowercase(),
        input.contact_phone.trim().to_string(),
        now,
    );
    company.profile_id = Some(profile.id);

    persist(store, &Account::InsuranceCompany(company.clone()), &profile).await?;
    info!(insurance_company_id = %company.id, "insurance company registered");
    Ok(company)
}

/// Verify credentials against every account kind.
///
/// An unknown email and a wrong password fail with the same message.
#[instrument(skip_all)]
pub async fn login<S>(store: &S, hasher: &PasswordHasher, input: &LoginRequest) -> ServiceResult<Account>
where
    S: IdentityStore + ?Sized,
{
    let email = input.check()?;
    let Some(account) = find_account(store, &email).await? else {
        warn!("login for unknown email");
        return Err(ValidationErrors::single("email", LOGIN_FAILED).into());
    };
    if !hasher.verify_blocking(&input.password, account.password_hash()).await {
        warn!(role = %account.role(), "login with wrong password");
        return Err(ValidationErrors::single("password", LOGIN_FAILED).into());
    }
    Ok(account)
}

/// Create the configured administrator unless an account already owns the email.
///
/// Returns `None` when nothing was created.
#[instrument(skip_all, fields(email = %email))]
pub async fn bootstrap_admin<S>(
    store: &S,
    hasher: &PasswordHasher,
    email: &Email,
    password: &str,
    now: DateTime<Utc>,
) -> ServiceResult<Option<Agent>>
where
    S: IdentityStore + ?Sized,
{
    if find_account(store, email).await?.is_some() {
        info!("administrator account already present");
        return Ok(None);
    }

    let password_hash = hash_password(hasher, password).await?;
    let profile = Profile::new("Administrator".to_string(), email.clone(), None, Role::Admin, now);
    let mut admin = Agent::new(
        "Admin".to_string(),
        "Account".to_string(),
        email.clone(),
        password_hash,
        Role::Admin,
        now,
    );
    admin.is_active = true;
    admin.is_approved = true;
    admin.profile_id = Some(profile.id);

    match store.register_account(&Account::Agent(admin.clone()), &profile).await {
        Ok(()) => {}
        Err(StoreError::Duplicate(_)) => {
            info!("administrator created concurrently");
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    }
    info!(agent_id = %admin.id, "administrator bootstrapped");
    Ok(Some(admin))
}
