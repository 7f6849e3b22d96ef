use async_trait::async_trait;

use agora_core::{AgentId, DistributorId, Email, StoreResult};

use crate::{Account, Agent, Distributor, InsuranceCompany, Profile};

/// `StoreError::Duplicate` payload when another account already owns the email.
pub const DUPLICATE_EMAIL: &str = "email";

/// `StoreError::Duplicate` payload when another distributor owns the business name.
pub const DUPLICATE_BUSINESS_NAME: &str = "business_name";

/// Persistence boundary for account records.
///
/// Lookups by email expect an already-normalized [`Email`].
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Store `account` together with its `profile` as one unit of work.
    ///
    /// The email is unique across every account kind and a distributor's business
    /// name across distributors. A collision fails with
    /// `StoreError::Duplicate(DUPLICATE_EMAIL)` or
    /// `StoreError::Duplicate(DUPLICATE_BUSINESS_NAME)` and writes nothing.
    async fn register_account(&self, account: &Account, profile: &Profile) -> StoreResult<()>;

    async fn find_agent(&self, id: AgentId) -> StoreResult<Option<Agent>>;
    async fn find_agent_by_email(&self, email: &Email) -> StoreResult<Option<Agent>>;
    async fn list_agents(&self) -> StoreResult<Vec<Agent>>;
    async fn list_agents_for_distributor(&self, id: DistributorId) -> StoreResult<Vec<Agent>>;

    async fn find_distributor(&self, id: DistributorId) -> StoreResult<Option<Distributor>>;
    async fn find_distributor_by_email(&self, email: &Email) -> StoreResult<Option<Distributor>>;
    async fn find_distributor_by_business_name(&self, name: &str) -> StoreResult<Option<Distributor>>;
    async fn list_distributors(&self) -> StoreResult<Vec<Distributor>>;

    async fn find_insurance_company_by_email(&self, email: &Email) -> StoreResult<Option<InsuranceCompany>>;

    async fn find_profile_by_email(&self, email: &Email) -> StoreResult<Option<Profile>>;
}
