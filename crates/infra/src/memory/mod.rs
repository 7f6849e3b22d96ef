//! Process-local store.
//!
//! All data sits behind one async mutex. Plain store calls hold it for a
//! single read or write; a workflow transaction holds it from `begin` until it
//! is committed or dropped, so transactions never interleave.

mod table;
mod tx;

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use agora_affiliation::{AffiliationStore, AffiliationTx, ApprovalRequest};
use agora_core::{AgentId, DistributorId, Email, PurchaseId, StoreError, StoreResult};
use agora_identity::store::{DUPLICATE_BUSINESS_NAME, DUPLICATE_EMAIL};
use agora_identity::{Account, Agent, Distributor, IdentityStore, InsuranceCompany, Profile};
use agora_purchasing::{Purchase, PurchaseStore};

use table::Table;
pub use tx::InMemoryTx;

#[derive(Debug, Clone, Default)]
pub(crate) struct State {
    agents: Table<Agent>,
    distributors: Table<Distributor>,
    insurance_companies: Table<InsuranceCompany>,
    profiles: Table<Profile>,
    requests: Table<ApprovalRequest>,
    purchases: Table<Purchase>,
}

impl State {
    fn email_taken(&self, email: &Email) -> bool {
        self.agents.any(|a| &a.email == email)
            || self.distributors.any(|d| &d.email == email)
            || self.insurance_companies.any(|c| &c.email == email)
            || self.profiles.any(|p| &p.email == email)
    }

    /// Check every uniqueness rule first, then write account and profile.
    fn register_account(&mut self, account: &Account, profile: &Profile) -> StoreResult<()> {
        if self.email_taken(account.email()) || self.email_taken(&profile.email) {
            return Err(StoreError::duplicate(DUPLICATE_EMAIL));
        }
        if let Account::Distributor(d) = account {
            if self.distributors.any(|other| other.business_name == d.business_name) {
                return Err(StoreError::duplicate(DUPLICATE_BUSINESS_NAME));
            }
        }
        let id_taken = match account {
            Account::Agent(a) => self.agents.get(a.id).is_some(),
            Account::Distributor(d) => self.distributors.get(d.id).is_some(),
            Account::InsuranceCompany(c) => self.insurance_companies.get(c.id).is_some(),
        };
        if id_taken || self.profiles.get(profile.id).is_some() {
            return Err(StoreError::duplicate(format!("account {}", account.email())));
        }

        match account {
            Account::Agent(a) => self.agents.insert(a.clone()),
            Account::Distributor(d) => self.distributors.insert(d.clone()),
            Account::InsuranceCompany(c) => self.insurance_companies.insert(c.clone()),
        };
        self.profiles.insert(profile.clone());
        Ok(())
    }

    fn save_agent(&mut self, agent: &Agent) -> StoreResult<()> {
        if !self.agents.replace(agent.clone()) {
            return Err(StoreError::corrupt(format!("agent {} vanished mid-transaction", agent.id)));
        }
        Ok(())
    }

    fn pending_request(&self, agent_id: AgentId, distributor_id: DistributorId) -> Option<&ApprovalRequest> {
        self.requests
            .find(|r| r.agent_id == agent_id && r.distributor_id == distributor_id && r.is_pending())
    }

    fn insert_request(&mut self, request: &ApprovalRequest) -> StoreResult<()> {
        if request.is_pending()
            && self
                .pending_request(request.agent_id, request.distributor_id)
                .is_some()
        {
            return Err(StoreError::duplicate("pending approval request for pair"));
        }
        if !self.requests.insert(request.clone()) {
            return Err(StoreError::duplicate(format!("approval request {}", request.id)));
        }
        Ok(())
    }

    fn update_request(&mut self, request: &ApprovalRequest) -> StoreResult<()> {
        if !self.requests.replace(request.clone()) {
            return Err(StoreError::corrupt(format!("approval request {} vanished", request.id)));
        }
        Ok(())
    }

    fn insert_purchase(&mut self, purchase: &Purchase) -> StoreResult<()> {
        if self
            .purchases
            .any(|p| p.purchase_secret == purchase.purchase_secret)
        {
            return Err(StoreError::duplicate("purchase secret"));
        }
        if !self.purchases.insert(purchase.clone()) {
            return Err(StoreError::duplicate(format!("purchase {}", purchase.id)));
        }
        Ok(())
    }
}

/// In-memory implementation of every store trait.
///
/// Cloning shares the underlying state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of approval requests recorded (any status).
    pub async fn request_count(&self) -> usize {
        self.state.lock().await.requests.len()
    }
}

#[async_trait]
impl IdentityStore for InMemoryStore {
    async fn register_account(&self, account: &Account, profile: &Profile) -> StoreResult<()> {
        self.state.lock().await.register_account(account, profile)
    }

    async fn find_agent(&self, id: AgentId) -> StoreResult<Option<Agent>> {
        Ok(self.state.lock().await.agents.get(id).cloned())
    }

    async fn find_agent_by_email(&self, email: &Email) -> StoreResult<Option<Agent>> {
        Ok(self.state.lock().await.agents.find(|a| &a.email == email).cloned())
    }

    async fn list_agents(&self) -> StoreResult<Vec<Agent>> {
        Ok(self.state.lock().await.agents.all())
    }

    async fn list_agents_for_distributor(&self, id: DistributorId) -> StoreResult<Vec<Agent>> {
        Ok(self
            .state
            .lock()
            .await
            .agents
            .filtered(|a| a.distributor_id == Some(id)))
    }

    async fn find_distributor(&self, id: DistributorId) -> StoreResult<Option<Distributor>> {
        Ok(self.state.lock().await.distributors.get(id).cloned())
    }

    async fn find_distributor_by_email(&self, email: &Email) -> StoreResult<Option<Distributor>> {
        Ok(self
            .state
            .lock()
            .await
            .distributors
            .find(|d| &d.email == email)
            .cloned())
    }

    async fn find_distributor_by_business_name(&self, name: &str) -> StoreResult<Option<Distributor>> {
        Ok(self
            .state
            .lock()
            .await
            .distributors
            .find(|d| d.business_name == name)
            .cloned())
    }

    async fn list_distributors(&self) -> StoreResult<Vec<Distributor>> {
        Ok(self.state.lock().await.distributors.all())
    }

    async fn find_insurance_company_by_email(&self, email: &Email) -> StoreResult<Option<InsuranceCompany>> {
        Ok(self
            .state
            .lock()
            .await
            .insurance_companies
            .find(|c| &c.email == email)
            .cloned())
    }

    async fn find_profile_by_email(&self, email: &Email) -> StoreResult<Option<Profile>> {
        Ok(self.state.lock().await.profiles.find(|p| &p.email == email).cloned())
    }
}

#[async_trait]
impl PurchaseStore for InMemoryStore {
    async fn insert_purchase(&self, purchase: &Purchase) -> StoreResult<()> {
        self.state.lock().await.insert_purchase(purchase)
    }

    async fn find_purchase(&self, id: PurchaseId) -> StoreResult<Option<Purchase>> {
        Ok(self.state.lock().await.purchases.get(id).cloned())
    }

    async fn list_purchases(&self) -> StoreResult<Vec<Purchase>> {
        Ok(self.state.lock().await.purchases.all())
    }
}

#[async_trait]
impl AffiliationStore for InMemoryStore {
    async fn begin(&self) -> StoreResult<Box<dyn AffiliationTx>> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        Ok(Box::new(InMemoryTx::new(guard)))
    }
}
