use async_trait::async_trait;
use tokio::sync::OwnedMutexGuard;

use agora_affiliation::{AffiliationTx, ApprovalRequest};
use agora_core::{AgentId, ApprovalRequestId, DistributorId, Email, StoreResult};
use agora_identity::{Agent, Distributor};

use super::State;

/// Exclusive transaction over the in-memory state.
///
/// Writes go to a copy taken on the first write; `commit` swaps the copy in.
/// Dropping the transaction releases the lock and discards the copy.
pub struct InMemoryTx {
    guard: OwnedMutexGuard<State>,
    work: Option<State>,
}

impl InMemoryTx {
    pub(crate) fn new(guard: OwnedMutexGuard<State>) -> Self {
        Self { guard, work: None }
    }

    fn view(&self) -> &State {
        let committed: &State = &self.guard;
        self.work.as_ref().unwrap_or(committed)
    }

    fn work(&mut self) -> &mut State {
        let committed: &State = &self.guard;
        self.work.get_or_insert_with(|| committed.clone())
    }
}

#[async_trait]
impl AffiliationTx for InMemoryTx {
    async fn find_agent(&mut self, id: AgentId) -> StoreResult<Option<Agent>> {
        Ok(self.view().agents.get(id).cloned())
    }

    async fn find_distributor(&mut self, id: DistributorId) -> StoreResult<Option<Distributor>> {
        Ok(self.view().distributors.get(id).cloned())
    }

    async fn find_distributor_by_email(&mut self, email: &Email) -> StoreResult<Option<Distributor>> {
        Ok(self.view().distributors.find(|d| &d.email == email).cloned())
    }

    async fn save_agent(&mut self, agent: &Agent) -> StoreResult<()> {
        self.work().save_agent(agent)
    }

    async fn find_request(&mut self, id: ApprovalRequestId) -> StoreResult<Option<ApprovalRequest>> {
        Ok(self.view().requests.get(id).cloned())
    }

    async fn find_pending_request(
        &mut self,
        agent_id: AgentId,
        distributor_id: DistributorId,
    ) -> StoreResult<Option<ApprovalRequest>> {
        Ok(self.view().pending_request(agent_id, distributor_id).cloned())
    }

    async fn list_pending_for_agent(&mut self, agent_id: AgentId) -> StoreResult<Vec<ApprovalRequest>> {
        Ok(self
            .view()
            .requests
            .filtered(|r| r.agent_id == agent_id && r.is_pending()))
    }

    async fn list_requests_for_distributor(
        &mut self,
        distributor_id: DistributorId,
    ) -> StoreResult<Vec<ApprovalRequest>> {
        Ok(self
            .view()
            .requests
            .filtered(|r| r.distributor_id == distributor_id))
    }

    async fn insert_request(&mut self, request: &ApprovalRequest) -> StoreResult<()> {
        self.work().insert_request(request)
    }

    async fn update_request(&mut self, request: &ApprovalRequest) -> StoreResult<()> {
        self.work().update_request(request)
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let InMemoryTx { mut guard, work } = *self;
        if let Some(work) = work {
            *guard = work;
        }
        Ok(())
    }
}
