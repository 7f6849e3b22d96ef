use async_trait::async_trait;

use agora_core::{AgentId, ApprovalRequestId, DistributorId, Email, StoreResult};
use agora_identity::{Agent, Distributor};

use crate::ApprovalRequest;

/// Opens workflow transactions.
#[async_trait]
pub trait AffiliationStore: Send + Sync {
    async fn begin(&self) -> StoreResult<Box<dyn AffiliationTx>>;
}

/// One unit of work over agents, distributors and approval requests.
///
/// Dropping a transaction without calling [`AffiliationTx::commit`] discards
/// every write made through it. Implementations serialize transactions that
/// touch the same agent: `find_agent` holds the agent until the transaction
/// ends.
#[async_trait]
pub trait AffiliationTx: Send {
    async fn find_agent(&mut self, id: AgentId) -> StoreResult<Option<Agent>>;
    async fn find_distributor(&mut self, id: DistributorId) -> StoreResult<Option<Distributor>>;
    async fn find_distributor_by_email(&mut self, email: &Email) -> StoreResult<Option<Distributor>>;
    async fn save_agent(&mut self, agent: &Agent) -> StoreResult<()>;

    async fn find_request(&mut self, id: ApprovalRequestId) -> StoreResult<Option<ApprovalRequest>>;
    async fn find_pending_request(
        &mut self,
        agent_id: AgentId,
        distributor_id: DistributorId,
    ) -> StoreResult<Option<ApprovalRequest>>;
    async fn list_pending_for_agent(&mut self, agent_id: AgentId) -> StoreResult<Vec<ApprovalRequest>>;
    /// Requests addressed to `distributor_id`, oldest first.
    async fn list_requests_for_distributor(
        &mut self,
        distributor_id: DistributorId,
    ) -> StoreResult<Vec<ApprovalRequest>>;
    async fn insert_request(&mut self, request: &ApprovalRequest) -> StoreResult<()>;
    async fn update_request(&mut self, request: &ApprovalRequest) -> StoreResult<()>;

    async fn commit(self: Box<Self>) -> StoreResult<()>;
}
