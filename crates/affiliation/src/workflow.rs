//! Affiliation workflow (application-level orchestration).
//!
//! Three operations drive the approval state machine:
//!
//! ```text
//!  (none) --request_approval--> pending --decide(ACCEPTED)--> accepted
//!                                       \--decide(REJECTED)--> rejected
//! ```
//!
//! ## Execution model
//!
//! Every operation opens one [`AffiliationTx`], runs all precondition checks
//! against it, performs its writes and commits. A failed precondition returns
//! early and drops the transaction, so a rejected call never changes the store.
//!
//! The transaction holds the agent (and, when deciding, the request) for its
//! whole lifetime. Two calls touching the same agent therefore run one after
//! the other, which is what keeps "at most one pending request per pair" and
//! "at most one affiliation per agent" true under concurrency.
//!
//! ## Precondition order
//!
//! - `request_approval`: agent exists, distributor exists, agent unaffiliated,
//!   optional exclusive-pending policy, no pending request for the pair.
//! - `list_agent_requests`: distributor resolved from the caller's email; a
//!   single-request lookup that misses is `Forbidden`, not `NotFound`.
//! - `decide`: distributor resolved from the caller's email, request exists,
//!   request addressed to that distributor, request still pending, agent
//!   unaffiliated (for both decisions).
//!
//! This module contains no IO itself; it composes the store traits.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{error, info, instrument, warn};

use agora_core::{
    AgentId, ApprovalRequestId, DistributorId, DomainError, Email, ServiceError, ServiceResult,
    StoreError,
};
use agora_identity::Distributor;

use crate::{AffiliationStore, AffiliationTx, ApprovalRequest, Decision};

pub const REQUEST_SENT: &str = "Approval request sent successfully! Awaiting distributor's response.";

/// Policy switches for the workflow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkflowOptions {
    /// Refuse a new request while the agent has a pending request toward any
    /// other distributor.
    pub exclusive_pending: bool,
}

/// Result of a successful `request_approval`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovalRequested {
    pub request: ApprovalRequest,
    pub message: &'static str,
}

impl ApprovalRequested {
    pub fn agent_id(&self) -> AgentId {
        self.request.agent_id
    }

    pub fn distributor_id(&self) -> DistributorId {
        self.request.distributor_id
    }
}

/// Result of a successful `decide`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionRecorded {
    pub request: ApprovalRequest,
    pub message: String,
}

/// Runs the approval state machine against an [`AffiliationStore`].
pub struct AffiliationWorkflow<S: ?Sized> {
    store: Arc<S>,
    options: WorkflowOptions,
}

impl<S: ?Sized> Clone for AffiliationWorkflow<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            options: self.options,
        }
    }
}

impl<S> AffiliationWorkflow<S>
where
    S: AffiliationStore + ?Sized,
{
    pub fn new(store: Arc<S>, options: WorkflowOptions) -> Self {
        Self { store, options }
    }

    pub fn options(&self) -> WorkflowOptions {
        self.options
    }

    /// Create a pending request from `agent_id` toward `distributor_id`.
    #[instrument(skip_all, fields(agent_id = %agent_id, distributor_id = %distributor_id))]
    pub async fn request_approval(
        &self,
        agent_id: AgentId,
        distributor_id: DistributorId,
        now: DateTime<Utc>,
    ) -> ServiceResult<ApprovalRequested> {
        let outcome = self.try_request_approval(agent_id, distributor_id, now).await;
        log_outcome("request_approval", &outcome);
        let request = outcome?;
        info!(request_id = %request.id, status = %request.status, "approval request created");
        Ok(ApprovalRequested {
            request,
            message: REQUEST_SENT,
        })
    }

    async fn try_request_approval(
        &self,
        agent_id: AgentId,
        distributor_id: DistributorId,
        now: DateTime<Utc>,
    ) -> ServiceResult<ApprovalRequest> {
        let mut tx = self.store.begin().await?;

        let agent = tx
            .find_agent(agent_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Agent not found."))?;
        tx.find_distributor(distributor_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Distributor not found."))?;
        agent.ensure_unaffiliated()?;

        if self.options.exclusive_pending {
            let pending = tx.list_pending_for_agent(agent_id).await?;
            if pending.iter().any(|r| r.distributor_id != distributor_id) {
                return Err(DomainError::conflict(
                    "Agent already has a pending approval request with another Distributor.",
                )
                .into());
            }
        }

        if tx.find_pending_request(agent_id, distributor_id).await?.is_some() {
            return Err(duplicate_pending().into());
        }

        let request = ApprovalRequest::new(agent_id, distributor_id, now);
        tx.insert_request(&request).await.map_err(pending_conflict)?;
        tx.commit().await.map_err(pending_conflict)?;
        Ok(request)
    }

    /// Requests addressed to the distributor that owns `distributor_email`.
    ///
    /// With `request_id`, returns exactly that request or `Forbidden` when it
    /// is not addressed to this distributor (or does not exist).
    #[instrument(skip_all, fields(distributor = %distributor_email))]
    pub async fn list_agent_requests(
        &self,
        distributor_email: &Email,
        request_id: Option<ApprovalRequestId>,
    ) -> ServiceResult<Vec<ApprovalRequest>> {
        let outcome = self.try_list_agent_requests(distributor_email, request_id).await;
        log_outcome("list_agent_requests", &outcome);
        outcome
    }

    async fn try_list_agent_requests(
        &self,
        distributor_email: &Email,
        request_id: Option<ApprovalRequestId>,
    ) -> ServiceResult<Vec<ApprovalRequest>> {
        let mut tx = self.store.begin().await?;
        let distributor = resolve_distributor(&mut *tx, distributor_email).await?;

        let requests = match request_id {
            None => tx.list_requests_for_distributor(distributor.id).await?,
            Some(id) => {
                let request = tx
                    .find_request(id)
                    .await?
                    .filter(|r| r.distributor_id == distributor.id)
                    .ok_or_else(|| DomainError::forbidden("No Data to Display"))?;
                vec![request]
            }
        };
        tx.commit().await?;
        Ok(requests)
    }

    /// Accept or reject a pending request on behalf of the distributor that
    /// owns `distributor_email`. Acceptance affiliates the agent.
    #[instrument(skip_all, fields(distributor = %distributor_email, request_id = %request_id, decision = ?decision))]
    pub async fn decide(
        &self,
        distributor_email: &Email,
        request_id: ApprovalRequestId,
        decision: Decision,
        now: DateTime<Utc>,
    ) -> ServiceResult<DecisionRecorded> {
        let outcome = self.try_decide(distributor_email, request_id, decision, now).await;
        log_outcome("decide", &outcome);
        let request = outcome?;
        info!(agent_id = %request.agent_id, status = %request.status, "approval request decided");
        Ok(DecisionRecorded {
            message: format!("Agent request '{}' successfully!", request.status),
            request,
        })
    }

    async fn try_decide(
        &self,
        distributor_email: &Email,
        request_id: ApprovalRequestId,
        decision: Decision,
        now: DateTime<Utc>,
    ) -> ServiceResult<ApprovalRequest> {
        let mut tx = self.store.begin().await?;
        let distributor = resolve_distributor(&mut *tx, distributor_email).await?;

        let mut request = tx
            .find_request(request_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Agent request not found."))?;
        if request.distributor_id != distributor.id {
            return Err(DomainError::forbidden("You are not allowed to make this request").into());
        }
        request.decide(decision, now)?;

        let mut agent = tx
            .find_agent(request.agent_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Agent not found."))?;
        agent.ensure_unaffiliated()?;

        tx.update_request(&request).await?;
        if decision == Decision::Accepted {
            agent.affiliate(request.distributor_id, now)?;
            tx.save_agent(&agent).await?;
        }
        tx.commit().await?;
        Ok(request)
    }
}

async fn resolve_distributor<T>(tx: &mut T, email: &Email) -> ServiceResult<Distributor>
where
    T: AffiliationTx + ?Sized,
{
    tx.find_distributor_by_email(email)
        .await?
        .ok_or_else(|| DomainError::not_found("Distributor not found.").into())
}

fn duplicate_pending() -> DomainError {
    DomainError::conflict("There is already a pending request for approval with this distributor.")
}

/// A uniqueness violation on insert means another transaction created the
/// pending request first.
fn pending_conflict(err: StoreError) -> ServiceError {
    match err {
        StoreError::Duplicate(_) => duplicate_pending().into(),
        other => other.into(),
    }
}

fn log_outcome<T>(operation: &'static str, outcome: &ServiceResult<T>) {
    match outcome {
        Ok(_) => {}
        Err(ServiceError::Domain(e)) => warn!(operation, error = %e, "affiliation operation rejected"),
        Err(e) => error!(operation, error = %e, "affiliation operation failed"),
    }
}
