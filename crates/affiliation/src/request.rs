use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use agora_core::{AgentId, ApprovalRequestId, DistributorId, DomainError, DomainResult, Entity};

/// Lifecycle state of an [`ApprovalRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    Pending,
    Accepted,
    Rejected,
}

impl ApprovalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Accepted => "accepted",
            ApprovalStatus::Rejected => "rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, ApprovalStatus::Pending)
    }
}

impl core::fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for ApprovalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            other => Err(format!("unknown approval status '{other}'")),
        }
    }
}

/// A distributor's answer to a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decision {
    Accepted,
    Rejected,
}

impl Decision {
    /// Parse the wire value (`ACCEPTED` / `REJECTED`, case-sensitive).
    pub fn parse(raw: &str) -> DomainResult<Self> {
        match raw {
            "ACCEPTED" => Ok(Decision::Accepted),
            "REJECTED" => Ok(Decision::Rejected),
            "PENDING" => Err(DomainError::invalid_field(
                "status",
                "A request cannot be moved back to PENDING.",
            )),
            _ => Err(DomainError::invalid_field(
                "status",
                "Status must be one of ACCEPTED or REJECTED.",
            )),
        }
    }

    pub fn status(&self) -> ApprovalStatus {
        match self {
            Decision::Accepted => ApprovalStatus::Accepted,
            Decision::Rejected => ApprovalStatus::Rejected,
        }
    }
}

/// An agent's affiliation proposal toward one distributor.
///
/// # Invariants
/// - Created `Pending`; moves to `Accepted` or `Rejected` once and is immutable
///   afterwards.
/// - `decided_at` is set exactly when the status is terminal.
/// - At most one `Pending` request exists per (agent, distributor) pair; the
///   store enforces this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApprovalRequest {
    pub id: ApprovalRequestId,
    pub agent_id: AgentId,
    pub distributor_id: DistributorId,
    pub status: ApprovalStatus,
    pub created_at: DateTime<Utc>,
    pub decided_at: Option<DateTime<Utc>>,
}

impl ApprovalRequest {
    pub fn new(agent_id: AgentId, distributor_id: DistributorId, now: DateTime<Utc>) -> Self {
        Self {
            id: ApprovalRequestId::new(),
            agent_id,
            distributor_id,
            status: ApprovalStatus::Pending,
            created_at: now,
            decided_at: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == ApprovalStatus::Pending
    }

    /// Apply `decision`. Fails with `Conflict` when the request is already terminal.
    pub fn decide(&mut self, decision: Decision, now: DateTime<Utc>) -> DomainResult<()> {
        if !self.is_pending() {
            return Err(DomainError::conflict(format!(
                "Agent request has already been {}.",
                self.status
            )));
        }
        self.status = decision.status();
        self.decided_at = Some(now);
        Ok(())
    }
}

impl Entity for ApprovalRequest {
    type Id = ApprovalRequestId;

    fn id(&self) -> ApprovalRequestId {
        self.id
    }
}
