use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use agora_auth::Role;
use agora_core::{AgentId, DistributorId, DomainError, DomainResult, Email, Entity, ProfileId};

/// KYC/KYB review state shared by every account kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl VerificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationStatus::Pending => "pending",
            VerificationStatus::Approved => "approved",
            VerificationStatus::Rejected => "rejected",
        }
    }
}

impl core::str::FromStr for VerificationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(format!("unknown verification status '{other}'")),
        }
    }
}

/// Agent account.
///
/// # Invariants
/// - `email` is unique across all account kinds.
/// - `distributor_id` is set at most once, by an accepted approval request, and
///   is never cleared.
/// - `account_type` is either [`Role::Agent`] or [`Role::Admin`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Agent {
    pub id: AgentId,
    pub firstname: String,
    pub lastname: String,
    pub email: Email,
    pub password_hash: String,
    pub phone_number: Option<String>,
    pub otp_verified: bool,
    pub kyc_status: VerificationStatus,
    pub kyc_document_url: Option<String>,
    pub is_approved: bool,
    pub is_active: bool,
    pub account_type: Role,
    pub distributor_id: Option<DistributorId>,
    pub profile_id: Option<ProfileId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Agent {
    /// A freshly registered, inactive, unaffiliated account.
    pub fn new(
        firstname: String,
        lastname: String,
        email: Email,
        password_hash: String,
        account_type: Role,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: AgentId::new(),
            firstname,
            lastname,
            email,
            password_hash,
            phone_number: None,
            otp_verified: false,
            kyc_status: VerificationStatus::Pending,
            kyc_document_url: None,
            is_approved: false,
            is_active: false,
            account_type,
            distributor_id: None,
            profile_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_affiliated(&self) -> bool {
        self.distributor_id.is_some()
    }

    /// Fail with `Conflict` if this agent already belongs to a distributor.
    pub fn ensure_unaffiliated(&self) -> DomainResult<()> {
        if self.is_affiliated() {
            return Err(DomainError::conflict(
                "Agent is not allowed to request approval from multiple Distributors.",
            ));
        }
        Ok(())
    }

    /// Link this agent to `distributor_id`.
    pub fn affiliate(&mut self, distributor_id: DistributorId, now: DateTime<Utc>) -> DomainResult<()> {
        self.ensure_unaffiliated()?;
        self.distributor_id = Some(distributor_id);
        self.updated_at = now;
        Ok(())
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.firstname, self.lastname)
    }
}

impl Entity for Agent {
    type Id = AgentId;

    fn id(&self) -> AgentId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent() -> Agent {
        Agent::new(
            "Jane".to_string(),
            "Doe".to_string(),
            Email::from_trusted("jane@example.com"),
            "hash".to_string(),
            Role::Agent,
            Utc::now(),
        )
    }

    #[test]
    fn new_agent_is_unaffiliated_and_inactive() {
        let a = agent();
        assert!(!a.is_affiliated());
        assert!(!a.is_active);
        assert_eq!(a.kyc_status, VerificationStatus::Pending);
    }

    #[test]
    fn affiliate_sets_distributor_once() {
        let mut a = agent();
        let d1 = DistributorId::new();
        a.affiliate(d1, Utc::now()).unwrap();
        assert_eq!(a.distributor_id, Some(d1));

        let err = a.affiliate(DistributorId::new(), Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        assert_eq!(a.distributor_id, Some(d1));
    }
}
