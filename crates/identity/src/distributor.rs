use chrono::{DateTime, Utc};

use agora_core::{DistributorId, Email, Entity, ProfileId};

use crate::VerificationStatus;

/// Distributor (business) account.
///
/// Agents affiliate with a distributor through approval requests; the
/// distributor's agents are the agents whose `distributor_id` points here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Distributor {
    pub id: DistributorId,
    pub business_name: String,
    pub representative_name: String,
    pub email: Email,
    pub password_hash: String,
    pub contact_email: Option<String>,
    pub phone_number: Option<String>,
    pub otp_verified: bool,
    pub email_verified: bool,
    pub phone_verified: bool,
    pub kyb_status: VerificationStatus,
    pub kyc_status: VerificationStatus,
    pub kyc_document_url: Option<String>,
    pub business_document_url: Option<String>,
    pub is_active: bool,
    pub profile_id: Option<ProfileId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Distributor {
    pub fn new(
        business_name: String,
        representative_name: String,
        email: Email,
        password_hash: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: DistributorId::new(),
            business_name,
            representative_name,
            email,
            password_hash,
            contact_email: None,
            phone_number: None,
            otp_verified: false,
            email_verified: false,
            phone_verified: false,
            kyb_status: VerificationStatus::Pending,
            kyc_status: VerificationStatus::Pending,
            kyc_document_url: None,
            business_document_url: None,
            is_active: false,
            profile_id: None,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Entity for Distributor {
    type Id = DistributorId;

    fn id(&self) -> DistributorId {
        self.id
    }
}
