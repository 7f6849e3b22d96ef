use chrono::{DateTime, Utc};

use agora_core::{Email, Entity, InsuranceCompanyId, ProfileId};

use crate::VerificationStatus;

/// Insurance company account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsuranceCompany {
    pub id: InsuranceCompanyId,
    pub email: Email,
    pub password_hash: String,
    pub company_name: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub kyb_status: VerificationStatus,
    pub kyc_status: VerificationStatus,
    pub is_verified: bool,
    pub otp_verified: bool,
    pub email_verified: bool,
    pub phone_verified: bool,
    pub kyc_document_url: Option<String>,
    pub business_document_url: Option<String>,
    pub is_active: bool,
    pub profile_id: Option<ProfileId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InsuranceCompany {
    pub fn new(
        company_name: String,
        email: Email,
        password_hash: String,
        contact_email: String,
        contact_phone: String,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: InsuranceCompanyId::new(),
            email,
            password_hash,
            company_name,
            contact_email,
            contact_phone,
            kyb_status: VerificationStatus::Pending,
            kyc_status: VerificationStatus::Pending,
            is_verified: false,
            otp_verified: false,
            email_verified: false,
            phone_verified: false,
            kyc_document_url: None,
            business_document_url: None,
            is_active: false,
            profile_id: None,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Entity for InsuranceCompany {
    type Id = InsuranceCompanyId;

    fn id(&self) -> InsuranceCompanyId {
        self.id
    }
}
