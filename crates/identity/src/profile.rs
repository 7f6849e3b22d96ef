use chrono::{DateTime, Utc};

use agora_auth::Role;
use agora_core::{Email, Entity, ProfileId};

/// Public-facing profile created alongside every account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub id: ProfileId,
    pub display_name: String,
    pub email: Email,
    pub phone_number: Option<String>,
    pub account_type: Role,
    pub profile_image: Option<String>,
    pub address: Option<String>,
    pub bio: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Profile {
    pub fn new(
        display_name: String,
        email: Email,
        phone_number: Option<String>,
        account_type: Role,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ProfileId::new(),
            display_name,
            email,
            phone_number,
            account_type,
            profile_image: None,
            address: None,
            bio: None,
            city: None,
            country: None,
            created_at: now,
        }
    }
}

impl Entity for Profile {
    type Id = ProfileId;

    fn id(&self) -> ProfileId {
        self.id
    }
}
