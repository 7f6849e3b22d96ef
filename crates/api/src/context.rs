use agora_auth::{Principal, Role};
use agora_core::Email;

/// Authenticated caller for a request.
///
/// Inserted by the auth middleware from a verified access token; present on
/// every protected route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestIdentity {
    principal: Principal,
}

impl RequestIdentity {
    pub fn new(principal: Principal) -> Self {
        Self { principal }
    }

    pub fn email(&self) -> &Email {
        &self.principal.email
    }

    pub fn role(&self) -> Role {
        self.principal.role
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }
}
