use agora_core::Email;

use crate::{Role, TokenClaims};

/// Authenticated caller resolved from a verified access token.
///
/// This is the `(identity, role)` context handed to guards and services; the
/// email is the lookup key for the caller's account record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub email: Email,
    pub role: Role,
}

impl Principal {
    pub fn new(email: Email, role: Role) -> Self {
        Self { email, role }
    }

    pub fn from_claims(claims: &TokenClaims) -> Self {
        Self {
            email: Email::from_trusted(claims.email.clone()),
            role: claims.role,
        }
    }
}
