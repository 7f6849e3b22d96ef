use thiserror::Error;

use crate::permissions::role_permissions;
use crate::{Permission, Principal, Role};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: missing permission '{0}'")]
    MissingPermission(String),

    #[error("forbidden: requires role '{required}', caller is '{actual}'")]
    WrongRole { required: Role, actual: Role },
}

/// Authorize a principal against a required permission.
///
/// - No IO
/// - No panics
/// - No business logic (pure policy check)
pub fn authorize(principal: &Principal, required: &Permission) -> Result<(), AuthzError> {
    if role_permissions(principal.role).iter().any(|p| p == required) {
        Ok(())
    } else {
        Err(AuthzError::MissingPermission(required.as_str().to_string()))
    }
}

/// Require the principal to hold exactly `role`.
pub fn require_role(principal: &Principal, role: Role) -> Result<(), AuthzError> {
    if principal.role == role {
        Ok(())
    } else {
        Err(AuthzError::WrongRole {
            required: role,
            actual: principal.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permissions::{APPROVALS_DECIDE, APPROVALS_REQUEST, APPROVALS_REQUEST_ON_BEHALF};
    use agora_core::Email;

    fn principal(role: Role) -> Principal {
        Principal::new(Email::from_trusted("someone@example.com"), role)
    }

    #[test]
    fn agent_may_request_but_not_decide() {
        let agent = principal(Role::Agent);
        assert!(authorize(&agent, &APPROVALS_REQUEST).is_ok());
        assert_eq!(
            authorize(&agent, &APPROVALS_DECIDE),
            Err(AuthzError::MissingPermission("approvals.decide".to_string()))
        );
    }

    #[test]
    fn admin_acts_on_behalf_but_cannot_decide_for_distributors() {
        let admin = principal(Role::Admin);
        assert!(authorize(&admin, &APPROVALS_REQUEST_ON_BEHALF).is_ok());
        assert!(authorize(&admin, &APPROVALS_DECIDE).is_err());
    }

    #[test]
    fn require_role_reports_both_roles() {
        let err = require_role(&principal(Role::Agent), Role::Distributor).unwrap_err();
        assert_eq!(
            err,
            AuthzError::WrongRole {
                required: Role::Distributor,
                actual: Role::Agent
            }
        );
    }
}
