use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::Role;

/// Permission identifier.
///
/// Permissions are modeled as opaque strings (e.g. "approvals.decide") and are
/// granted to roles by [`role_permissions`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

impl Permission {
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

pub const APPROVALS_REQUEST: Permission = Permission::from_static("approvals.request");
pub const APPROVALS_REQUEST_ON_BEHALF: Permission = Permission::from_static("approvals.request_on_behalf");
pub const APPROVALS_READ: Permission = Permission::from_static("approvals.read");
pub const APPROVALS_DECIDE: Permission = Permission::from_static("approvals.decide");
pub const PURCHASES_CREATE: Permission = Permission::from_static("purchases.create");
pub const PURCHASES_READ: Permission = Permission::from_static("purchases.read");
pub const AGENTS_LIST: Permission = Permission::from_static("agents.list");
pub const DISTRIBUTORS_ADMIN_LIST: Permission = Permission::from_static("distributors.admin_list");
pub const ACCOUNTS_REGISTER_ADMIN: Permission = Permission::from_static("accounts.register_admin");

static AGENT: [Permission; 3] = [APPROVALS_REQUEST, PURCHASES_CREATE, PURCHASES_READ];
static DISTRIBUTOR: [Permission; 3] = [APPROVALS_READ, APPROVALS_DECIDE, PURCHASES_READ];
static INSURANCE_COMPANY: [Permission; 1] = [PURCHASES_READ];
static ADMIN: [Permission; 6] = [
    APPROVALS_REQUEST,
    APPROVALS_REQUEST_ON_BEHALF,
    PURCHASES_READ,
    AGENTS_LIST,
    DISTRIBUTORS_ADMIN_LIST,
    ACCOUNTS_REGISTER_ADMIN,
];

/// Static role → permission mapping.
///
/// Distributor-scoped permissions are not granted to `admin`: those
/// operations resolve the acting distributor from the caller's own email.
pub fn role_permissions(role: Role) -> &'static [Permission] {
    match role {
        Role::Agent => &AGENT,
        Role::Distributor => &DISTRIBUTOR,
        Role::InsuranceCompany => &INSURANCE_COMPANY,
        Role::Admin => &ADMIN,
    }
}
