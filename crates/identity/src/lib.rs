//! Identity domain module (agents, distributors, insurance companies, profiles).
//!
//! Records, registration/login validation and the [`IdentityStore`] boundary.
//! Persistence is injected; nothing in this crate performs IO itself.

pub mod accounts;
pub mod agent;
pub mod distributor;
pub mod insurance;
pub mod profile;
pub mod registration;
pub mod store;

pub use accounts::Account;
pub use agent::{Agent, VerificationStatus};
pub use distributor::Distributor;
pub use insurance::InsuranceCompany;
pub use profile::Profile;
pub use registration::{
    AgentRegistration, DistributorRegistration, InsuranceRegistration, LoginRequest,
};
pub use store::IdentityStore;
