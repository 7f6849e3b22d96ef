//! `agora-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! typed identifiers, the error taxonomy shared by every service, structured
//! validation errors and the storage error reported by store adapters.

pub mod entity;
pub mod error;
pub mod id;
pub mod store;
pub mod validation;
pub mod value_object;

pub use entity::Entity;
pub use error::{DomainError, DomainResult, ServiceError, ServiceResult};
pub use id::{AgentId, ApprovalRequestId, DistributorId, InsuranceCompanyId, ProfileId, PurchaseId};
pub use store::{StoreError, StoreResult};
pub use validation::ValidationErrors;
pub use value_object::{Email, ValueObject};
