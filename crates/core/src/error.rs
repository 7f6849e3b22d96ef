//! Domain error model.

use thiserror::Error;

use crate::store::StoreError;
use crate::validation::ValidationErrors;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Result type returned by service operations that touch a store.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// invariants, conflicts). Infrastructure concerns belong in [`StoreError`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Input failed validation; carries one message per offending field.
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A requested entity does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// An invariant would be violated (duplicate pending request, agent already
    /// affiliated, request already decided).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The caller may not perform the operation or see the resource.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The caller is not authenticated.
    #[error("unauthorized")]
    Unauthorized,
}

impl DomainError {
    pub fn validation(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }

    /// Validation failure on a single field.
    pub fn invalid_field(field: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Validation(ValidationErrors::single(field, msg))
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }
}

/// Error returned by service operations: either a domain rejection or a store failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// A supporting primitive (hashing, signing) failed.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// The domain rejection, if this is not a store failure.
    pub fn as_domain(&self) -> Option<&DomainError> {
        match self {
            ServiceError::Domain(e) => Some(e),
            ServiceError::Store(_) | ServiceError::Internal(_) => None,
        }
    }
}

impl From<ValidationErrors> for ServiceError {
    fn from(value: ValidationErrors) -> Self {
        ServiceError::Domain(DomainError::Validation(value))
    }
}
