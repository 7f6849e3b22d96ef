//! Storage boundary error.
//!
//! Store traits live next to the records they persist (identity, affiliation,
//! purchasing); adapters in `agora-infra` report failures with this type.

use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure reported by a storage adapter.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backend could not be reached or the operation failed mid-flight.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A uniqueness constraint rejected the write.
    #[error("duplicate record: {0}")]
    Duplicate(String),

    /// A persisted row could not be mapped back into a record.
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

impl StoreError {
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    pub fn duplicate(msg: impl Into<String>) -> Self {
        Self::Duplicate(msg.into())
    }

    pub fn corrupt(msg: impl Into<String>) -> Self {
        Self::Corrupt(msg.into())
    }
}
