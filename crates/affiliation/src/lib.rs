//! Agent-distributor affiliation.
//!
//! An agent proposes an affiliation with an [`ApprovalRequest`]; the distributor
//! accepts or rejects it exactly once. Acceptance links the agent to the
//! distributor. Every operation runs inside one [`AffiliationTx`].

pub mod request;
pub mod store;
pub mod workflow;

pub use request::{ApprovalRequest, ApprovalStatus, Decision};
pub use store::{AffiliationStore, AffiliationTx};
pub use workflow::{AffiliationWorkflow, ApprovalRequested, DecisionRecorded, WorkflowOptions};
