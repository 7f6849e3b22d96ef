//! Purchasing domain module (purchases recorded by agents for their buyers).

pub mod purchase;
pub mod secret;
pub mod service;
pub mod store;

pub use purchase::{NewPurchase, Purchase, PurchaseStatus};
pub use secret::generate_secret;
pub use service::record_purchase;
pub use store::PurchaseStore;
