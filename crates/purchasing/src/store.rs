use async_trait::async_trait;

use agora_core::{PurchaseId, StoreResult};

use crate::Purchase;

/// Persistence boundary for purchases.
///
/// `insert_purchase` reports a reused `purchase_secret` as `StoreError::Duplicate`.
#[async_trait]
pub trait PurchaseStore: Send + Sync {
    async fn insert_purchase(&self, purchase: &Purchase) -> StoreResult<()>;
    async fn find_purchase(&self, id: PurchaseId) -> StoreResult<Option<Purchase>>;
    /// All purchases, oldest first.
    async fn list_purchases(&self) -> StoreResult<Vec<Purchase>>;
}
