use chrono::{DateTime, Utc};
use tracing::{info, instrument, warn};

use agora_core::{PurchaseId, ServiceResult, StoreError, ValidationErrors};
use agora_identity::Agent;

use crate::{NewPurchase, Purchase, PurchaseStatus, PurchaseStore, generate_secret};

const SECRET_ATTEMPTS: usize = 3;

/// Validate `input` and record it as a purchase made through `agent`.
///
/// A colliding secret is regenerated a few times before the store error is
/// returned.
#[instrument(skip_all, fields(agent_id = %agent.id))]
pub async fn record_purchase<S>(
    store: &S,
    agent: &Agent,
    input: &NewPurchase,
    now: DateTime<Utc>,
) -> ServiceResult<Purchase>
where
    S: PurchaseStore + ?Sized,
{
    let (errors, email) = input.check();
    errors.into_result()?;
    let email = email.ok_or_else(|| ValidationErrors::single("email", "Email field is blank."))?;

    let mut purchase = Purchase {
        id: PurchaseId::new(),
        firstname: input.firstname.trim().to_string(),
        lastname: input.lastname.trim().to_string(),
        email,
        phone_number: input.phone_number.trim().to_string(),
        product_category: input.product_category.trim().to_string(),
        product: input.product.trim().to_string(),
        receipt_image: input.receipt_image.clone(),
        product_image: input.product_image.clone(),
        purchase_status: PurchaseStatus::Pending,
        purchase_date: now,
        purchase_secret: generate_secret(),
        agent_id: agent.id,
        distributor_id: agent.distributor_id,
    };

    let mut attempt = 1;
    loop {
        match store.insert_purchase(&purchase).await {
            Ok(()) => break,
            Err(StoreError::Duplicate(what)) if attempt < SECRET_ATTEMPTS => {
                warn!(attempt, %what, "purchase secret collision; regenerating");
                purchase.purchase_secret = generate_secret();
                attempt += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    info!(purchase_id = %purchase.id, "purchase recorded");
    Ok(purchase)
}
