use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use agora_core::validation::{check_name, check_present};
use agora_core::{AgentId, DistributorId, Email, Entity, PurchaseId, ValidationErrors};

/// Purchase status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PurchaseStatus {
    #[default]
    Pending,
    Completed,
    Cancelled,
}

impl PurchaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PurchaseStatus::Pending => "pending",
            PurchaseStatus::Completed => "completed",
            PurchaseStatus::Cancelled => "cancelled",
        }
    }
}

impl core::str::FromStr for PurchaseStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(format!("unknown purchase status '{other}'")),
        }
    }
}

/// Buyer details submitted by an agent.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewPurchase {
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub product_category: String,
    pub product: String,
    pub phone_number: String,
    pub receipt_image: Option<String>,
    pub product_image: Option<String>,
}

impl NewPurchase {
    /// Every failing field, plus the normalized buyer email when it was valid.
    pub fn check(&self) -> (ValidationErrors, Option<Email>) {
        let mut errors = ValidationErrors::new();
        check_name(&mut errors, "firstname", "Firstname", &self.firstname, 3);
        check_name(&mut errors, "lastname", "Lastname", &self.lastname, 3);
        let email = match Email::parse(&self.email) {
            Ok(email) => Some(email),
            Err(msg) => {
                errors.add("email", msg);
                None
            }
        };
        check_present(&mut errors, "product_category", "Product_category", &self.product_category);
        check_present(&mut errors, "product", "Product", &self.product);
        check_present(&mut errors, "phone_number", "Phone Number", &self.phone_number);
        (errors, email)
    }
}

/// A recorded sale.
///
/// `distributor_id` is the recording agent's affiliation at the time of the
/// purchase and does not follow later changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Purchase {
    pub id: PurchaseId,
    pub firstname: String,
    pub lastname: String,
    pub email: Email,
    pub phone_number: String,
    pub product_category: String,
    pub product: String,
    pub receipt_image: Option<String>,
    pub product_image: Option<String>,
    pub purchase_status: PurchaseStatus,
    pub purchase_date: DateTime<Utc>,
    pub purchase_secret: String,
    pub agent_id: AgentId,
    pub distributor_id: Option<DistributorId>,
}

impl Entity for Purchase {
    type Id = PurchaseId;

    fn id(&self) -> PurchaseId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_are_all_reported() {
        let (errors, email) = NewPurchase::default().check();
        assert!(email.is_none());
        assert_eq!(errors.get("firstname"), Some("Firstname field is blank."));
        assert_eq!(errors.get("email"), Some("Email field is blank."));
        assert_eq!(errors.get("product_category"), Some("Product_category field is blank."));
        assert_eq!(errors.get("product"), Some("Product field is blank."));
        assert_eq!(errors.get("phone_number"), Some("Phone Number field is blank."));
    }

    #[test]
    fn complete_purchase_passes() {
        let input = NewPurchase {
            firstname: "Ada".into(),
            lastname: "Obi".into(),
            email: "Ada@Buyer.io".into(),
            product_category: "insurance".into(),
            product: "Motor cover".into(),
            phone_number: "+2348000000000".into(),
            ..Default::default()
        };
        let (errors, email) = input.check();
        assert!(errors.is_empty(), "{errors}");
        assert_eq!(email.unwrap().as_str(), "ada@buyer.io");
    }
}
