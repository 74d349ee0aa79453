use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct InitiatePayment {
    pub event_id: Uuid,

    /// Client-side claim. Only logged; the stored ticket price is charged.
    pub amount: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderHandle {
    pub order_id: String,
    pub amount: i64,
    pub currency: String,

    /// Public gateway key the client checkout needs.
    pub key_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VerifyPayment {
    #[serde(default)]
    pub payment_id: String,

    #[serde(default)]
    pub order_id: String,

    #[serde(default)]
    pub signature: String,

    pub event_id: Uuid,
}

impl VerifyPayment {
    pub fn missing_field(&self) -> Option<&'static str> {
        if self.payment_id.trim().is_empty() {
            return Some("payment_id");
        }
        if self.order_id.trim().is_empty() {
            return Some("order_id");
        }
        if self.signature.trim().is_empty() {
            return Some("signature");
        }
        None
    }
}
