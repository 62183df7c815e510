use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::repo_types::{Payment, PaymentMethod};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessPaymentRequest {
    pub booking_id: Uuid,
    pub method: PaymentMethod,
    pub amount: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentOutcome {
    pub payment: Payment,
    /// False when the invoice side effect failed and needs out-of-band creation.
    pub invoice_created: bool,
}
