use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

pub const INVOICE_BOOKING_CONSTRAINT: &str = "invoices_booking_id_key";
pub const INVOICE_NUMBER_CONSTRAINT: &str = "invoices_invoice_number_key";

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub invoice_number: String,
    pub total_amount: i64,
    pub url: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewInvoice {
    pub booking_id: Uuid,
    pub invoice_number: String,
    pub total_amount: i64,
    pub url: String,
}
