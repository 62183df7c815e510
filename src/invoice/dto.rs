use serde::Serialize;

use super::repo_types::Invoice;
use crate::booking::repo_types::Booking;

/// Invoice together with the booking it bills.
#[derive(Debug, Serialize)]
pub struct InvoiceDetails {
    #[serde(flatten)]
    pub invoice: Invoice,
    pub booking: Booking,
}
