use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{Invoice, NewInvoice};
use crate::error::StoreError;

const INVOICE_COLUMNS: &str = "id, booking_id, invoice_number, total_amount, url, created_at";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InvoiceRepository: Send + Sync {
    /// Duplicate booking or invoice number surfaces as a unique violation of
    /// `invoices_booking_id_key` / `invoices_invoice_number_key`.
    async fn create(&self, new: NewInvoice) -> Result<Invoice, StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Invoice>, StoreError>;
    async fn find_by_booking(&self, booking_id: Uuid) -> Result<Option<Invoice>, StoreError>;
    async fn find_by_number(&self, number: &str) -> Result<Option<Invoice>, StoreError>;
}

#[derive(Clone)]
pub struct PgInvoiceRepository {
    db: PgPool,
}

impl PgInvoiceRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl InvoiceRepository for PgInvoiceRepository {
    async fn create(&self, new: NewInvoice) -> Result<Invoice, StoreError> {
        let invoice = sqlx::query_as::<_, Invoice>(&format!(
            r#"
            INSERT INTO invoices (booking_id, invoice_number, total_amount, url)
            VALUES ($1, $2, $3, $4)
            RETURNING {INVOICE_COLUMNS}
            "#
        ))
        .bind(new.booking_id)
        .bind(&new.invoice_number)
        .bind(new.total_amount)
        .bind(&new.url)
        .fetch_one(&self.db)
        .await?;
        Ok(invoice)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Invoice>, StoreError> {
        let invoice = sqlx::query_as::<_, Invoice>(&format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(invoice)
    }

    async fn find_by_booking(&self, booking_id: Uuid) -> Result<Option<Invoice>, StoreError> {
        let invoice = sqlx::query_as::<_, Invoice>(&format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices WHERE booking_id = $1"
        ))
        .bind(booking_id)
        .fetch_optional(&self.db)
        .await?;
        Ok(invoice)
    }

    async fn find_by_number(&self, number: &str) -> Result<Option<Invoice>, StoreError> {
        let invoice = sqlx::query_as::<_, Invoice>(&format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices WHERE invoice_number = $1"
        ))
        .bind(number)
        .fetch_optional(&self.db)
        .await?;
        Ok(invoice)
    }
}
