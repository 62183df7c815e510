use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::repo_types::{NewPayment, Payment, PaymentRow};
use crate::booking::repo_types::BookingStatus;
use crate::error::StoreError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Move the booking from `awaiting_payment` to `paid` and insert the
    /// payment as one unit. `None` when the booking is no longer awaiting
    /// payment; nothing is written then. A second payment for the same
    /// booking surfaces as a unique violation of `payments_booking_id_key`.
    async fn record_and_mark_paid(&self, new: NewPayment) -> Result<Option<Payment>, StoreError>;
    async fn find_by_booking(&self, booking_id: Uuid) -> Result<Option<Payment>, StoreError>;
}

#[derive(Clone)]
pub struct PgPaymentRepository {
    db: PgPool,
}

impl PgPaymentRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

/// Conditional status flip; locks the booking row for the rest of `tx`.
async fn mark_paid_tx(
    tx: &mut Transaction<'_, Postgres>,
    booking_id: Uuid,
) -> Result<bool, StoreError> {
    let updated = sqlx::query(
        r#"
        UPDATE bookings
           SET status = $3, updated_at = now()
         WHERE id = $1 AND status = $2
        "#,
    )
    .bind(booking_id)
    .bind(BookingStatus::AwaitingPayment.as_str())
    .bind(BookingStatus::Paid.as_str())
    .execute(&mut **tx)
    .await?;
    Ok(updated.rows_affected() == 1)
}

async fn insert_payment_tx(
    tx: &mut Transaction<'_, Postgres>,
    new: &NewPayment,
) -> Result<Payment, StoreError> {
    let row = sqlx::query_as::<_, PaymentRow>(
        r#"
        INSERT INTO payments (booking_id, method, amount, status)
        VALUES ($1, $2, $3, $4)
        RETURNING id, booking_id, method, amount, status, created_at
        "#,
    )
    .bind(new.booking_id)
    .bind(new.method.as_str())
    .bind(new.amount)
    .bind(new.status.as_str())
    .fetch_one(&mut **tx)
    .await?;
    row.try_into()
}

#[async_trait]
impl PaymentRepository for PgPaymentRepository {
    async fn record_and_mark_paid(&self, new: NewPayment) -> Result<Option<Payment>, StoreError> {
        let mut tx = self.db.begin().await?;
        if !mark_paid_tx(&mut tx, new.booking_id).await? {
            tx.rollback().await?;
            return Ok(None);
        }
        let payment = insert_payment_tx(&mut tx, &new).await?;
        tx.commit().await?;
        Ok(Some(payment))
    }

    async fn find_by_booking(&self, booking_id: Uuid) -> Result<Option<Payment>, StoreError> {
        let row = sqlx::query_as::<_, PaymentRow>(
            r#"
            SELECT id, booking_id, method, amount, status, created_at
              FROM payments
             WHERE booking_id = $1
            "#,
        )
        .bind(booking_id)
        .fetch_optional(&self.db)
        .await?;
        row.map(Payment::try_from).transpose()
    }
}
