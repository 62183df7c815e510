use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{Booking, BookingRow, BookingStatus, NewBooking, Slot};
use crate::error::StoreError;

const BOOKING_COLUMNS: &str = "id, user_id, barber_id, service_id, booking_date, booking_hour, \
                               status, created_at, updated_at";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Insert in `awaiting_payment`. An occupied slot surfaces as a unique
    /// violation of `bookings_active_slot_key`.
    async fn create(&self, new: NewBooking) -> Result<Booking, StoreError>;
    /// True when no non-cancelled booking holds `slot`.
    async fn is_slot_available(&self, slot: Slot) -> Result<bool, StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>, StoreError>;
    /// Newest appointment first.
    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Booking>, StoreError>;
    /// Most recently created first.
    async fn list_all(&self) -> Result<Vec<Booking>, StoreError>;
    /// Move `id` from `from` to `to`. `None` when the booking is missing or no
    /// longer in `from`.
    async fn transition_status(
        &self,
        id: Uuid,
        from: BookingStatus,
        to: BookingStatus,
    ) -> Result<Option<Booking>, StoreError>;
}

#[derive(Clone)]
pub struct PgBookingRepository {
    db: PgPool,
}

impl PgBookingRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn into_bookings(rows: Vec<BookingRow>) -> Result<Vec<Booking>, StoreError> {
    rows.into_iter().map(Booking::try_from).collect()
}

#[async_trait]
impl BookingRepository for PgBookingRepository {
    async fn create(&self, new: NewBooking) -> Result<Booking, StoreError> {
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            r#"
            INSERT INTO bookings (user_id, barber_id, service_id, booking_date, booking_hour, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {BOOKING_COLUMNS}
            "#
        ))
        .bind(new.user_id)
        .bind(new.slot.barber_id)
        .bind(new.service_id)
        .bind(new.slot.date)
        .bind(i16::from(new.slot.hour))
        .bind(BookingStatus::AwaitingPayment.as_str())
        .fetch_one(&self.db)
        .await?;
        row.try_into()
    }

    async fn is_slot_available(&self, slot: Slot) -> Result<bool, StoreError> {
        let taken: Option<(Uuid,)> = sqlx::query_as(
            r#"
            SELECT id
              FROM bookings
             WHERE barber_id = $1
               AND booking_date = $2
               AND booking_hour = $3
               AND status <> 'cancelled'
             LIMIT 1
            "#,
        )
        .bind(slot.barber_id)
        .bind(slot.date)
        .bind(i16::from(slot.hour))
        .fetch_optional(&self.db)
        .await?;
        Ok(taken.is_none())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>, StoreError> {
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        row.map(Booking::try_from).transpose()
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Booking>, StoreError> {
        let rows = sqlx::query_as::<_, BookingRow>(&format!(
            r#"
            SELECT {BOOKING_COLUMNS}
              FROM bookings
             WHERE user_id = $1
             ORDER BY booking_date DESC, booking_hour DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;
        into_bookings(rows)
    }

    async fn list_all(&self) -> Result<Vec<Booking>, StoreError> {
        let rows = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings ORDER BY created_at DESC"
        ))
        .fetch_all(&self.db)
        .await?;
        into_bookings(rows)
    }

    async fn transition_status(
        &self,
        id: Uuid,
        from: BookingStatus,
        to: BookingStatus,
    ) -> Result<Option<Booking>, StoreError> {
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            r#"
            UPDATE bookings
               SET status = $3, updated_at = now()
             WHERE id = $1 AND status = $2
            RETURNING {BOOKING_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(from.as_str())
        .bind(to.as_str())
        .fetch_optional(&self.db)
        .await?;
        row.map(Booking::try_from).transpose()
    }
}
