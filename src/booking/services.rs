use std::sync::Arc;

use axum::extract::FromRef;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::dto::CreateBookingRequest;
use super::repo::BookingRepository;
use super::repo_types::{
    Booking, BookingStatus, NewBooking, Slot, ACTIVE_SLOT_CONSTRAINT, BARBER_FK_CONSTRAINT,
    CLOSING_HOUR, OPENING_HOUR, SERVICE_FK_CONSTRAINT,
};
use crate::{
    auth::AuthUser,
    error::AppError,
    state::AppState,
};

#[derive(Clone)]
pub struct BookingService {
    bookings: Arc<dyn BookingRepository>,
}

impl FromRef<AppState> for BookingService {
    fn from_ref(state: &AppState) -> Self {
        Self::new(state.bookings.clone())
    }
}

impl BookingService {
    pub fn new(bookings: Arc<dyn BookingRepository>) -> Self {
        Self { bookings }
    }

    #[instrument(skip(self))]
    pub async fn create_booking(
        &self,
        user_id: Uuid,
        req: CreateBookingRequest,
    ) -> Result<Booking, AppError> {
        if !(OPENING_HOUR..=CLOSING_HOUR).contains(&req.hour) {
            return Err(AppError::Validation(format!(
                "hour must be between {OPENING_HOUR} and {CLOSING_HOUR}"
            )));
        }

        let slot = Slot {
            barber_id: req.barber_id,
            date: req.date,
            hour: req.hour,
        };
        if !self.bookings.is_slot_available(slot).await? {
            warn!("slot already taken");
            return Err(AppError::SlotUnavailable);
        }

        // The partial unique index catches a concurrent insert that passed the check.
        let booking = self
            .bookings
            .create(NewBooking {
                user_id,
                service_id: req.service_id,
                slot,
            })
            .await
            .map_err(|e| {
                if e.violates(ACTIVE_SLOT_CONSTRAINT) {
                    AppError::SlotUnavailable
                } else if e.violates_reference(BARBER_FK_CONSTRAINT) {
                    AppError::validation("unknown barber")
                } else if e.violates_reference(SERVICE_FK_CONSTRAINT) {
                    AppError::validation("unknown service")
                } else {
                    e.into()
                }
            })?;

        info!(booking_id = %booking.id, "booking created");
        Ok(booking)
    }

    #[instrument(skip(self))]
    pub async fn my_bookings(&self, user_id: Uuid) -> Result<Vec<Booking>, AppError> {
        Ok(self.bookings.list_by_user(user_id).await?)
    }

    /// Owner or admin only.
    #[instrument(skip(self))]
    pub async fn get_booking(&self, booking_id: Uuid, user: AuthUser) -> Result<Booking, AppError> {
        let booking = self
            .bookings
            .find_by_id(booking_id)
            .await?
            .ok_or(AppError::BookingNotFound)?;
        if booking.user_id != user.id && !user.is_admin() {
            return Err(AppError::forbidden("you do not have access to this booking"));
        }
        Ok(booking)
    }

    #[instrument(skip(self))]
    pub async fn cancel_booking(&self, booking_id: Uuid, user_id: Uuid) -> Result<Booking, AppError> {
        let booking = self
            .bookings
            .find_by_id(booking_id)
            .await?
            .ok_or(AppError::BookingNotFound)?;

        if booking.user_id != user_id {
            return Err(AppError::forbidden("you do not have access to this booking"));
        }
        if booking.status != BookingStatus::AwaitingPayment {
            return Err(AppError::InvalidStatus);
        }

        // None here means a concurrent payment or cancel won.
        let cancelled = self
            .bookings
            .transition_status(
                booking_id,
                BookingStatus::AwaitingPayment,
                BookingStatus::Cancelled,
            )
            .await?
            .ok_or(AppError::InvalidStatus)?;

        info!(booking_id = %cancelled.id, "booking cancelled");
        Ok(cancelled)
    }

    #[instrument(skip(self))]
    pub async fn all_bookings(&self) -> Result<Vec<Booking>, AppError> {
        Ok(self.bookings.list_all().await?)
    }
}
