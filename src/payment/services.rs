use std::sync::Arc;

use axum::extract::FromRef;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use super::dto::{PaymentOutcome, ProcessPaymentRequest};
use super::repo::PaymentRepository;
use super::repo_types::{NewPayment, Payment, PaymentStatus, PAYMENT_BOOKING_CONSTRAINT};
use crate::{
    booking::{
        repo::BookingRepository,
        repo_types::{Booking, BookingStatus},
    },
    error::AppError,
    invoice::services::InvoiceService,
    state::AppState,
};

#[derive(Clone)]
pub struct PaymentService {
    payments: Arc<dyn PaymentRepository>,
    bookings: Arc<dyn BookingRepository>,
    invoices: InvoiceService,
}

impl FromRef<AppState> for PaymentService {
    fn from_ref(state: &AppState) -> Self {
        Self::new(
            state.payments.clone(),
            state.bookings.clone(),
            InvoiceService::from_ref(state),
        )
    }
}

impl PaymentService {
    pub fn new(
        payments: Arc<dyn PaymentRepository>,
        bookings: Arc<dyn BookingRepository>,
        invoices: InvoiceService,
    ) -> Self {
        Self {
            payments,
            bookings,
            invoices,
        }
    }

    async fn owned_booking(&self, booking_id: Uuid, user_id: Uuid) -> Result<Booking, AppError> {
        let booking = self
            .bookings
            .find_by_id(booking_id)
            .await?
            .ok_or(AppError::BookingNotFound)?;
        if booking.user_id != user_id {
            return Err(AppError::forbidden("you do not have access to this booking"));
        }
        Ok(booking)
    }

    /// Record a successful payment and mark the booking paid in one write,
    /// then try to issue the invoice. Invoice failure never fails the payment.
    #[instrument(skip(self))]
    pub async fn process_payment(
        &self,
        user_id: Uuid,
        req: ProcessPaymentRequest,
    ) -> Result<PaymentOutcome, AppError> {
        let booking = self.owned_booking(req.booking_id, user_id).await?;
        if booking.status != BookingStatus::AwaitingPayment {
            return Err(AppError::InvalidStatus);
        }
        if req.amount <= 0 {
            return Err(AppError::validation("amount must be positive"));
        }

        let already_paid = || AppError::validation("booking already has a payment");
        if self.payments.find_by_booking(booking.id).await?.is_some() {
            return Err(already_paid());
        }

        let Some(payment) = self
            .payments
            .record_and_mark_paid(NewPayment {
                booking_id: booking.id,
                method: req.method,
                amount: req.amount,
                status: PaymentStatus::Success,
            })
            .await
            .map_err(|e| {
                if e.violates(PAYMENT_BOOKING_CONSTRAINT) {
                    already_paid()
                } else {
                    e.into()
                }
            })?
        else {
            warn!(booking_id = %booking.id, "booking left awaiting_payment before payment was recorded");
            return Err(AppError::InvalidStatus);
        };
        info!(payment_id = %payment.id, booking_id = %booking.id, "payment recorded, booking paid");

        let invoice_created = match self.invoices.create_invoice(booking.id).await {
            Ok(invoice) => {
                info!(invoice_id = %invoice.id, booking_id = %booking.id, "invoice issued after payment");
                true
            }
            Err(e) => {
                error!(error = %e, booking_id = %booking.id, "invoice creation failed; payment kept");
                false
            }
        };

        Ok(PaymentOutcome {
            payment,
            invoice_created,
        })
    }

    #[instrument(skip(self))]
    pub async fn payment_for_booking(
        &self,
        booking_id: Uuid,
        user_id: Uuid,
    ) -> Result<Payment, AppError> {
        let booking = self.owned_booking(booking_id, user_id).await?;
        self.payments
            .find_by_booking(booking.id)
            .await?
            .ok_or(AppError::PaymentNotFound)
    }
}
