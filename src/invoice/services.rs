use std::sync::Arc;

use axum::extract::FromRef;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::dto::InvoiceDetails;
use super::number::{generate_invoice_number, invoice_url};
use super::repo::InvoiceRepository;
use super::repo_types::{
    Invoice, NewInvoice, INVOICE_BOOKING_CONSTRAINT, INVOICE_NUMBER_CONSTRAINT,
};
use crate::{
    auth::AuthUser,
    booking::{repo::BookingRepository, repo_types::BookingStatus},
    catalog::repo::CatalogRepository,
    error::AppError,
    state::AppState,
};

#[derive(Clone)]
pub struct InvoiceService {
    invoices: Arc<dyn InvoiceRepository>,
    bookings: Arc<dyn BookingRepository>,
    catalog: Arc<dyn CatalogRepository>,
    base_url: String,
}

impl FromRef<AppState> for InvoiceService {
    fn from_ref(state: &AppState) -> Self {
        Self::new(
            state.invoices.clone(),
            state.bookings.clone(),
            state.catalog.clone(),
            state.config.invoice_base_url.clone(),
        )
    }
}

impl InvoiceService {
    pub fn new(
        invoices: Arc<dyn InvoiceRepository>,
        bookings: Arc<dyn BookingRepository>,
        catalog: Arc<dyn CatalogRepository>,
        base_url: String,
    ) -> Self {
        Self {
            invoices,
            bookings,
            catalog,
            base_url,
        }
    }

    /// Bill a booking at the price of its service. One invoice per booking.
    #[instrument(skip(self))]
    pub async fn create_invoice(&self, booking_id: Uuid) -> Result<Invoice, AppError> {
        let booking = self
            .bookings
            .find_by_id(booking_id)
            .await?
            .ok_or(AppError::BookingNotFound)?;

        if self.invoices.find_by_booking(booking_id).await?.is_some() {
            return Err(AppError::validation("booking already has an invoice"));
        }

        let service = self
            .catalog
            .find_service(booking.service_id)
            .await?
            .ok_or_else(|| AppError::NotFound("service not found".into()))?;

        let invoice_number = generate_invoice_number();
        let url = invoice_url(&self.base_url, &invoice_number);
        let invoice = self
            .invoices
            .create(NewInvoice {
                booking_id,
                invoice_number,
                total_amount: service.price,
                url,
            })
            .await
            .map_err(|e| {
                if e.violates(INVOICE_NUMBER_CONSTRAINT) {
                    AppError::validation("invoice number already used")
                } else if e.violates(INVOICE_BOOKING_CONSTRAINT) {
                    AppError::validation("booking already has an invoice")
                } else {
                    e.into()
                }
            })?;

        info!(invoice_id = %invoice.id, number = %invoice.invoice_number, "invoice created");
        Ok(invoice)
    }

    /// Out-of-band creation for paid bookings whose invoice side effect failed.
    #[instrument(skip(self))]
    pub async fn create_for_paid_booking(&self, booking_id: Uuid) -> Result<Invoice, AppError> {
        let booking = self
            .bookings
            .find_by_id(booking_id)
            .await?
            .ok_or(AppError::BookingNotFound)?;
        if booking.status != BookingStatus::Paid {
            return Err(AppError::InvalidStatus);
        }
        self.create_invoice(booking_id).await
    }

    #[instrument(skip(self))]
    pub async fn get_invoice(
        &self,
        invoice_id: Uuid,
        user: AuthUser,
    ) -> Result<InvoiceDetails, AppError> {
        let invoice = self.invoices.find_by_id(invoice_id).await?;
        self.authorize(invoice, user).await
    }

    #[instrument(skip(self))]
    pub async fn get_invoice_by_number(
        &self,
        number: &str,
        user: AuthUser,
    ) -> Result<InvoiceDetails, AppError> {
        let invoice = self.invoices.find_by_number(number).await?;
        self.authorize(invoice, user).await
    }

    /// Non-admins only ever learn about invoices on their own bookings, so a
    /// missing invoice is reported to them as access denied.
    async fn authorize(
        &self,
        invoice: Option<Invoice>,
        user: AuthUser,
    ) -> Result<InvoiceDetails, AppError> {
        let denied = || AppError::forbidden("you do not have access to this invoice");

        let Some(invoice) = invoice else {
            return Err(if user.is_admin() {
                AppError::InvoiceNotFound
            } else {
                denied()
            });
        };

        let booking = self
            .bookings
            .find_by_id(invoice.booking_id)
            .await?
            .ok_or(AppError::BookingNotFound)?;

        if booking.user_id != user.id && !user.is_admin() {
            warn!(invoice_id = %invoice.id, user_id = %user.id, "invoice access denied");
            return Err(denied());
        }

        Ok(InvoiceDetails { invoice, booking })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repo_types::Role;
    use crate::booking::repo_types::{NewBooking, Slot};
    use crate::error::StoreError;
    use crate::invoice::repo::MockInvoiceRepository;
    use crate::testing::InMemoryStore;
    use time::macros::date;

    struct Fixture {
        store: Arc<InMemoryStore>,
        svc: InvoiceService,
        owner: Uuid,
        booking_id: Uuid,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(InMemoryStore::new());
        let barber = store.add_barber("Joko");
        let service = store.add_service("Cukur Jenggot", 35_000);
        let owner = Uuid::new_v4();
        let booking = BookingRepository::create(
            store.as_ref(),
            NewBooking {
                user_id: owner,
                service_id: service,
                slot: Slot {
                    barber_id: barber,
                    date: date!(2025 - 06 - 01),
                    hour: 10,
                },
            },
        )
        .await
        .unwrap();
        let svc = InvoiceService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            "/api/invoice/download".into(),
        );
        Fixture {
            store,
            svc,
            owner,
            booking_id: booking.id,
        }
    }

    fn customer(id: Uuid) -> AuthUser {
        AuthUser { id, role: Role::Customer }
    }

    #[tokio::test]
    async fn invoice_totals_the_service_price() {
        let f = fixture().await;
        let invoice = f.svc.create_invoice(f.booking_id).await.unwrap();
        assert_eq!(invoice.total_amount, 35_000);
        assert_eq!(
            invoice.url,
            format!("/api/invoice/download/{}", invoice.invoice_number)
        );
    }

    #[tokio::test]
    async fn second_invoice_for_a_booking_is_rejected() {
        let f = fixture().await;
        f.svc.create_invoice(f.booking_id).await.unwrap();
        let err = f.svc.create_invoice(f.booking_id).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(f.store.invoice_count(f.booking_id), 1);
    }

    #[tokio::test]
    async fn invoice_for_missing_booking_is_not_found() {
        let f = fixture().await;
        let err = f.svc.create_invoice(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::BookingNotFound));
    }

    #[tokio::test]
    async fn number_collision_surfaces_as_validation_error() {
        let f = fixture().await;
        let mut invoices = MockInvoiceRepository::new();
        invoices.expect_find_by_booking().returning(|_| Ok(None));
        invoices
            .expect_create()
            .times(1)
            .returning(|_| Err(StoreError::unique(INVOICE_NUMBER_CONSTRAINT)));
        let svc = InvoiceService::new(
            Arc::new(invoices),
            f.store.clone(),
            f.store.clone(),
            "/x".into(),
        );

        let err = svc.create_invoice(f.booking_id).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("number")));
    }

    #[tokio::test]
    async fn owner_can_fetch_by_id_and_number() {
        let f = fixture().await;
        let invoice = f.svc.create_invoice(f.booking_id).await.unwrap();

        let by_id = f.svc.get_invoice(invoice.id, customer(f.owner)).await.unwrap();
        assert_eq!(by_id.booking.id, f.booking_id);

        let by_number = f
            .svc
            .get_invoice_by_number(&invoice.invoice_number, customer(f.owner))
            .await
            .unwrap();
        assert_eq!(by_number.invoice.id, invoice.id);
    }

    #[tokio::test]
    async fn non_owner_is_denied_whether_or_not_invoice_exists() {
        let f = fixture().await;
        let invoice = f.svc.create_invoice(f.booking_id).await.unwrap();
        let stranger = customer(Uuid::new_v4());

        let existing = f.svc.get_invoice(invoice.id, stranger).await.unwrap_err();
        let missing = f.svc.get_invoice(Uuid::new_v4(), stranger).await.unwrap_err();
        assert!(matches!(existing, AppError::Forbidden(_)));
        assert!(matches!(missing, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn admin_sees_not_found_for_missing_invoice() {
        let f = fixture().await;
        let admin = AuthUser { id: Uuid::new_v4(), role: Role::Admin };
        let err = f.svc.get_invoice(Uuid::new_v4(), admin).await.unwrap_err();
        assert!(matches!(err, AppError::InvoiceNotFound));
    }

    #[tokio::test]
    async fn out_of_band_creation_requires_paid_booking() {
        let f = fixture().await;
        let err = f.svc.create_for_paid_booking(f.booking_id).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidStatus));

        f.store
            .transition_status(f.booking_id, BookingStatus::AwaitingPayment, BookingStatus::Paid)
            .await
            .unwrap();
        let invoice = f.svc.create_for_paid_booking(f.booking_id).await.unwrap();
        assert_eq!(invoice.booking_id, f.booking_id);
    }
}
