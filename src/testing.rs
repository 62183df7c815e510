//! In-memory repositories for tests. Unique and foreign-key constraints of the
//! Postgres schema are emulated so races and duplicates surface the same way.

use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::repo::UserRepository;
use crate::auth::repo_types::{NewUser, ProfileUpdate, Role, User, USERS_EMAIL_CONSTRAINT};
use crate::booking::repo::BookingRepository;
use crate::booking::repo_types::{
    Booking, BookingStatus, NewBooking, Slot, ACTIVE_SLOT_CONSTRAINT, BARBER_FK_CONSTRAINT,
    SERVICE_FK_CONSTRAINT,
};
use crate::catalog::repo::CatalogRepository;
use crate::catalog::repo_types::{Barber, ServiceOffering};
use crate::error::StoreError;
use crate::invoice::repo::InvoiceRepository;
use crate::invoice::repo_types::{
    Invoice, NewInvoice, INVOICE_BOOKING_CONSTRAINT, INVOICE_NUMBER_CONSTRAINT,
};
use crate::payment::repo::PaymentRepository;
use crate::payment::repo_types::{NewPayment, Payment, PAYMENT_BOOKING_CONSTRAINT};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    barbers: Vec<Barber>,
    services: Vec<ServiceOffering>,
    bookings: Vec<Booking>,
    payments: Vec<Payment>,
    invoices: Vec<Invoice>,
}

#[derive(Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_barber(&self, name: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.tables.lock().unwrap().barbers.push(Barber {
            id,
            name: name.into(),
            active: true,
        });
        id
    }

    pub fn add_service(&self, name: &str, price: i64) -> Uuid {
        let id = Uuid::new_v4();
        self.tables.lock().unwrap().services.push(ServiceOffering {
            id,
            name: name.into(),
            price,
            duration_minutes: 30,
        });
        id
    }

    pub fn add_user(&self, email: &str, role: Role) -> Uuid {
        let id = Uuid::new_v4();
        let now = OffsetDateTime::now_utc();
        self.tables.lock().unwrap().users.push(User {
            id,
            name: "Pelanggan".into(),
            email: email.into(),
            phone: "0812000000".into(),
            password_hash: String::new(),
            role,
            created_at: now,
            updated_at: now,
        });
        id
    }

    pub fn booking(&self, id: Uuid) -> Option<Booking> {
        let t = self.tables.lock().unwrap();
        t.bookings.iter().find(|b| b.id == id).cloned()
    }

    pub fn payment_count(&self, booking_id: Uuid) -> usize {
        let t = self.tables.lock().unwrap();
        t.payments.iter().filter(|p| p.booking_id == booking_id).count()
    }

    pub fn invoice_count(&self, booking_id: Uuid) -> usize {
        let t = self.tables.lock().unwrap();
        t.invoices.iter().filter(|i| i.booking_id == booking_id).count()
    }

    pub fn active_bookings_in(&self, slot: Slot) -> usize {
        let t = self.tables.lock().unwrap();
        t.bookings
            .iter()
            .filter(|b| b.slot() == slot && b.status.occupies_slot())
            .count()
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create(&self, new: NewUser) -> Result<User, StoreError> {
        let mut t = self.tables.lock().unwrap();
        if t.users.iter().any(|u| u.email == new.email) {
            return Err(StoreError::unique(USERS_EMAIL_CONSTRAINT));
        }
        let now = OffsetDateTime::now_utc();
        let user = User {
            id: Uuid::new_v4(),
            name: new.name,
            email: new.email,
            phone: new.phone,
            password_hash: new.password_hash,
            role: new.role,
            created_at: now,
            updated_at: now,
        };
        t.users.push(user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let t = self.tables.lock().unwrap();
        Ok(t.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let t = self.tables.lock().unwrap();
        Ok(t.users.iter().find(|u| u.id == id).cloned())
    }

    async fn update_profile(
        &self,
        id: Uuid,
        update: ProfileUpdate,
    ) -> Result<Option<User>, StoreError> {
        let mut t = self.tables.lock().unwrap();
        let Some(user) = t.users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        if let Some(name) = update.name {
            user.name = name;
        }
        if let Some(phone) = update.phone {
            user.phone = phone;
        }
        user.updated_at = OffsetDateTime::now_utc();
        Ok(Some(user.clone()))
    }
}

#[async_trait]
impl CatalogRepository for InMemoryStore {
    async fn list_barbers(&self) -> Result<Vec<Barber>, StoreError> {
        let t = self.tables.lock().unwrap();
        Ok(t.barbers.iter().filter(|b| b.active).cloned().collect())
    }

    async fn list_services(&self) -> Result<Vec<ServiceOffering>, StoreError> {
        Ok(self.tables.lock().unwrap().services.clone())
    }

    async fn find_service(&self, id: Uuid) -> Result<Option<ServiceOffering>, StoreError> {
        let t = self.tables.lock().unwrap();
        Ok(t.services.iter().find(|s| s.id == id).cloned())
    }
}

#[async_trait]
impl BookingRepository for InMemoryStore {
    async fn create(&self, new: NewBooking) -> Result<Booking, StoreError> {
        let mut t = self.tables.lock().unwrap();
        if !t.barbers.iter().any(|b| b.id == new.slot.barber_id) {
            return Err(StoreError::ForeignKeyViolation {
                constraint: BARBER_FK_CONSTRAINT.into(),
            });
        }
        if !t.services.iter().any(|s| s.id == new.service_id) {
            return Err(StoreError::ForeignKeyViolation {
                constraint: SERVICE_FK_CONSTRAINT.into(),
            });
        }
        if t
            .bookings
            .iter()
            .any(|b| b.slot() == new.slot && b.status.occupies_slot())
        {
            return Err(StoreError::unique(ACTIVE_SLOT_CONSTRAINT));
        }
        let now = OffsetDateTime::now_utc();
        let booking = Booking {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            barber_id: new.slot.barber_id,
            service_id: new.service_id,
            date: new.slot.date,
            hour: new.slot.hour,
            status: BookingStatus::AwaitingPayment,
            created_at: now,
            updated_at: now,
        };
        t.bookings.push(booking.clone());
        Ok(booking)
    }

    async fn is_slot_available(&self, slot: Slot) -> Result<bool, StoreError> {
        let t = self.tables.lock().unwrap();
        Ok(!t
            .bookings
            .iter()
            .any(|b| b.slot() == slot && b.status.occupies_slot()))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>, StoreError> {
        Ok(self.booking(id))
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Booking>, StoreError> {
        let t = self.tables.lock().unwrap();
        let mut rows: Vec<Booking> = t
            .bookings
            .iter()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| (b.date, b.hour).cmp(&(a.date, a.hour)));
        Ok(rows)
    }

    async fn list_all(&self) -> Result<Vec<Booking>, StoreError> {
        let t = self.tables.lock().unwrap();
        let mut rows = t.bookings.clone();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn transition_status(
        &self,
        id: Uuid,
        from: BookingStatus,
        to: BookingStatus,
    ) -> Result<Option<Booking>, StoreError> {
        let mut t = self.tables.lock().unwrap();
        let Some(booking) = t.bookings.iter_mut().find(|b| b.id == id && b.status == from) else {
            return Ok(None);
        };
        booking.status = to;
        booking.updated_at = OffsetDateTime::now_utc();
        Ok(Some(booking.clone()))
    }
}

#[async_trait]
impl PaymentRepository for InMemoryStore {
    async fn record_and_mark_paid(&self, new: NewPayment) -> Result<Option<Payment>, StoreError> {
        let mut guard = self.tables.lock().unwrap();
        let t = &mut *guard;
        let Some(booking) = t
            .bookings
            .iter_mut()
            .find(|b| b.id == new.booking_id && b.status == BookingStatus::AwaitingPayment)
        else {
            return Ok(None);
        };
        if t.payments.iter().any(|p| p.booking_id == new.booking_id) {
            return Err(StoreError::unique(PAYMENT_BOOKING_CONSTRAINT));
        }
        booking.status = BookingStatus::Paid;
        booking.updated_at = OffsetDateTime::now_utc();
        let payment = Payment {
            id: Uuid::new_v4(),
            booking_id: new.booking_id,
            method: new.method,
            amount: new.amount,
            status: new.status,
            created_at: OffsetDateTime::now_utc(),
        };
        t.payments.push(payment.clone());
        Ok(Some(payment))
    }

    async fn find_by_booking(&self, booking_id: Uuid) -> Result<Option<Payment>, StoreError> {
        let t = self.tables.lock().unwrap();
        Ok(t.payments.iter().find(|p| p.booking_id == booking_id).cloned())
    }
}

#[async_trait]
impl InvoiceRepository for InMemoryStore {
    async fn create(&self, new: NewInvoice) -> Result<Invoice, StoreError> {
        let mut t = self.tables.lock().unwrap();
        if t.invoices.iter().any(|i| i.booking_id == new.booking_id) {
            return Err(StoreError::unique(INVOICE_BOOKING_CONSTRAINT));
        }
        if t.invoices.iter().any(|i| i.invoice_number == new.invoice_number) {
            return Err(StoreError::unique(INVOICE_NUMBER_CONSTRAINT));
        }
        let invoice = Invoice {
            id: Uuid::new_v4(),
            booking_id: new.booking_id,
            invoice_number: new.invoice_number,
            total_amount: new.total_amount,
            url: new.url,
            created_at: OffsetDateTime::now_utc(),
        };
        t.invoices.push(invoice.clone());
        Ok(invoice)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Invoice>, StoreError> {
        let t = self.tables.lock().unwrap();
        Ok(t.invoices.iter().find(|i| i.id == id).cloned())
    }

    async fn find_by_booking(&self, booking_id: Uuid) -> Result<Option<Invoice>, StoreError> {
        let t = self.tables.lock().unwrap();
        Ok(t.invoices.iter().find(|i| i.booking_id == booking_id).cloned())
    }

    async fn find_by_number(&self, number: &str) -> Result<Option<Invoice>, StoreError> {
        let t = self.tables.lock().unwrap();
        Ok(t.invoices.iter().find(|i| i.invoice_number == number).cloned())
    }
}
