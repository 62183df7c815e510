use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::error::StoreError;

/// Partial unique index over active (non-cancelled) slots.
pub const ACTIVE_SLOT_CONSTRAINT: &str = "bookings_active_slot_key";
pub const BARBER_FK_CONSTRAINT: &str = "bookings_barber_id_fkey";
pub const SERVICE_FK_CONSTRAINT: &str = "bookings_service_id_fkey";

pub const OPENING_HOUR: u8 = 9;
pub const CLOSING_HOUR: u8 = 23;

/// `YYYY-MM-DD` serde adapter for [`Date`].
pub mod iso_date {
    use serde::{de::Error as _, ser::Error as _, Deserialize, Deserializer, Serializer};
    use time::{format_description::FormatItem, macros::format_description, Date};

    const FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

    pub fn serialize<S: Serializer>(date: &Date, s: S) -> Result<S::Ok, S::Error> {
        let text = date.format(FORMAT).map_err(S::Error::custom)?;
        s.serialize_str(&text)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Date, D::Error> {
        let text = String::deserialize(d)?;
        Date::parse(&text, FORMAT).map_err(D::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    AwaitingPayment,
    Paid,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::AwaitingPayment => "awaiting_payment",
            BookingStatus::Paid => "paid",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    /// Whether a booking in this status still holds its slot.
    pub fn occupies_slot(&self) -> bool {
        !matches!(self, BookingStatus::Cancelled)
    }
}

impl std::str::FromStr for BookingStatus {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "awaiting_payment" => Ok(BookingStatus::AwaitingPayment),
            "paid" => Ok(BookingStatus::Paid),
            "cancelled" => Ok(BookingStatus::Cancelled),
            other => Err(StoreError::Corrupt(format!("unknown booking status `{other}`"))),
        }
    }
}

/// A (barber, date, hour) tuple a booking occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Slot {
    pub barber_id: Uuid,
    pub date: Date,
    pub hour: u8,
}

/// Row as stored in `bookings`.
#[derive(Debug, FromRow)]
pub struct BookingRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub barber_id: Uuid,
    pub service_id: Uuid,
    pub booking_date: Date,
    pub booking_hour: i16,
    pub status: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    pub user_id: Uuid,
    pub barber_id: Uuid,
    pub service_id: Uuid,
    #[serde(with = "iso_date")]
    pub date: Date,
    pub hour: u8,
    pub status: BookingStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Booking {
    pub fn slot(&self) -> Slot {
        Slot {
            barber_id: self.barber_id,
            date: self.date,
            hour: self.hour,
        }
    }
}

impl TryFrom<BookingRow> for Booking {
    type Error = StoreError;

    fn try_from(r: BookingRow) -> Result<Self, Self::Error> {
        let hour = u8::try_from(r.booking_hour)
            .map_err(|_| StoreError::Corrupt(format!("booking hour {} out of range", r.booking_hour)))?;
        Ok(Self {
            id: r.id,
            user_id: r.user_id,
            barber_id: r.barber_id,
            service_id: r.service_id,
            date: r.booking_date,
            hour,
            status: r.status.parse()?,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

#[derive(Debug, Clone)]
pub struct NewBooking {
    pub user_id: Uuid,
    pub service_id: Uuid,
    pub slot: Slot,
}
