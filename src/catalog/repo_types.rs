use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Barber {
    pub id: Uuid,
    pub name: String,
    pub active: bool,
}

/// A priced haircut/grooming service. `price` is in whole rupiah.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ServiceOffering {
    pub id: Uuid,
    pub name: String,
    pub price: i64,
    pub duration_minutes: i32,
}
