use serde::Deserialize;
use time::Date;
use uuid::Uuid;

use super::repo_types::iso_date;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub barber_id: Uuid,
    pub service_id: Uuid,
    #[serde(with = "iso_date")]
    pub date: Date,
    pub hour: u8,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn parses_iso_date_and_hour() {
        let body = serde_json::json!({
            "barberId": Uuid::nil(),
            "serviceId": Uuid::nil(),
            "date": "2025-06-01",
            "hour": 10
        });
        let req: CreateBookingRequest = serde_json::from_value(body).unwrap();
        assert_eq!(req.date, date!(2025 - 06 - 01));
        assert_eq!(req.hour, 10);
    }

    #[test]
    fn rejects_malformed_date() {
        let body = serde_json::json!({
            "barberId": Uuid::nil(),
            "serviceId": Uuid::nil(),
            "date": "01/06/2025",
            "hour": 10
        });
        assert!(serde_json::from_value::<CreateBookingRequest>(body).is_err());
    }
}
