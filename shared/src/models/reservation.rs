//! Reservation Model

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Reservation lifecycle status
///
/// Cancellation is a status transition, never a row deletion. Only
/// `Active` reservations count towards occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Active,
    Cancelled,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Active => "active",
            ReservationStatus::Cancelled => "cancelled",
        }
    }

    /// Parse a status string as accepted by the update endpoint.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(ReservationStatus::Active),
            "cancelled" => Some(ReservationStatus::Cancelled),
            _ => None,
        }
    }
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reservation entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    pub id: Option<String>,
    pub table_id: String,
    pub customer_id: String,
    pub status: ReservationStatus,
    #[serde(default)]
    pub comment: String,
    pub number_of_people: i32,
    pub reservation_date: NaiveDate,
    /// Time of day, `HH:MM:SS`
    pub reservation_time: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_serde() {
        let json = serde_json::to_string(&ReservationStatus::Cancelled).unwrap();
        assert_eq!(json, "\"cancelled\"");
        let back: ReservationStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ReservationStatus::Cancelled);
    }

    #[test]
    fn status_parse_rejects_unknown_values() {
        assert_eq!(ReservationStatus::parse("active"), Some(ReservationStatus::Active));
        assert_eq!(ReservationStatus::parse("done"), None);
    }
}
