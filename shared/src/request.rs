//! API request payloads and validation
//!
//! Required fields are modelled as `Option` so a missing field produces a
//! 400 naming the field, not a deserialization failure. `validated()`
//! checks presence first, then ranges and formats, and returns the
//! resolved payload the store layer works with.

use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use validator::Validate;

use crate::models::ReservationStatus;

fn missing(fields: &[&str]) -> String {
    format!("Missing required fields: {}", fields.join(", "))
}

fn first_validation_message(errors: &validator::ValidationErrors) -> String {
    for (field, errs) in errors.field_errors() {
        if let Some(err) = errs.first() {
            return match &err.message {
                Some(msg) => format!("{field}: {msg}"),
                None => format!("{field}: invalid value ({})", err.code),
            };
        }
    }
    "invalid request".to_string()
}

/// Parse `HH:MM[:SS]` into a canonical `HH:MM:SS` string.
fn parse_time(value: &str) -> Result<String, String> {
    let parsed = NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .map_err(|_| format!("reservation_time '{value}' is not a valid HH:MM:SS time"))?;
    Ok(parsed.format("%H:%M:%S").to_string())
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| format!("reservation_date '{value}' is not a valid YYYY-MM-DD date"))
}

// ── Tables ──────────────────────────────────────────────────────────

/// POST /api/v1/tables payload
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTableRequest {
    pub table_number: Option<String>,
    pub capacity: Option<i32>,
}

/// Resolved table creation data
#[derive(Debug, Clone, Validate)]
pub struct NewTable {
    #[validate(length(min = 1, max = 200, message = "must not be empty"))]
    pub table_number: String,
    #[validate(range(min = 1, message = "must be a positive integer"))]
    pub capacity: i32,
}

impl CreateTableRequest {
    pub fn validated(self) -> Result<NewTable, String> {
        let mut absent = Vec::new();
        if self.table_number.is_none() {
            absent.push("table_number");
        }
        if self.capacity.is_none() {
            absent.push("capacity");
        }
        if !absent.is_empty() {
            return Err(missing(&absent));
        }

        let table = NewTable {
            table_number: self.table_number.unwrap(),
            capacity: self.capacity.unwrap(),
        };
        table
            .validate()
            .map_err(|e| first_validation_message(&e))?;
        Ok(table)
    }
}

// ── Reservations ────────────────────────────────────────────────────

/// POST /api/v1/reservations payload
#[derive(Debug, Clone, Deserialize)]
pub struct CreateReservationRequest {
    pub table_id: Option<String>,
    pub number_of_people: Option<i32>,
    pub reservation_date: Option<String>,
    pub reservation_time: Option<String>,
    pub last_name: Option<String>,
    pub first_name: Option<String>,
    pub phone: Option<String>,
    pub comment: Option<String>,
}

/// Resolved reservation creation data
#[derive(Debug, Clone, Validate)]
pub struct NewReservation {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub table_id: String,
    #[validate(range(min = 1, message = "must be a positive integer"))]
    pub number_of_people: i32,
    pub reservation_date: NaiveDate,
    pub reservation_time: String,
    #[validate(length(min = 1, max = 200, message = "must not be empty"))]
    pub last_name: String,
    #[validate(length(max = 200))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "must not be empty"))]
    pub phone: String,
    #[validate(length(max = 500))]
    pub comment: String,
}

impl CreateReservationRequest {
    pub fn validated(self) -> Result<NewReservation, String> {
        let mut absent = Vec::new();
        if self.table_id.is_none() {
            absent.push("table_id");
        }
        if self.number_of_people.is_none() {
            absent.push("number_of_people");
        }
        if self.reservation_date.is_none() {
            absent.push("reservation_date");
        }
        if self.reservation_time.is_none() {
            absent.push("reservation_time");
        }
        if self.last_name.is_none() {
            absent.push("last_name");
        }
        if self.first_name.is_none() {
            absent.push("first_name");
        }
        if self.phone.is_none() {
            absent.push("phone");
        }
        if !absent.is_empty() {
            return Err(missing(&absent));
        }

        let reservation = NewReservation {
            table_id: self.table_id.unwrap(),
            number_of_people: self.number_of_people.unwrap(),
            reservation_date: parse_date(&self.reservation_date.unwrap())?,
            reservation_time: parse_time(&self.reservation_time.unwrap())?,
            last_name: self.last_name.unwrap(),
            first_name: self.first_name.unwrap(),
            phone: self.phone.unwrap(),
            comment: self.comment.unwrap_or_default(),
        };
        reservation
            .validate()
            .map_err(|e| first_validation_message(&e))?;
        Ok(reservation)
    }
}

/// PUT /api/v1/reservations/{id} payload
///
/// Any subset of the updatable fields; at least one must be present.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateReservationRequest {
    pub table_id: Option<String>,
    pub status: Option<String>,
    pub comment: Option<String>,
    pub number_of_people: Option<i32>,
    pub reservation_date: Option<String>,
    pub reservation_time: Option<String>,
}

/// Resolved reservation patch
#[derive(Debug, Clone, Default)]
pub struct ReservationPatch {
    pub table_id: Option<String>,
    pub status: Option<ReservationStatus>,
    pub comment: Option<String>,
    pub number_of_people: Option<i32>,
    pub reservation_date: Option<NaiveDate>,
    pub reservation_time: Option<String>,
}

impl UpdateReservationRequest {
    pub fn validated(self) -> Result<ReservationPatch, String> {
        if self.table_id.is_none()
            && self.status.is_none()
            && self.comment.is_none()
            && self.number_of_people.is_none()
            && self.reservation_date.is_none()
            && self.reservation_time.is_none()
        {
            return Err(
                "At least one of table_id, status, comment, number_of_people, \
                 reservation_date, reservation_time is required"
                    .to_string(),
            );
        }

        let status = match self.status {
            Some(s) => Some(
                ReservationStatus::parse(&s)
                    .ok_or_else(|| format!("status '{s}' must be 'active' or 'cancelled'"))?,
            ),
            None => None,
        };
        if let Some(n) = self.number_of_people
            && n < 1
        {
            return Err("number_of_people: must be a positive integer".to_string());
        }
        let reservation_date = self.reservation_date.as_deref().map(parse_date).transpose()?;
        let reservation_time = self.reservation_time.as_deref().map(parse_time).transpose()?;

        Ok(ReservationPatch {
            table_id: self.table_id,
            status,
            comment: self.comment,
            number_of_people: self.number_of_people,
            reservation_date,
            reservation_time,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_request_lists_missing_fields() {
        let req = CreateTableRequest {
            table_number: None,
            capacity: None,
        };
        let err = req.validated().unwrap_err();
        assert_eq!(err, "Missing required fields: table_number, capacity");
    }

    #[test]
    fn table_request_rejects_non_positive_capacity() {
        let req = CreateTableRequest {
            table_number: Some("T1".into()),
            capacity: Some(0),
        };
        let err = req.validated().unwrap_err();
        assert!(err.contains("capacity"), "{err}");
    }

    fn full_reservation_request() -> CreateReservationRequest {
        CreateReservationRequest {
            table_id: Some("restaurant_table:t1".into()),
            number_of_people: Some(4),
            reservation_date: Some("2025-06-01".into()),
            reservation_time: Some("19:30".into()),
            last_name: Some("Silva".into()),
            first_name: Some("Ana".into()),
            phone: Some("0991234567".into()),
            comment: None,
        }
    }

    #[test]
    fn reservation_request_accepts_short_time_format() {
        let resolved = full_reservation_request().validated().unwrap();
        assert_eq!(resolved.reservation_time, "19:30:00");
        assert_eq!(resolved.comment, "");
    }

    #[test]
    fn reservation_request_lists_every_missing_field() {
        let req = CreateReservationRequest {
            table_id: None,
            number_of_people: Some(2),
            reservation_date: None,
            reservation_time: Some("18:00:00".into()),
            last_name: Some("Silva".into()),
            first_name: Some("Ana".into()),
            phone: None,
            comment: None,
        };
        let err = req.validated().unwrap_err();
        assert_eq!(err, "Missing required fields: table_id, reservation_date, phone");
    }

    #[test]
    fn reservation_request_rejects_bad_date() {
        let mut req = full_reservation_request();
        req.reservation_date = Some("01.06.2025".into());
        let err = req.validated().unwrap_err();
        assert!(err.contains("reservation_date"), "{err}");
    }

    #[test]
    fn update_request_requires_at_least_one_field() {
        let err = UpdateReservationRequest::default().validated().unwrap_err();
        assert!(err.starts_with("At least one of"), "{err}");
    }

    #[test]
    fn update_request_parses_status() {
        let req = UpdateReservationRequest {
            status: Some("cancelled".into()),
            ..Default::default()
        };
        let patch = req.validated().unwrap();
        assert_eq!(patch.status, Some(ReservationStatus::Cancelled));

        let req = UpdateReservationRequest {
            status: Some("gone".into()),
            ..Default::default()
        };
        assert!(req.validated().is_err());
    }
}
