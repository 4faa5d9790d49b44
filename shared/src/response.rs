//! API response payloads

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{Reservation, RestaurantTable};

/// POST /api/v1/tables response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableCreatedResponse {
    pub table_id: String,
    pub message: String,
}

/// GET /api/v1/tables response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TablesResponse {
    pub tables: Vec<RestaurantTable>,
}

/// POST /api/v1/reservations response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationCreatedResponse {
    pub reservation_id: String,
    pub customer_id: String,
    pub table_id: String,
    pub reservation_date: String,
    pub reservation_time: String,
    pub number_of_people: i32,
    pub message: String,
}

/// PUT /api/v1/reservations/{id} response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationResponse {
    pub message: String,
    pub reservation: Reservation,
}

/// Plain confirmation message (cancel endpoint)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// GET /api/v1/occupancy_next_7_days response
///
/// `occupancy_by_day` holds one entry per day of the window even when no
/// reservation exists that day; `total_people` is the sum over the window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OccupancyResponse {
    pub total_people: i64,
    pub occupancy_by_day: BTreeMap<String, i64>,
}
