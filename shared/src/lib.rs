//! Shared types for the Mesa reservation suite
//!
//! Domain models, API payloads and validation used by the server and
//! by integration tests.

pub mod models;
pub mod request;
pub mod response;
pub mod util;

// Re-exports
pub use models::{Customer, Reservation, ReservationStatus, RestaurantTable};
pub use request::{
    CreateReservationRequest, CreateTableRequest, NewReservation, NewTable, ReservationPatch,
    UpdateReservationRequest,
};
pub use response::{
    MessageResponse, OccupancyResponse, ReservationCreatedResponse, ReservationResponse,
    TableCreatedResponse, TablesResponse,
};
