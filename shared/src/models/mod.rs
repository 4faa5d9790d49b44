//! Domain models
//!
//! Shared between the server backends and the API layer. IDs are strings:
//! the embedded document backend uses `table:key` record ids, the
//! relational backends stringified sequence values.

pub mod customer;
pub mod reservation;
pub mod restaurant_table;

// Re-exports
pub use customer::Customer;
pub use reservation::{Reservation, ReservationStatus};
pub use restaurant_table::RestaurantTable;
