//! Restaurant Table Model

use serde::{Deserialize, Serialize};

/// Restaurant table entity
///
/// `table_number` is the user-facing label and is unique across the
/// restaurant. Tables are immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestaurantTable {
    pub id: Option<String>,
    pub table_number: String,
    pub capacity: i32,
}
