//! Customer Model

use serde::{Deserialize, Serialize};

/// Customer entity
///
/// The phone number is the natural lookup key: the first reservation seen
/// for a phone number creates the record, later reservations reuse it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: Option<String>,
    pub last_name: String,
    pub first_name: String,
    pub phone: String,
}
