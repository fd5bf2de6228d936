//! Dining Table Model

use serde::{Deserialize, Serialize};

/// Physical table a customer sits at (桌台)
///
/// `number` is what is printed on the table and encoded in its QR code.
/// Occupancy is informational only; ordering never checks it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct DiningTable {
    pub id: i64,
    pub number: i32,
    pub location: String,
    pub capacity: i32,
    pub is_occupied: bool,
}

/// Create dining table payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiningTableCreate {
    pub number: i32,
    pub location: Option<String>,
    pub capacity: Option<i32>,
}
