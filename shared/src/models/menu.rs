//! Menu Catalog Model

use serde::{Deserialize, Serialize};

/// Sellable menu item
///
/// `price` is in the smallest currency unit. Price and availability stored
/// here are authoritative; values sent by clients are never trusted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Menu {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub price: i64,
    pub category_id: i64,
    pub is_available: bool,
    pub image: Option<String>,
}

/// Create menu payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuCreate {
    pub name: String,
    pub slug: String,
    pub price: i64,
    pub category_id: i64,
    pub is_available: Option<bool>,
    pub image: Option<String>,
}

/// Menu category
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct MenuCategory {
    pub id: i64,
    pub name: String,
    pub slug: String,
}
