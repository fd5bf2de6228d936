//! Order Model
//!
//! An order exclusively owns its items: they are created in the same
//! transaction as the header and are never read or written on their own.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kitchen-facing order status
///
/// ```text
/// PENDING ──accept──▶ PREPARING ──done──▶ DONE
///    │                    │
///    └──reject──▶ CANCELED ◀──reject──┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "UPPERCASE"))]
pub enum OrderStatus {
    Pending,
    Preparing,
    Done,
    Canceled,
}

impl OrderStatus {
    /// DONE and CANCELED accept no further transitions
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Canceled)
    }

    /// Whether the state machine has an edge from `self` to `next`
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Preparing)
                | (Self::Preparing, Self::Done)
                | (Self::Pending, Self::Canceled)
                | (Self::Preparing, Self::Canceled)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Preparing => "PREPARING",
            Self::Done => "DONE",
            Self::Canceled => "CANCELED",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Ok(Self::Pending),
            "PREPARING" => Ok(Self::Preparing),
            "DONE" => Ok(Self::Done),
            "CANCELED" | "CANCELLED" => Ok(Self::Canceled),
            other => Err(format!("unknown order status: {other}")),
        }
    }
}

/// Payment state of an order; PAID is terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "UPPERCASE"))]
pub enum PaymentStatus {
    Unpaid,
    Paid,
}

/// How the customer intends to pay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "UPPERCASE"))]
pub enum PaymentMethod {
    /// Paid at the counter
    Cash,
    /// Paid through the payment gateway (QRIS)
    NonCash,
}

impl PaymentMethod {
    pub fn requires_gateway(self) -> bool {
        matches!(self, Self::NonCash)
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    /// Accepts the customer-facing names (`cash`, `qris`), case-insensitively.
    /// The stored `NONCASH` form is only ever read through the database.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cash" => Ok(Self::Cash),
            "qris" => Ok(Self::NonCash),
            other => Err(format!("unsupported payment method: {other}")),
        }
    }
}

/// Order header row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    pub customer_name: String,
    pub table_id: i64,
    pub table_number: i32,
    /// Server-computed sum of `price * quantity` over the items
    pub total_price: i64,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Order line
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub menu_id: i64,
    /// Menu name at read time (display only)
    pub menu_name: String,
    pub quantity: i64,
    /// Unit price snapshot taken from the catalog when the order was placed
    pub price: i64,
    pub note: Option<String>,
}

impl OrderItem {
    pub fn line_total(&self) -> i64 {
        self.price * self.quantity
    }
}

/// Order header together with its items
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}
