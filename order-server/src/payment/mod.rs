//! Payment gateway adapter
//!
//! The gateway is reached only through [`PaymentGateway`]; services receive
//! an `Arc<dyn PaymentGateway>` at construction so tests can swap in a fake.
//! This layer never interprets payment states, it only transports them.

mod midtrans;
mod reference;

pub use midtrans::MidtransGateway;
pub use reference::{build_reference, parse_reference};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Gateway adapter errors
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Gateway request failed: {0}")]
    Transport(String),

    #[error("Gateway rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Notification signature mismatch")]
    InvalidSignature,

    #[error("Invalid notification payload: {0}")]
    InvalidPayload(String),
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        GatewayError::Transport(err.to_string())
    }
}

/// One line of the gateway-side item breakdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionItem {
    pub id: String,
    pub name: String,
    pub price: i64,
    pub quantity: i64,
}

/// Everything the gateway needs to open a payment for an order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionDescriptor {
    /// Globally unique reference embedding the internal order id
    pub external_ref: String,
    pub gross_amount: i64,
    pub items: Vec<TransactionItem>,
    pub customer_name: String,
}

/// Opaque token the customer completes payment with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentToken {
    pub token: String,
    pub redirect_url: Option<String>,
}

/// Verified notification, still in the gateway's own vocabulary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayNotification {
    pub external_ref: String,
    /// e.g. `capture`, `settlement`, `deny`, `expire`
    pub transaction_status: String,
    /// e.g. `accept`, `challenge`
    pub fraud_status: Option<String>,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Open a transaction and return its payment token
    async fn request_token(
        &self,
        descriptor: &TransactionDescriptor,
    ) -> Result<PaymentToken, GatewayError>;

    /// Authenticate an asynchronous notification and extract its status
    async fn verify_notification(
        &self,
        payload: &serde_json::Value,
    ) -> Result<GatewayNotification, GatewayError>;
}
