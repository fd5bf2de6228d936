//! Boundary DTOs and the typed commands they become
//!
//! Request bodies are schema-checked here and converted into commands; the
//! services below only ever see commands.

use serde::{Deserialize, Serialize};
use shared::error::{AppError, AppResult};
use shared::models::{OrderStatus, PaymentMethod};
use validator::Validate;

pub const MAX_CUSTOMER_NAME_CHARS: usize = 100;
pub const MAX_ORDER_LINES: usize = 100;

// ========== Requests ==========

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StartSessionRequest {
    #[validate(range(min = 1))]
    pub table_number: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CartItemRequest {
    /// Menu id
    pub id: i64,
    /// Range is checked by order intake, after session validation
    #[serde(alias = "quantity")]
    pub qty: i64,
    /// Client-side unit price, informational only
    pub price: Option<i64>,
    #[validate(length(max = 500))]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[validate(length(min = 1, max = 400))]
    pub customer_name: String,
    #[validate(range(min = 1))]
    pub table_number: i32,
    #[validate(length(max = 100), nested)]
    #[serde(default)]
    pub items: Vec<CartItemRequest>,
    pub payment_method: String,
    /// Client-side total, informational only
    pub total_price: Option<i64>,
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

// ========== Commands ==========

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartSessionCommand {
    pub table_number: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub menu_id: i64,
    pub quantity: i64,
    pub client_price: Option<i64>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateOrderCommand {
    pub customer_name: String,
    pub table_number: i32,
    pub items: Vec<CartLine>,
    pub payment_method: PaymentMethod,
    pub client_total: Option<i64>,
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateStatusCommand {
    pub order_id: i64,
    pub status: OrderStatus,
}

// ========== Conversion ==========

fn validation_error(errors: validator::ValidationErrors) -> AppError {
    AppError::validation(format!("Invalid request: {errors}"))
}

impl TryFrom<StartSessionRequest> for StartSessionCommand {
    type Error = AppError;

    fn try_from(req: StartSessionRequest) -> AppResult<Self> {
        req.validate().map_err(validation_error)?;
        Ok(Self {
            table_number: req.table_number,
        })
    }
}

impl TryFrom<CreateOrderRequest> for CreateOrderCommand {
    type Error = AppError;

    fn try_from(req: CreateOrderRequest) -> AppResult<Self> {
        req.validate().map_err(validation_error)?;

        let customer_name = req.customer_name.trim().to_string();
        let name_chars = customer_name.chars().count();
        if name_chars == 0 || name_chars > MAX_CUSTOMER_NAME_CHARS {
            return Err(AppError::validation(format!(
                "customerName must be 1 to {MAX_CUSTOMER_NAME_CHARS} characters"
            ))
            .with_detail("field", "customerName"));
        }

        let payment_method: PaymentMethod = req.payment_method.parse().map_err(|e: String| {
            AppError::invalid_request(e).with_detail("field", "paymentMethod")
        })?;

        let session_id = req
            .session_id
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let items = req
            .items
            .into_iter()
            .map(|item| CartLine {
                menu_id: item.id,
                quantity: item.qty,
                client_price: item.price,
                note: item
                    .note
                    .map(|n| n.trim().to_string())
                    .filter(|n| !n.is_empty()),
            })
            .collect();

        Ok(Self {
            customer_name,
            table_number: req.table_number,
            items,
            payment_method,
            client_total: req.total_price,
            session_id,
        })
    }
}

impl UpdateStatusCommand {
    pub fn from_request(order_id: i64, req: UpdateStatusRequest) -> AppResult<Self> {
        let status = req
            .status
            .parse()
            .map_err(|e: String| AppError::invalid_request(e).with_detail("field", "status"))?;
        Ok(Self { order_id, status })
    }
}
