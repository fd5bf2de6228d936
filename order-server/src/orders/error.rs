use crate::db::repository::RepoError;
use crate::payment::GatewayError;
use shared::error::{AppError, ErrorCode};
use shared::models::OrderStatus;
use thiserror::Error;

/// Failures of the ordering core (sessions, intake, lifecycle)
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Table session is required")]
    MissingSession,

    #[error("Table session does not exist")]
    InvalidSession,

    #[error("Session belongs to table {session_table}, not table {claimed}")]
    TableMismatch { session_table: i32, claimed: i32 },

    #[error("Table session has expired")]
    SessionExpired,

    #[error("Order must contain at least one item")]
    EmptyOrder,

    #[error("Invalid quantity {quantity} for menu {menu_id}")]
    InvalidQuantity { menu_id: i64, quantity: i64 },

    #[error("Table {0} not found")]
    TableNotFound(i32),

    /// Carries the offending ids for logs; they are never sent to clients
    #[error("Menu items unavailable: {0:?}")]
    MenuUnavailable(Vec<i64>),

    #[error("Order {0} not found")]
    OrderNotFound(i64),

    #[error("Order {order_id} cannot move from {from} to {to}")]
    InvalidTransition {
        order_id: i64,
        from: OrderStatus,
        to: OrderStatus,
    },

    #[error("Malformed order reference: {0}")]
    MalformedReference(String),

    #[error("Order {0} is already paid")]
    AlreadyPaid(i64),

    #[error("Order {0} is canceled")]
    OrderCanceled(i64),

    #[error("Order {0} is paid in cash")]
    PaymentNotRequired(i64),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Repo(#[from] RepoError),
}

pub type OrderResult<T> = Result<T, OrderError>;

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::MissingSession => AppError::new(ErrorCode::TableSessionRequired),
            OrderError::InvalidSession => AppError::new(ErrorCode::TableSessionInvalid),
            OrderError::TableMismatch { claimed, .. } => {
                AppError::new(ErrorCode::TableSessionMismatch).with_detail("tableNumber", claimed)
            }
            OrderError::SessionExpired => AppError::new(ErrorCode::TableSessionExpired),
            OrderError::EmptyOrder => AppError::new(ErrorCode::OrderEmpty),
            OrderError::InvalidQuantity { menu_id, .. } => {
                AppError::new(ErrorCode::OrderInvalidQuantity).with_detail("menuId", menu_id)
            }
            OrderError::TableNotFound(number) => {
                AppError::with_message(ErrorCode::TableNotFound, format!("Table {number} not found"))
                    .with_detail("tableNumber", number)
            }
            OrderError::MenuUnavailable(_) => AppError::new(ErrorCode::MenuUnavailable),
            OrderError::OrderNotFound(id) => {
                AppError::with_message(ErrorCode::OrderNotFound, format!("Order {id} not found"))
            }
            OrderError::InvalidTransition { order_id, from, to } => AppError::with_message(
                ErrorCode::OrderInvalidTransition,
                format!("Order {order_id} cannot move from {from} to {to}"),
            )
            .with_detail("from", from.as_str())
            .with_detail("to", to.as_str()),
            OrderError::MalformedReference(raw) => {
                AppError::new(ErrorCode::PaymentReferenceMalformed).with_detail("reference", raw)
            }
            OrderError::AlreadyPaid(_) => AppError::new(ErrorCode::OrderAlreadyPaid),
            OrderError::OrderCanceled(_) => AppError::new(ErrorCode::OrderCanceled),
            OrderError::PaymentNotRequired(_) => AppError::with_message(
                ErrorCode::PaymentInvalidMethod,
                "Order is not paid through the payment gateway",
            ),
            OrderError::Gateway(e) => match e {
                GatewayError::InvalidSignature | GatewayError::InvalidPayload(_) => {
                    AppError::with_message(ErrorCode::PaymentNotificationInvalid, e.to_string())
                }
                GatewayError::Transport(_) | GatewayError::Rejected { .. } => {
                    tracing::error!(error = %e, "Payment gateway call failed");
                    AppError::new(ErrorCode::PaymentGatewayError)
                }
            },
            OrderError::Repo(e) => match e {
                RepoError::NotFound(msg) => AppError::with_message(ErrorCode::NotFound, msg),
                RepoError::Duplicate(msg) => AppError::invalid_request(msg),
                RepoError::Database(msg) => {
                    tracing::error!(error = %msg, "Database error");
                    AppError::database("Database error")
                }
            },
        }
    }
}
