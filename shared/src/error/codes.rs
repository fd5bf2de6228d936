//! Unified error codes for the ordering platform
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 4xxx: Order errors
//! - 5xxx: Payment errors
//! - 6xxx: Menu errors
//! - 7xxx: Table and table-session errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values so the customer app and the
/// admin panel can switch on them without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Invalid request
    InvalidRequest = 5,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order has already been paid
    OrderAlreadyPaid = 4002,
    /// Order is empty
    OrderEmpty = 4007,
    /// Item quantity is not a positive integer
    OrderInvalidQuantity = 4008,
    /// Status transition is not allowed from the current status
    OrderInvalidTransition = 4009,
    /// Order has been canceled
    OrderCanceled = 4010,

    // ==================== 5xxx: Payment ====================
    /// Invalid payment method
    PaymentInvalidMethod = 5003,
    /// External order reference could not be parsed
    PaymentReferenceMalformed = 5006,
    /// Gateway notification failed authenticity checks
    PaymentNotificationInvalid = 5007,
    /// Payment gateway request failed
    PaymentGatewayError = 5008,

    // ==================== 6xxx: Menu ====================
    /// One or more menu items are unknown or unavailable
    MenuUnavailable = 6003,

    // ==================== 7xxx: Table ====================
    /// Table not found
    TableNotFound = 7001,
    /// No table session supplied
    TableSessionRequired = 7004,
    /// Table session does not exist
    TableSessionInvalid = 7005,
    /// Table session belongs to another table
    TableSessionMismatch = 7006,
    /// Table session has expired
    TableSessionExpired = 7007,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Network error
    NetworkError = 9003,
    /// Operation timeout
    TimeoutError = 9004,
    /// Configuration error
    ConfigError = 9005,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::InvalidRequest => "Invalid request",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderAlreadyPaid => "Order has already been paid",
            ErrorCode::OrderEmpty => "Order must contain at least one item",
            ErrorCode::OrderInvalidQuantity => "Item quantity must be at least 1",
            ErrorCode::OrderInvalidTransition => "Order status transition is not allowed",
            ErrorCode::OrderCanceled => "Order has been canceled",

            // Payment
            ErrorCode::PaymentInvalidMethod => "Invalid payment method",
            ErrorCode::PaymentReferenceMalformed => "Malformed payment reference",
            ErrorCode::PaymentNotificationInvalid => "Payment notification failed verification",
            ErrorCode::PaymentGatewayError => "Payment gateway request failed",

            // Menu
            ErrorCode::MenuUnavailable => "Some menu items are not available",

            // Table
            ErrorCode::TableNotFound => "Table not found",
            ErrorCode::TableSessionRequired => "Table session is required",
            ErrorCode::TableSessionInvalid => "Table session is invalid",
            ErrorCode::TableSessionMismatch => "Table session does not belong to this table",
            ErrorCode::TableSessionExpired => "Table session has expired, please scan the QR code again",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::NetworkError => "Network error",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            5 => Ok(ErrorCode::InvalidRequest),

            // Order
            4001 => Ok(ErrorCode::OrderNotFound),
            4002 => Ok(ErrorCode::OrderAlreadyPaid),
            4007 => Ok(ErrorCode::OrderEmpty),
            4008 => Ok(ErrorCode::OrderInvalidQuantity),
            4009 => Ok(ErrorCode::OrderInvalidTransition),
            4010 => Ok(ErrorCode::OrderCanceled),

            // Payment
            5003 => Ok(ErrorCode::PaymentInvalidMethod),
            5006 => Ok(ErrorCode::PaymentReferenceMalformed),
            5007 => Ok(ErrorCode::PaymentNotificationInvalid),
            5008 => Ok(ErrorCode::PaymentGatewayError),

            // Menu
            6003 => Ok(ErrorCode::MenuUnavailable),

            // Table
            7001 => Ok(ErrorCode::TableNotFound),
            7004 => Ok(ErrorCode::TableSessionRequired),
            7005 => Ok(ErrorCode::TableSessionInvalid),
            7006 => Ok(ErrorCode::TableSessionMismatch),
            7007 => Ok(ErrorCode::TableSessionExpired),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::NetworkError),
            9004 => Ok(ErrorCode::TimeoutError),
            9005 => Ok(ErrorCode::ConfigError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
