//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // Success
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound | Self::OrderNotFound | Self::TableNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::OrderAlreadyPaid | Self::OrderInvalidTransition | Self::OrderCanceled => {
                StatusCode::CONFLICT
            }

            // 401 Unauthorized
            Self::TableSessionRequired
            | Self::TableSessionInvalid
            | Self::TableSessionExpired
            | Self::PaymentNotificationInvalid => StatusCode::UNAUTHORIZED,

            // 403 Forbidden
            Self::TableSessionMismatch => StatusCode::FORBIDDEN,

            // 422 Unprocessable (cart refers to things that cannot be sold)
            Self::MenuUnavailable => StatusCode::UNPROCESSABLE_ENTITY,

            // 502 Bad Gateway (upstream payment processor failed)
            Self::PaymentGatewayError => StatusCode::BAD_GATEWAY,

            // 503 Service Unavailable (transient errors, client can retry)
            Self::NetworkError | Self::TimeoutError => StatusCode::SERVICE_UNAVAILABLE,

            // 500 Internal Server Error
            Self::InternalError | Self::DatabaseError | Self::ConfigError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }

            // 400 Bad Request (default for validation/business errors)
            _ => StatusCode::BAD_REQUEST,
        }
    }
}
