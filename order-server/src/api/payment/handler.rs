//! Payment notification handler
//!
//! Any 2xx tells the gateway to stop retrying, so only outcomes that are
//! final answer 200: applied, duplicate, or a status that needs no change.
//! Bad payloads answer 4xx and storage failures 5xx so the gateway retries.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use serde::Serialize;

use shared::error::{AppError, AppResult, ErrorCode};

use crate::core::ServerState;
use crate::orders::NotificationOutcome;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationAck {
    /// applied | duplicate | unchanged
    pub result: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<i64>,
}

/// POST /payment/notification
pub async fn handle_notification(
    State(state): State<ServerState>,
    body: Bytes,
) -> AppResult<Json<NotificationAck>> {
    let payload: serde_json::Value = serde_json::from_slice(&body).map_err(|e| {
        tracing::warn!(error = %e, "Unparseable payment notification body");
        AppError::with_message(ErrorCode::PaymentNotificationInvalid, "Body is not valid JSON")
    })?;

    let outcome = state
        .lifecycle
        .handle_notification(&payload)
        .await
        .inspect_err(|e| tracing::warn!(error = %e, "Payment notification rejected"))?;

    let ack = match outcome {
        NotificationOutcome::Applied { order_id } => NotificationAck {
            result: "applied",
            order_id: Some(order_id),
        },
        NotificationOutcome::Duplicate { order_id } => NotificationAck {
            result: "duplicate",
            order_id: Some(order_id),
        },
        NotificationOutcome::Unchanged(_) => NotificationAck {
            result: "unchanged",
            order_id: None,
        },
    };
    Ok(Json(ack))
}
