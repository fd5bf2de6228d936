//! Order Lifecycle / Status Engine
//!
//! Owns every write to `orders.status` and `orders.payment_status` after
//! creation. Staff transitions follow [`OrderStatus::can_transition_to`];
//! payment confirmation marks the order PAID and advances PENDING to
//! PREPARING. Both publish events on the [`EventBus`].

use super::command::UpdateStatusCommand;
use super::error::{OrderError, OrderResult};
use crate::db::repository::order;
use crate::events::{EventBus, OrderEvent};
use crate::payment::{PaymentGateway, parse_reference};
use shared::models::{OrderDetail, OrderStatus};
use shared::util::now_millis;
use sqlx::SqlitePool;
use std::sync::Arc;

/// Default page size of the order list
pub const ORDER_LIST_LIMIT: i64 = 200;

/// Business meaning of a gateway transaction status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentOutcome {
    Paid,
    /// Captured but flagged for fraud review
    Held,
    /// Canceled, denied or expired
    Unpaid,
    Ignored,
}

/// Map the gateway vocabulary onto [`PaymentOutcome`]
pub fn map_gateway_status(transaction_status: &str, fraud_status: Option<&str>) -> PaymentOutcome {
    match (transaction_status, fraud_status) {
        ("capture", Some("accept")) => PaymentOutcome::Paid,
        ("capture", Some("challenge")) => PaymentOutcome::Held,
        ("settlement", _) => PaymentOutcome::Paid,
        ("cancel" | "deny" | "expire", _) => PaymentOutcome::Unpaid,
        _ => PaymentOutcome::Ignored,
    }
}

/// What a notification did to stored state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationOutcome {
    /// Order marked PAID, events published
    Applied { order_id: i64 },
    /// Same payment already recorded; nothing written, nothing published
    Duplicate { order_id: i64 },
    /// Any non-PAID outcome; stored state untouched
    Unchanged(PaymentOutcome),
}

#[derive(Clone)]
pub struct OrderLifecycle {
    pool: SqlitePool,
    gateway: Arc<dyn PaymentGateway>,
    events: EventBus,
    reference_prefix: String,
}

impl OrderLifecycle {
    pub fn new(
        pool: SqlitePool,
        gateway: Arc<dyn PaymentGateway>,
        events: EventBus,
        reference_prefix: impl Into<String>,
    ) -> Self {
        Self {
            pool,
            gateway,
            events,
            reference_prefix: reference_prefix.into(),
        }
    }

    pub async fn get_order(&self, order_id: i64) -> OrderResult<OrderDetail> {
        order::find_detail(&self.pool, order_id)
            .await?
            .ok_or(OrderError::OrderNotFound(order_id))
    }

    pub async fn list_orders(&self, status: Option<OrderStatus>) -> OrderResult<Vec<OrderDetail>> {
        Ok(order::list(&self.pool, status, ORDER_LIST_LIMIT).await?)
    }

    /// Staff-driven transition (accept, done, reject)
    ///
    /// The write is a compare-and-set on the status read here, so of two
    /// racing staff actions only one applies.
    pub async fn update_status(&self, cmd: UpdateStatusCommand) -> OrderResult<OrderDetail> {
        let current = order::find_by_id(&self.pool, cmd.order_id)
            .await?
            .ok_or(OrderError::OrderNotFound(cmd.order_id))?;

        if !current.status.can_transition_to(cmd.status) {
            return Err(OrderError::InvalidTransition {
                order_id: cmd.order_id,
                from: current.status,
                to: cmd.status,
            });
        }

        let applied = order::transition_status(
            &self.pool,
            cmd.order_id,
            current.status,
            cmd.status,
            now_millis(),
        )
        .await?;

        if !applied {
            let latest = order::find_by_id(&self.pool, cmd.order_id)
                .await?
                .ok_or(OrderError::OrderNotFound(cmd.order_id))?;
            return Err(OrderError::InvalidTransition {
                order_id: cmd.order_id,
                from: latest.status,
                to: cmd.status,
            });
        }

        tracing::info!(
            order_id = cmd.order_id,
            from = %current.status,
            to = %cmd.status,
            "Order status updated"
        );

        let detail = self.get_order(cmd.order_id).await?;
        self.events
            .publish(OrderEvent::StatusUpdated(Box::new(detail.clone())));
        Ok(detail)
    }

    /// Verify a raw gateway notification and apply it
    pub async fn handle_notification(
        &self,
        payload: &serde_json::Value,
    ) -> OrderResult<NotificationOutcome> {
        let notification = self.gateway.verify_notification(payload).await?;
        let outcome = map_gateway_status(
            &notification.transaction_status,
            notification.fraud_status.as_deref(),
        );

        tracing::info!(
            reference = %notification.external_ref,
            transaction_status = %notification.transaction_status,
            fraud_status = ?notification.fraud_status,
            outcome = ?outcome,
            "Payment notification received"
        );

        match outcome {
            PaymentOutcome::Paid => self.apply_payment(&notification.external_ref).await,
            PaymentOutcome::Held => {
                tracing::warn!(reference = %notification.external_ref, "Payment held for fraud review");
                Ok(NotificationOutcome::Unchanged(outcome))
            }
            PaymentOutcome::Unpaid | PaymentOutcome::Ignored => {
                Ok(NotificationOutcome::Unchanged(outcome))
            }
        }
    }

    /// Record a confirmed payment for the order named by `external_ref`
    ///
    /// Idempotent: a repeated confirmation changes nothing and publishes
    /// nothing. Status never moves backward; DONE and CANCELED orders only
    /// gain `payment_status = PAID`.
    pub async fn apply_payment(&self, external_ref: &str) -> OrderResult<NotificationOutcome> {
        let order_id = parse_reference(&self.reference_prefix, external_ref)
            .ok_or_else(|| OrderError::MalformedReference(external_ref.to_string()))?;

        let before = order::find_by_id(&self.pool, order_id)
            .await?
            .ok_or(OrderError::OrderNotFound(order_id))?;

        if !order::mark_paid(&self.pool, order_id, now_millis()).await? {
            tracing::info!(order_id, "Duplicate payment notification ignored");
            return Ok(NotificationOutcome::Duplicate { order_id });
        }

        if before.status == OrderStatus::Canceled {
            tracing::warn!(order_id, "Payment received for a canceled order, refund required");
        }

        let detail = self.get_order(order_id).await?;
        tracing::info!(order_id, status = %detail.order.status, "Order paid");

        self.events.publish(OrderEvent::PaymentSucceeded {
            order_id,
            message: format!("Order #{order_id} has been paid"),
        });
        self.events
            .publish(OrderEvent::StatusUpdated(Box::new(detail)));

        Ok(NotificationOutcome::Applied { order_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paid_statuses() {
        assert_eq!(map_gateway_status("capture", Some("accept")), PaymentOutcome::Paid);
        assert_eq!(map_gateway_status("settlement", None), PaymentOutcome::Paid);
        assert_eq!(map_gateway_status("settlement", Some("accept")), PaymentOutcome::Paid);
    }

    #[test]
    fn test_held_and_unpaid_statuses() {
        assert_eq!(map_gateway_status("capture", Some("challenge")), PaymentOutcome::Held);
        for status in ["cancel", "deny", "expire"] {
            assert_eq!(map_gateway_status(status, None), PaymentOutcome::Unpaid);
        }
    }

    #[test]
    fn test_unknown_statuses_ignored() {
        assert_eq!(map_gateway_status("pending", None), PaymentOutcome::Ignored);
        assert_eq!(map_gateway_status("refund", None), PaymentOutcome::Ignored);
        assert_eq!(map_gateway_status("capture", None), PaymentOutcome::Ignored);
        assert_eq!(map_gateway_status("capture", Some("deny")), PaymentOutcome::Ignored);
    }
}
