//! Order Intake
//!
//! Validates a cart against its table session and the catalog, recomputes
//! every price from the catalog, and persists header + items atomically.
//! Non-cash orders then get a payment token; that call happens after commit
//! and its failure never undoes the order.

use super::command::{CartLine, CreateOrderCommand};
use super::error::{OrderError, OrderResult};
use crate::db::repository::order::{NewOrder, NewOrderItem};
use crate::db::repository::{dining_table, menu, order};
use crate::payment::{
    GatewayError, PaymentGateway, PaymentToken, TransactionDescriptor, TransactionItem,
    build_reference,
};
use crate::sessions::SessionManager;
use serde::Serialize;
use shared::models::{Menu, OrderDetail, OrderStatus, PaymentStatus};
use shared::util::now_millis;
use sqlx::SqlitePool;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Gateway limit on item names
const GATEWAY_ITEM_NAME_MAX: usize = 50;

/// Result of a successful order placement
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedOrder {
    pub order: OrderDetail,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snap_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
    /// Set when the order was saved but the payment token could not be issued
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_error: Option<String>,
}

#[derive(Clone)]
pub struct OrderIntake {
    pool: SqlitePool,
    sessions: SessionManager,
    gateway: Arc<dyn PaymentGateway>,
    reference_prefix: String,
}

impl OrderIntake {
    pub fn new(
        pool: SqlitePool,
        sessions: SessionManager,
        gateway: Arc<dyn PaymentGateway>,
        reference_prefix: impl Into<String>,
    ) -> Self {
        Self {
            pool,
            sessions,
            gateway,
            reference_prefix: reference_prefix.into(),
        }
    }

    pub async fn create_order(&self, cmd: CreateOrderCommand) -> OrderResult<PlacedOrder> {
        // 1-2. session
        let session_id = cmd.session_id.as_deref().ok_or(OrderError::MissingSession)?;
        self.sessions
            .validate_session(session_id, cmd.table_number)
            .await?;

        // 3-4. cart shape
        if cmd.items.is_empty() {
            return Err(OrderError::EmptyOrder);
        }
        if let Some(line) = cmd.items.iter().find(|line| line.quantity < 1) {
            return Err(OrderError::InvalidQuantity {
                menu_id: line.menu_id,
                quantity: line.quantity,
            });
        }

        // 5. table
        let table = dining_table::find_by_number(&self.pool, cmd.table_number)
            .await?
            .ok_or(OrderError::TableNotFound(cmd.table_number))?;

        // 6. catalog
        let catalog = self.resolve_menus(&cmd.items).await?;

        // 7. prices come from the catalog only
        let (items, total_price) = price_lines(&cmd.items, &catalog)?;
        if let Some(client_total) = cmd.client_total
            && client_total != total_price
        {
            tracing::warn!(
                table_number = cmd.table_number,
                client_total,
                server_total = total_price,
                "Client total differs from catalog total, using catalog total"
            );
        }

        // 8-9. header + items in one transaction
        let new_order = NewOrder {
            customer_name: cmd.customer_name,
            table_id: table.id,
            total_price,
            payment_method: cmd.payment_method,
            items,
        };
        let order_id = order::create_with_items(&self.pool, &new_order, now_millis()).await?;

        tracing::info!(
            order_id,
            table_number = cmd.table_number,
            total_price,
            payment_method = ?cmd.payment_method,
            "Order created"
        );

        let detail = order::find_detail(&self.pool, order_id)
            .await?
            .ok_or(OrderError::OrderNotFound(order_id))?;

        if !cmd.payment_method.requires_gateway() {
            return Ok(PlacedOrder {
                order: detail,
                snap_token: None,
                redirect_url: None,
                payment_error: None,
            });
        }

        match self.issue_token(&detail).await {
            Ok(token) => Ok(PlacedOrder {
                order: detail,
                snap_token: Some(token.token),
                redirect_url: token.redirect_url,
                payment_error: None,
            }),
            Err(e) => {
                tracing::error!(order_id, error = %e, "Payment token request failed, order kept as unpaid");
                Ok(PlacedOrder {
                    order: detail,
                    snap_token: None,
                    redirect_url: None,
                    payment_error: Some("Order placed but payment could not be started, please retry payment".into()),
                })
            }
        }
    }

    /// Issue a fresh token for an unpaid non-cash order (pay-later retry)
    pub async fn request_payment_token(&self, order_id: i64) -> OrderResult<PaymentToken> {
        let detail = order::find_detail(&self.pool, order_id)
            .await?
            .ok_or(OrderError::OrderNotFound(order_id))?;

        if !detail.order.payment_method.requires_gateway() {
            return Err(OrderError::PaymentNotRequired(order_id));
        }
        if detail.order.payment_status == PaymentStatus::Paid {
            return Err(OrderError::AlreadyPaid(order_id));
        }
        if detail.order.status == OrderStatus::Canceled {
            return Err(OrderError::OrderCanceled(order_id));
        }

        let token = self.issue_token(&detail).await?;
        tracing::info!(order_id, "Payment token reissued");
        Ok(token)
    }

    /// Every requested id must resolve to exactly one available menu
    async fn resolve_menus(&self, lines: &[CartLine]) -> OrderResult<HashMap<i64, Menu>> {
        let requested: Vec<i64> = lines.iter().map(|line| line.menu_id).collect();
        let unique: HashSet<i64> = requested.iter().copied().collect();
        let ids: Vec<i64> = unique.iter().copied().collect();

        let catalog: HashMap<i64, Menu> = menu::find_available_by_ids(&self.pool, &ids)
            .await?
            .into_iter()
            .map(|m| (m.id, m))
            .collect();

        if catalog.len() == requested.len() {
            return Ok(catalog);
        }

        let mut seen = HashSet::new();
        let mut rejected: Vec<i64> = requested
            .iter()
            .filter(|id| !catalog.contains_key(*id) || !seen.insert(**id))
            .copied()
            .collect();
        rejected.sort_unstable();
        rejected.dedup();

        tracing::warn!(menu_ids = ?rejected, "Cart has unavailable, unknown or duplicate menu items");
        Err(OrderError::MenuUnavailable(rejected))
    }

    async fn issue_token(&self, detail: &OrderDetail) -> Result<PaymentToken, GatewayError> {
        let descriptor = TransactionDescriptor {
            external_ref: build_reference(&self.reference_prefix, detail.order.id, now_millis()),
            gross_amount: detail.order.total_price,
            items: detail
                .items
                .iter()
                .map(|item| TransactionItem {
                    id: item.menu_id.to_string(),
                    name: item.menu_name.chars().take(GATEWAY_ITEM_NAME_MAX).collect(),
                    price: item.price,
                    quantity: item.quantity,
                })
                .collect(),
            customer_name: detail.order.customer_name.clone(),
        };
        self.gateway.request_token(&descriptor).await
    }
}

/// Snapshot catalog prices onto the lines and sum them
fn price_lines(
    lines: &[CartLine],
    catalog: &HashMap<i64, Menu>,
) -> OrderResult<(Vec<NewOrderItem>, i64)> {
    let mut total: i64 = 0;
    let mut items = Vec::with_capacity(lines.len());
    let mut tampered = 0usize;

    for line in lines {
        let menu = catalog
            .get(&line.menu_id)
            .ok_or_else(|| OrderError::MenuUnavailable(vec![line.menu_id]))?;

        let overflow = || OrderError::InvalidQuantity {
            menu_id: line.menu_id,
            quantity: line.quantity,
        };
        let line_total = menu.price.checked_mul(line.quantity).ok_or_else(overflow)?;
        total = total.checked_add(line_total).ok_or_else(overflow)?;

        if line.client_price.is_some_and(|p| p != menu.price) {
            tampered += 1;
        }

        items.push(NewOrderItem {
            menu_id: menu.id,
            quantity: line.quantity,
            price: menu.price,
            note: line.note.clone(),
        });
    }

    if tampered > 0 {
        tracing::warn!(lines = tampered, "Client unit prices differ from catalog, ignored");
    }

    Ok((items, total))
}
