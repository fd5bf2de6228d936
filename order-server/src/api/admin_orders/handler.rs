//! Admin Order API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use shared::error::{AppError, AppResult};
use shared::models::{OrderDetail, OrderStatus};

use crate::core::ServerState;
use crate::orders::command::{UpdateStatusCommand, UpdateStatusRequest};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
}

/// GET /admin/orders?status=
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<OrderDetail>>> {
    let status = match query.status.as_deref().filter(|s| !s.is_empty()) {
        Some(raw) => Some(
            raw.parse::<OrderStatus>()
                .map_err(|e| AppError::invalid_request(e).with_detail("field", "status"))?,
        ),
        None => None,
    };
    let orders = state.lifecycle.list_orders(status).await?;
    Ok(Json(orders))
}

/// GET /admin/orders/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<OrderDetail>> {
    Ok(Json(state.lifecycle.get_order(id).await?))
}

/// PATCH /admin/orders/{id}/status
pub async fn update_status(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateStatusRequest>,
) -> AppResult<Json<OrderDetail>> {
    let cmd = UpdateStatusCommand::from_request(id, payload)?;
    let detail = state.lifecycle.update_status(cmd).await?;
    Ok(Json(detail))
}
