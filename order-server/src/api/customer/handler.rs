//! Customer API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use shared::error::{AppError, AppResult};
use shared::models::{Menu, OrderDetail, TableSession};

use crate::core::ServerState;
use crate::db::repository::menu;
use crate::orders::PlacedOrder;
use crate::orders::command::{
    CreateOrderCommand, CreateOrderRequest, StartSessionCommand, StartSessionRequest,
};
use crate::payment::PaymentToken;

/// POST /customer/session
pub async fn start_session(
    State(state): State<ServerState>,
    Json(payload): Json<StartSessionRequest>,
) -> AppResult<(StatusCode, Json<TableSession>)> {
    let cmd = StartSessionCommand::try_from(payload)?;
    let session = state.sessions.start_session(cmd.table_number).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// GET /customer/menus
pub async fn list_menus(State(state): State<ServerState>) -> AppResult<Json<Vec<Menu>>> {
    let menus = menu::find_all_available(&state.db.pool)
        .await
        .map_err(|e| AppError::database(e.to_string()))?;
    Ok(Json(menus))
}

/// POST /customer/order
pub async fn create_order(
    State(state): State<ServerState>,
    Json(payload): Json<CreateOrderRequest>,
) -> AppResult<(StatusCode, Json<PlacedOrder>)> {
    let cmd = CreateOrderCommand::try_from(payload)?;
    let placed = state.intake.create_order(cmd).await?;
    Ok((StatusCode::CREATED, Json(placed)))
}

/// GET /customer/order/{id}
pub async fn get_order(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<OrderDetail>> {
    let detail = state.lifecycle.get_order(id).await?;
    Ok(Json(detail))
}

/// POST /customer/order/{id}/payment-token
pub async fn retry_payment_token(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<PaymentToken>> {
    let token = state.intake.request_payment_token(id).await?;
    Ok(Json(token))
}
