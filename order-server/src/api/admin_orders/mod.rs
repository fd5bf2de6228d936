//! Admin Order API Module
//!
//! Kitchen/admin view of orders. Authentication of these routes belongs to
//! the admin panel in front of this service.

mod handler;

use axum::{
    Router,
    routing::{get, patch},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        // 订单列表（实时推送的轮询兜底）
        .route("/admin/orders", get(handler::list))
        .route("/admin/orders/{id}", get(handler::get_by_id))
        .route("/admin/orders/{id}/status", patch(handler::update_status))
}
