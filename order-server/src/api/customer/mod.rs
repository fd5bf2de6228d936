//! Customer API Module
//!
//! Endpoints used by the table QR ordering page. No login: the table session
//! issued by `/customer/session` is what ties a cart to a table.

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/customer", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/session", post(handler::start_session))
        .route("/menus", get(handler::list_menus))
        .route("/order", post(handler::create_order))
        .route("/order/{id}", get(handler::get_order))
        .route("/order/{id}/payment-token", post(handler::retry_payment_token))
}
