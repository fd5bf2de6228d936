//! Payment gateway callback
//!
//! POST /payment/notification carries no auth header; authenticity comes
//! from the gateway signature checked by the payment adapter.

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/payment/notification", post(handler::handle_notification))
}
