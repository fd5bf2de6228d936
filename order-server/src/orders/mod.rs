//! Ordering core: intake, lifecycle and their boundary commands

pub mod command;
mod error;
mod intake;
mod lifecycle;

pub use error::{OrderError, OrderResult};
pub use intake::{OrderIntake, PlacedOrder};
pub use lifecycle::{
    NotificationOutcome, ORDER_LIST_LIMIT, OrderLifecycle, PaymentOutcome, map_gateway_status,
};
