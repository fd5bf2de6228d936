//! Data models
//!
//! Shared between the order server and its clients (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY), except table sessions
//! which carry an opaque random string.

pub mod dining_table;
pub mod menu;
pub mod order;
pub mod table_session;

// Re-exports
pub use dining_table::*;
pub use menu::*;
pub use order::*;
pub use table_session::*;
