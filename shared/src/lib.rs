//! Shared types for the table-ordering platform
//!
//! Error types, domain models and small utilities used by the order server
//! and its tests.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use serde::{Deserialize, Serialize};
