//! Table Session Model

use serde::Serialize;

/// Time-boxed binding between a table and an ordering window
///
/// Issued when a customer scans the table QR code. Sessions are never closed
/// explicitly: validity is `now - created_at <= ttl`, checked at use time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct TableSession {
    /// Opaque, unguessable identifier
    #[serde(rename = "sessionId")]
    pub id: String,
    #[serde(skip_serializing)]
    pub table_id: i64,
    pub table_number: i32,
    /// Unix milliseconds
    pub created_at: i64,
}

impl TableSession {
    /// Milliseconds elapsed since issuance at `now`
    pub fn age_millis(&self, now: i64) -> i64 {
        now - self.created_at
    }

    /// Whether the session is past its lifetime at `now`
    ///
    /// The boundary is inclusive: a session exactly `ttl_millis` old is still valid.
    pub fn is_expired(&self, now: i64, ttl_millis: i64) -> bool {
        self.age_millis(now) > ttl_millis
    }
}
