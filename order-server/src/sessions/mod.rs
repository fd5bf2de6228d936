//! Table Session Manager
//!
//! Sessions are never closed explicitly. Validity is time-based and checked
//! whenever a session is used; the purge task only bounds table growth.

use crate::db::repository::{dining_table, table_session};
use crate::orders::{OrderError, OrderResult};
use shared::models::TableSession;
use shared::util::{now_millis, random_token};
use sqlx::SqlitePool;

/// 32 random bytes, hex encoded
const SESSION_TOKEN_BYTES: usize = 32;

#[derive(Clone)]
pub struct SessionManager {
    pool: SqlitePool,
    ttl_millis: i64,
    allow_multiple_active: bool,
}

impl SessionManager {
    pub fn new(pool: SqlitePool, ttl_millis: i64, allow_multiple_active: bool) -> Self {
        Self {
            pool,
            ttl_millis,
            allow_multiple_active,
        }
    }

    pub fn ttl_millis(&self) -> i64 {
        self.ttl_millis
    }

    /// Issue a session for the table printed with `table_number`
    ///
    /// With multiple active sessions disallowed, a still-valid session for
    /// the table is handed out again instead of creating another one.
    pub async fn start_session(&self, table_number: i32) -> OrderResult<TableSession> {
        let table = dining_table::find_by_number(&self.pool, table_number)
            .await?
            .ok_or(OrderError::TableNotFound(table_number))?;

        let now = now_millis();

        if !self.allow_multiple_active
            && let Some(existing) =
                table_session::find_latest_for_table(&self.pool, table.id, now - self.ttl_millis)
                    .await?
        {
            tracing::debug!(table_number, "Reusing active table session");
            return Ok(existing);
        }

        let session = TableSession {
            id: random_token(SESSION_TOKEN_BYTES),
            table_id: table.id,
            table_number: table.number,
            created_at: now,
        };
        table_session::create(&self.pool, &session.id, session.table_id, session.created_at)
            .await?;

        tracing::info!(table_number, "Table session started");
        Ok(session)
    }

    /// Check that `session_id` exists, belongs to `claimed_table_number` and
    /// has not outlived the TTL, in that order
    pub async fn validate_session(
        &self,
        session_id: &str,
        claimed_table_number: i32,
    ) -> OrderResult<TableSession> {
        let session = table_session::find_by_id(&self.pool, session_id)
            .await?
            .ok_or(OrderError::InvalidSession)?;

        if session.table_number != claimed_table_number {
            tracing::warn!(
                session_table = session.table_number,
                claimed_table = claimed_table_number,
                "Table session used against another table"
            );
            return Err(OrderError::TableMismatch {
                session_table: session.table_number,
                claimed: claimed_table_number,
            });
        }

        if session.is_expired(now_millis(), self.ttl_millis) {
            return Err(OrderError::SessionExpired);
        }

        Ok(session)
    }

    /// Delete sessions that can no longer validate
    pub async fn purge_expired(&self) -> OrderResult<u64> {
        let removed = table_session::purge_older_than(&self.pool, now_millis() - self.ttl_millis).await?;
        if removed > 0 {
            tracing::info!(removed, "Purged expired table sessions");
        }
        Ok(removed)
    }
}
