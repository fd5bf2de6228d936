//! Table Session Repository

use super::RepoResult;
use shared::models::TableSession;
use sqlx::SqlitePool;

const SELECT: &str = "SELECT s.id, s.table_id, t.number AS table_number, s.created_at \
    FROM table_session s JOIN dining_table t ON t.id = s.table_id";

pub async fn create(pool: &SqlitePool, id: &str, table_id: i64, created_at: i64) -> RepoResult<()> {
    sqlx::query("INSERT INTO table_session (id, table_id, created_at) VALUES (?, ?, ?)")
        .bind(id)
        .bind(table_id)
        .bind(created_at)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn find_by_id(pool: &SqlitePool, id: &str) -> RepoResult<Option<TableSession>> {
    let sql = format!("{SELECT} WHERE s.id = ?");
    let session = sqlx::query_as::<_, TableSession>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(session)
}

/// Newest session issued for a table at or after `not_before`
pub async fn find_latest_for_table(
    pool: &SqlitePool,
    table_id: i64,
    not_before: i64,
) -> RepoResult<Option<TableSession>> {
    let sql = format!(
        "{SELECT} WHERE s.table_id = ? AND s.created_at >= ? ORDER BY s.created_at DESC LIMIT 1"
    );
    let session = sqlx::query_as::<_, TableSession>(&sql)
        .bind(table_id)
        .bind(not_before)
        .fetch_optional(pool)
        .await?;
    Ok(session)
}

/// Delete sessions issued before `cutoff`, returning how many were removed
pub async fn purge_older_than(pool: &SqlitePool, cutoff: i64) -> RepoResult<u64> {
    let rows = sqlx::query("DELETE FROM table_session WHERE created_at < ?")
        .bind(cutoff)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected())
}
