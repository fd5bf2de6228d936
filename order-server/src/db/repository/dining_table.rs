//! Dining Table Repository

use super::{RepoError, RepoResult};
use shared::models::{DiningTable, DiningTableCreate};
use sqlx::SqlitePool;

const SELECT: &str = "SELECT id, number, location, capacity, is_occupied FROM dining_table";

pub async fn find_by_number(pool: &SqlitePool, number: i32) -> RepoResult<Option<DiningTable>> {
    let sql = format!("{SELECT} WHERE number = ?");
    let table = sqlx::query_as::<_, DiningTable>(&sql)
        .bind(number)
        .fetch_optional(pool)
        .await?;
    Ok(table)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<DiningTable>> {
    let sql = format!("{SELECT} WHERE id = ?");
    let table = sqlx::query_as::<_, DiningTable>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(table)
}

pub async fn create(pool: &SqlitePool, data: DiningTableCreate) -> RepoResult<DiningTable> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO dining_table (number, location, capacity) VALUES (?, ?, ?) RETURNING id",
    )
    .bind(data.number)
    .bind(data.location.unwrap_or_default())
    .bind(data.capacity.unwrap_or(4))
    .fetch_one(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create dining table".into()))
}
