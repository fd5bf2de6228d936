//! Menu Catalog Repository (read side used by ordering)

use super::{RepoError, RepoResult};
use shared::models::{Menu, MenuCategory, MenuCreate};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

const SELECT: &str =
    "SELECT id, name, slug, price, category_id, is_available, image FROM menu";

/// Menus with the given ids that are currently available
///
/// Unknown or unavailable ids are simply absent from the result; callers
/// compare against what they asked for.
pub async fn find_available_by_ids(pool: &SqlitePool, ids: &[i64]) -> RepoResult<Vec<Menu>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(SELECT);
    qb.push(" WHERE is_available = 1 AND id IN (");
    let mut separated = qb.separated(", ");
    for id in ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(")");
    let menus = qb.build_query_as::<Menu>().fetch_all(pool).await?;
    Ok(menus)
}

pub async fn find_all_available(pool: &SqlitePool) -> RepoResult<Vec<Menu>> {
    let sql = format!("{SELECT} WHERE is_available = 1 ORDER BY category_id, name");
    let menus = sqlx::query_as::<_, Menu>(&sql).fetch_all(pool).await?;
    Ok(menus)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Menu>> {
    let sql = format!("{SELECT} WHERE id = ?");
    let menu = sqlx::query_as::<_, Menu>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(menu)
}

pub async fn create_category(pool: &SqlitePool, name: &str, slug: &str) -> RepoResult<MenuCategory> {
    let category = sqlx::query_as::<_, MenuCategory>(
        "INSERT INTO menu_category (name, slug) VALUES (?, ?) RETURNING id, name, slug",
    )
    .bind(name)
    .bind(slug)
    .fetch_one(pool)
    .await?;
    Ok(category)
}

pub async fn create(pool: &SqlitePool, data: MenuCreate) -> RepoResult<Menu> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO menu (name, slug, price, category_id, is_available, image) VALUES (?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(&data.name)
    .bind(&data.slug)
    .bind(data.price)
    .bind(data.category_id)
    .bind(data.is_available.unwrap_or(true))
    .bind(&data.image)
    .fetch_one(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create menu".into()))
}
