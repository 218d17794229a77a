//! Menu queries.

use chrono::Utc;
use palisade_common::Page;
use serde::Deserialize;
use sqlx::SqlitePool;

use super::models::Menu;

#[derive(Debug, Deserialize)]
pub struct CreateMenu {
    pub name: String,
    pub icon: Option<String>,
    pub sort_order: Option<i64>,
    pub permission_id: Option<String>,
    pub component_path: Option<String>,
    pub remark: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateMenu {
    pub name: Option<String>,
    pub icon: Option<String>,
    pub sort_order: Option<i64>,
    pub permission_id: Option<String>,
    pub component_path: Option<String>,
    pub status: Option<i64>,
    pub remark: Option<String>,
}

pub async fn list(pool: &SqlitePool, page: i64, page_size: i64) -> sqlx::Result<Page<Menu>> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM menus WHERE is_delete = 0")
        .fetch_one(pool)
        .await?;

    let items = sqlx::query_as::<_, Menu>(
        "SELECT * FROM menus WHERE is_delete = 0 ORDER BY sort_order, id LIMIT ? OFFSET ?",
    )
    .bind(page_size)
    .bind((page - 1) * page_size)
    .fetch_all(pool)
    .await?;

    Ok(Page { total, items })
}

pub async fn find(pool: &SqlitePool, id: i64) -> sqlx::Result<Option<Menu>> {
    sqlx::query_as::<_, Menu>("SELECT * FROM menus WHERE id = ? AND is_delete = 0")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn create(
    pool: &SqlitePool,
    new: &CreateMenu,
    create_by: Option<&str>,
) -> sqlx::Result<i64> {
    let now = Utc::now();
    let result = sqlx::query(
        "INSERT INTO menus (name, icon, sort_order, permission_id, component_path, \
         create_time, update_time, status, is_delete, create_by, remark) \
         VALUES (?, ?, ?, ?, ?, ?, ?, 1, 0, ?, ?)",
    )
    .bind(&new.name)
    .bind(&new.icon)
    .bind(new.sort_order)
    .bind(&new.permission_id)
    .bind(&new.component_path)
    .bind(now)
    .bind(now)
    .bind(create_by)
    .bind(&new.remark)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

pub async fn update(
    pool: &SqlitePool,
    id: i64,
    update: &UpdateMenu,
    update_by: Option<&str>,
) -> sqlx::Result<bool> {
    let result = sqlx::query(
        "UPDATE menus SET \
         name = COALESCE(?, name), \
         icon = COALESCE(?, icon), \
         sort_order = COALESCE(?, sort_order), \
         permission_id = COALESCE(?, permission_id), \
         component_path = COALESCE(?, component_path), \
         status = COALESCE(?, status), \
         remark = COALESCE(?, remark), \
         update_time = ?, \
         update_by = COALESCE(?, update_by) \
         WHERE id = ? AND is_delete = 0",
    )
    .bind(&update.name)
    .bind(&update.icon)
    .bind(update.sort_order)
    .bind(&update.permission_id)
    .bind(&update.component_path)
    .bind(update.status)
    .bind(&update.remark)
    .bind(Utc::now())
    .bind(update_by)
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn soft_delete(pool: &SqlitePool, id: i64) -> sqlx::Result<bool> {
    let result = sqlx::query("UPDATE menus SET is_delete = 1, update_time = ? WHERE id = ? AND is_delete = 0")
        .bind(Utc::now())
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
