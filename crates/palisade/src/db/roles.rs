//! Role queries.

use chrono::Utc;
use palisade_common::Page;
use serde::Deserialize;
use sqlx::SqlitePool;

use super::models::{Menu, Role};

#[derive(Debug, Deserialize)]
pub struct CreateRole {
    pub role_code: String,
    pub name: String,
    pub permission_char: Option<String>,
    pub remark: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRole {
    pub name: Option<String>,
    pub permission_char: Option<String>,
    pub status: Option<i64>,
    pub remark: Option<String>,
}

pub async fn list(pool: &SqlitePool, page: i64, page_size: i64) -> sqlx::Result<Page<Role>> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM roles WHERE is_delete = 0")
        .fetch_one(pool)
        .await?;

    let items = sqlx::query_as::<_, Role>(
        "SELECT * FROM roles WHERE is_delete = 0 ORDER BY id LIMIT ? OFFSET ?",
    )
    .bind(page_size)
    .bind((page - 1) * page_size)
    .fetch_all(pool)
    .await?;

    Ok(Page { total, items })
}

pub async fn find(pool: &SqlitePool, id: i64) -> sqlx::Result<Option<Role>> {
    sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE id = ? AND is_delete = 0")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_code(pool: &SqlitePool, role_code: &str) -> sqlx::Result<Option<Role>> {
    sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE role_code = ? AND is_delete = 0")
        .bind(role_code)
        .fetch_optional(pool)
        .await
}

pub async fn create(
    pool: &SqlitePool,
    new: &CreateRole,
    create_by: Option<&str>,
) -> sqlx::Result<i64> {
    let now = Utc::now();
    let result = sqlx::query(
        "INSERT INTO roles (role_code, name, permission_char, create_time, update_time, \
         status, is_delete, create_by, remark) \
         VALUES (?, ?, ?, ?, ?, 1, 0, ?, ?)",
    )
    .bind(&new.role_code)
    .bind(&new.name)
    .bind(&new.permission_char)
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
    update: &UpdateRole,
    update_by: Option<&str>,
) -> sqlx::Result<bool> {
    let result = sqlx::query(
        "UPDATE roles SET \
         name = COALESCE(?, name), \
         permission_char = COALESCE(?, permission_char), \
         status = COALESCE(?, status), \
         remark = COALESCE(?, remark), \
         update_time = ?, \
         update_by = COALESCE(?, update_by) \
         WHERE id = ? AND is_delete = 0",
    )
    .bind(&update.name)
    .bind(&update.permission_char)
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
    let result = sqlx::query("UPDATE roles SET is_delete = 1, update_time = ? WHERE id = ? AND is_delete = 0")
        .bind(Utc::now())
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn menus_of(pool: &SqlitePool, role_id: i64) -> sqlx::Result<Vec<Menu>> {
    sqlx::query_as::<_, Menu>(
        "SELECT m.* FROM menus m \
         JOIN role_menus rm ON rm.menu_id = m.id \
         WHERE rm.role_id = ? AND m.is_delete = 0 \
         ORDER BY m.sort_order, m.id",
    )
    .bind(role_id)
    .fetch_all(pool)
    .await
}

/// Replace the role's menu set.
pub async fn assign_menus(pool: &SqlitePool, role_id: i64, menu_ids: &[i64]) -> sqlx::Result<()> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM role_menus WHERE role_id = ?")
        .bind(role_id)
        .execute(&mut *tx)
        .await?;

    for &menu_id in menu_ids {
        sqlx::query("INSERT INTO role_menus (role_id, menu_id) VALUES (?, ?)")
            .bind(role_id)
            .bind(menu_id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await
}
