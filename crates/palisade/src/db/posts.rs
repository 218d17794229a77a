//! Post (job position) queries.

use chrono::Utc;
use palisade_common::Page;
use serde::Deserialize;
use sqlx::SqlitePool;

use super::models::Post;

#[derive(Debug, Deserialize)]
pub struct CreatePost {
    pub post_code: String,
    pub name: String,
    pub remark: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePost {
    pub name: Option<String>,
    pub status: Option<i64>,
    pub remark: Option<String>,
}

pub async fn list(pool: &SqlitePool, page: i64, page_size: i64) -> sqlx::Result<Page<Post>> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE is_delete = 0")
        .fetch_one(pool)
        .await?;

    let items = sqlx::query_as::<_, Post>(
        "SELECT * FROM posts WHERE is_delete = 0 ORDER BY id LIMIT ? OFFSET ?",
    )
    .bind(page_size)
    .bind((page - 1) * page_size)
    .fetch_all(pool)
    .await?;

    Ok(Page { total, items })
}

pub async fn find(pool: &SqlitePool, id: i64) -> sqlx::Result<Option<Post>> {
    sqlx::query_as::<_, Post>("SELECT * FROM posts WHERE id = ? AND is_delete = 0")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_code(pool: &SqlitePool, post_code: &str) -> sqlx::Result<Option<Post>> {
    sqlx::query_as::<_, Post>("SELECT * FROM posts WHERE post_code = ? AND is_delete = 0")
        .bind(post_code)
        .fetch_optional(pool)
        .await
}

pub async fn create(
    pool: &SqlitePool,
    new: &CreatePost,
    create_by: Option<&str>,
) -> sqlx::Result<i64> {
    let now = Utc::now();
    let result = sqlx::query(
        "INSERT INTO posts (post_code, name, create_time, update_time, status, is_delete, \
         create_by, remark) \
         VALUES (?, ?, ?, ?, 1, 0, ?, ?)",
    )
    .bind(&new.post_code)
    .bind(&new.name)
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
    update: &UpdatePost,
    update_by: Option<&str>,
) -> sqlx::Result<bool> {
    let result = sqlx::query(
        "UPDATE posts SET \
         name = COALESCE(?, name), \
         status = COALESCE(?, status), \
         remark = COALESCE(?, remark), \
         update_time = ?, \
         update_by = COALESCE(?, update_by) \
         WHERE id = ? AND is_delete = 0",
    )
    .bind(&update.name)
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
    let result = sqlx::query("UPDATE posts SET is_delete = 1, update_time = ? WHERE id = ? AND is_delete = 0")
        .bind(Utc::now())
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
