//! User queries.

use chrono::Utc;
use palisade_common::Page;
use serde::Deserialize;
use sqlx::SqlitePool;

use super::models::{Role, User};

#[derive(Debug, Deserialize)]
pub struct CreateUser {
    pub username: String,
    pub nickname: Option<String>,
    pub department_id: Option<i64>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
    pub gender: Option<i64>,
    pub remark: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUser {
    pub nickname: Option<String>,
    pub department_id: Option<i64>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub gender: Option<i64>,
    pub status: Option<i64>,
    pub remark: Option<String>,
}

pub async fn list(pool: &SqlitePool, page: i64, page_size: i64) -> sqlx::Result<Page<User>> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE is_delete = 0")
        .fetch_one(pool)
        .await?;

    let items = sqlx::query_as::<_, User>(
        "SELECT * FROM users WHERE is_delete = 0 ORDER BY id LIMIT ? OFFSET ?",
    )
    .bind(page_size)
    .bind((page - 1) * page_size)
    .fetch_all(pool)
    .await?;

    Ok(Page { total, items })
}

pub async fn find(pool: &SqlitePool, id: i64) -> sqlx::Result<Option<User>> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ? AND is_delete = 0")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_username(pool: &SqlitePool, username: &str) -> sqlx::Result<Option<User>> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ? AND is_delete = 0")
        .bind(username)
        .fetch_optional(pool)
        .await
}

pub async fn create(
    pool: &SqlitePool,
    new: &CreateUser,
    password_hash: &str,
    create_by: Option<&str>,
) -> sqlx::Result<i64> {
    let now = Utc::now();
    let result = sqlx::query(
        "INSERT INTO users (username, nickname, department_id, phone_number, email, password, \
         is_admin, gender, create_time, update_time, status, is_delete, create_by, remark) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 1, 0, ?, ?)",
    )
    .bind(&new.username)
    .bind(&new.nickname)
    .bind(new.department_id)
    .bind(&new.phone_number)
    .bind(&new.email)
    .bind(password_hash)
    .bind(new.is_admin)
    .bind(new.gender)
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
    update: &UpdateUser,
    update_by: Option<&str>,
) -> sqlx::Result<bool> {
    let result = sqlx::query(
        "UPDATE users SET \
         nickname = COALESCE(?, nickname), \
         department_id = COALESCE(?, department_id), \
         phone_number = COALESCE(?, phone_number), \
         email = COALESCE(?, email), \
         gender = COALESCE(?, gender), \
         status = COALESCE(?, status), \
         remark = COALESCE(?, remark), \
         update_time = ?, \
         update_by = COALESCE(?, update_by) \
         WHERE id = ? AND is_delete = 0",
    )
    .bind(&update.nickname)
    .bind(update.department_id)
    .bind(&update.phone_number)
    .bind(&update.email)
    .bind(update.gender)
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
    let result = sqlx::query("UPDATE users SET is_delete = 1, update_time = ? WHERE id = ? AND is_delete = 0")
        .bind(Utc::now())
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn record_login(pool: &SqlitePool, id: i64, ip: &str) -> sqlx::Result<()> {
    sqlx::query("UPDATE users SET login_ip = ? WHERE id = ?")
        .bind(ip)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn set_password(pool: &SqlitePool, id: i64, password_hash: &str) -> sqlx::Result<()> {
    sqlx::query("UPDATE users SET password = ?, update_time = ? WHERE id = ?")
        .bind(password_hash)
        .bind(Utc::now())
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn roles_of(pool: &SqlitePool, user_id: i64) -> sqlx::Result<Vec<Role>> {
    sqlx::query_as::<_, Role>(
        "SELECT r.* FROM roles r \
         JOIN user_roles ur ON ur.role_id = r.id \
         WHERE ur.user_id = ? AND r.is_delete = 0 \
         ORDER BY r.id",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/// Replace the user's role set.
pub async fn assign_roles(pool: &SqlitePool, user_id: i64, role_ids: &[i64]) -> sqlx::Result<()> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM user_roles WHERE user_id = ?")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    for &role_id in role_ids {
        sqlx::query("INSERT INTO user_roles (user_id, role_id) VALUES (?, ?)")
            .bind(user_id)
            .bind(role_id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await
}
