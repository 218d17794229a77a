//! Database row types.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// Audit columns shared by every table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AuditColumns {
    pub create_time: DateTime<Utc>,
    pub update_time: DateTime<Utc>,
    /// 1 = enabled, 0 = disabled
    pub status: i64,
    pub is_delete: bool,
    pub create_by: Option<String>,
    pub update_by: Option<String>,
    pub remark: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub nickname: Option<String>,
    pub department_id: Option<i64>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    /// Argon2 hash, never serialized
    #[serde(skip_serializing)]
    pub password: String,
    pub is_admin: bool,
    /// 1 = male, 2 = female, 0 = unknown
    pub gender: Option<i64>,
    pub login_ip: Option<String>,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub audit: AuditColumns,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Role {
    pub id: i64,
    pub role_code: String,
    pub name: String,
    pub permission_char: Option<String>,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub audit: AuditColumns,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Department {
    pub id: i64,
    pub name: String,
    pub parent_id: Option<i64>,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub audit: AuditColumns,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Menu {
    pub id: i64,
    pub name: String,
    pub icon: Option<String>,
    pub sort_order: Option<i64>,
    pub permission_id: Option<String>,
    pub component_path: Option<String>,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub audit: AuditColumns,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Post {
    pub id: i64,
    pub post_code: String,
    pub name: String,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub audit: AuditColumns,
}
